/// Pluggable token verification
///
/// Inbound bearer tokens come from two sources: locally issued HS256 tokens
/// (see [`crate::auth::jwt`]) and Auth0-issued RS256 tokens. Both verifier
/// implementations produce the same normalized [`Principal`], which the API
/// layer attaches to the request for its lifetime.
///
/// Selection is a discriminated check on the unverified token header: HS256
/// tokens go to the [`LocalVerifier`], RS256 tokens to the
/// [`Auth0Verifier`]. Each verifier then enforces its own issuer during
/// validation, so the unverified discriminator can only route a token, never
/// authenticate it.
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::auth::verifier::{LocalVerifier, TokenVerifiers};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool, token: &str) -> Result<(), Box<dyn std::error::Error>> {
/// let verifiers = TokenVerifiers::new(
///     LocalVerifier::new("jwt-secret-at-least-32-bytes-long"),
///     None, // Auth0 not configured
/// );
///
/// let principal = verifiers.verify(token).await?;
/// println!("Authenticated user {}", principal.user_id);
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use super::jwt::{self, JwtError};
use crate::models::user::User;

/// How long fetched JWKS keys are reused before a refetch
const JWKS_CACHE_TTL: Duration = Duration::from_secs(3600);

/// How a principal was authenticated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMethod {
    /// Locally issued HS256 token
    Local,

    /// Auth0-issued RS256 token
    Auth0,
}

/// Normalized authenticated identity
///
/// Carried through request extensions for the lifetime of one request.
/// Always resolves to a local user row; authorization is defined over local
/// users regardless of which verifier produced the principal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Principal {
    /// Authenticated user ID
    pub user_id: Uuid,

    /// Verification strategy that produced this principal
    pub method: AuthMethod,
}

/// Error type for token verification
#[derive(Debug, thiserror::Error)]
pub enum VerifierError {
    /// Token could not be parsed or its signature rejected
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Token algorithm matches no configured verifier
    #[error("Unsupported token algorithm: {0:?}")]
    UnsupportedAlgorithm(Algorithm),

    /// RS256 token carries no key id
    #[error("Token header carries no key id")]
    MissingKeyId,

    /// Key id not present in the JWKS
    #[error("Unknown signing key: {0}")]
    UnknownKey(String),

    /// JWKS could not be fetched
    #[error("Failed to fetch JWKS: {0}")]
    JwksFetch(String),

    /// Verified token matches no local user
    #[error("Token matches no known user")]
    UnknownUser,

    /// Database lookup failed
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<JwtError> for VerifierError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => VerifierError::Expired,
            other => VerifierError::InvalidToken(other.to_string()),
        }
    }
}

/// A token verification strategy
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    /// Verifies a bearer token and resolves it to a principal
    async fn verify(&self, token: &str) -> Result<Principal, VerifierError>;
}

/// Verifies locally issued HS256 access tokens
pub struct LocalVerifier {
    secret: String,
}

impl LocalVerifier {
    /// Creates a verifier over the shared HMAC secret
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }
}

#[async_trait]
impl TokenVerifier for LocalVerifier {
    async fn verify(&self, token: &str) -> Result<Principal, VerifierError> {
        let claims = jwt::validate_access_token(token, &self.secret)?;

        Ok(Principal {
            user_id: claims.sub,
            method: AuthMethod::Local,
        })
    }
}

/// Configuration for Auth0 token verification
#[derive(Debug, Clone)]
pub struct Auth0Config {
    /// Auth0 tenant domain, e.g. "example.us.auth0.com"
    pub domain: String,

    /// Expected `aud` claim
    pub audience: String,
}

/// Claims extracted from a verified Auth0 token
#[derive(Debug, Deserialize)]
struct Auth0Claims {
    sub: String,
    email: Option<String>,
}

/// One RSA key from the tenant JWKS
#[derive(Debug, Clone, Deserialize)]
struct Jwk {
    kty: String,
    kid: Option<String>,
    n: Option<String>,
    e: Option<String>,
}

#[derive(Debug, Deserialize)]
struct JwkSet {
    keys: Vec<Jwk>,
}

/// Cached JWKS keys with fetch timestamp
struct CachedKeys {
    /// kid -> (n, e) base64url components
    keys: HashMap<String, (String, String)>,
    fetched_at: Instant,
}

/// Verifies Auth0-issued RS256 tokens against the tenant JWKS
///
/// The JWKS is fetched from `https://{domain}/.well-known/jwks.json` and
/// cached in-process for [`JWKS_CACHE_TTL`]. Issuer and audience are
/// validated against the configured tenant. The verified token is resolved
/// to a local user by `auth0_sub`, falling back to the verified email claim
/// (back-filling `auth0_sub` on first sight).
pub struct Auth0Verifier {
    issuer: String,
    audience: String,
    jwks_url: String,
    client: reqwest::Client,
    pool: PgPool,
    cache: RwLock<Option<CachedKeys>>,
}

impl Auth0Verifier {
    /// Creates a verifier for one Auth0 tenant
    pub fn new(config: Auth0Config, pool: PgPool) -> Self {
        let issuer = format!("https://{}/", config.domain);
        let jwks_url = format!("https://{}/.well-known/jwks.json", config.domain);

        Self {
            issuer,
            audience: config.audience,
            jwks_url,
            client: reqwest::Client::new(),
            pool,
            cache: RwLock::new(None),
        }
    }

    /// Returns the RSA components for a key id, fetching the JWKS on cache
    /// miss or expiry
    async fn key_components(&self, kid: &str) -> Result<(String, String), VerifierError> {
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.fetched_at.elapsed() < JWKS_CACHE_TTL {
                    if let Some(components) = cached.keys.get(kid) {
                        return Ok(components.clone());
                    }
                }
            }
        }

        debug!(jwks_url = %self.jwks_url, "Fetching JWKS");

        let jwks: JwkSet = self
            .client
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|e| VerifierError::JwksFetch(e.to_string()))?
            .json()
            .await
            .map_err(|e| VerifierError::JwksFetch(e.to_string()))?;

        let mut keys = HashMap::new();
        for key in jwks.keys {
            if key.kty != "RSA" {
                continue;
            }
            if let (Some(kid), Some(n), Some(e)) = (key.kid, key.n, key.e) {
                keys.insert(kid, (n, e));
            }
        }

        let components = keys.get(kid).cloned();

        let mut cache = self.cache.write().await;
        *cache = Some(CachedKeys {
            keys,
            fetched_at: Instant::now(),
        });

        components.ok_or_else(|| VerifierError::UnknownKey(kid.to_string()))
    }

    /// Resolves verified Auth0 claims to a local user
    async fn resolve_user(&self, claims: &Auth0Claims) -> Result<Uuid, VerifierError> {
        if let Some(user) = User::find_by_auth0_sub(&self.pool, &claims.sub).await? {
            return Ok(user.id);
        }

        // First sight of this Auth0 identity: match on verified email and
        // link the subject for subsequent requests.
        if let Some(email) = &claims.email {
            if let Some(user) = User::find_by_email(&self.pool, email).await? {
                User::link_auth0_sub(&self.pool, user.id, &claims.sub).await?;
                info!(user_id = %user.id, "Linked Auth0 identity to existing account");
                return Ok(user.id);
            }
        }

        Err(VerifierError::UnknownUser)
    }
}

#[async_trait]
impl TokenVerifier for Auth0Verifier {
    async fn verify(&self, token: &str) -> Result<Principal, VerifierError> {
        let header =
            decode_header(token).map_err(|e| VerifierError::InvalidToken(e.to_string()))?;

        if header.alg != Algorithm::RS256 {
            return Err(VerifierError::UnsupportedAlgorithm(header.alg));
        }

        let kid = header.kid.ok_or(VerifierError::MissingKeyId)?;
        let (n, e) = self.key_components(&kid).await?;

        let key = DecodingKey::from_rsa_components(&n, &e)
            .map_err(|e| VerifierError::InvalidToken(e.to_string()))?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.validate_exp = true;

        let token_data = decode::<Auth0Claims>(token, &key, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => VerifierError::Expired,
                _ => VerifierError::InvalidToken(e.to_string()),
            }
        })?;

        let user_id = self.resolve_user(&token_data.claims).await?;

        Ok(Principal {
            user_id,
            method: AuthMethod::Auth0,
        })
    }
}

/// The configured set of verification strategies
///
/// Routes each inbound token to a strategy by its unverified header
/// algorithm. Auth0 is optional; RS256 tokens are rejected outright when it
/// is not configured.
pub struct TokenVerifiers {
    local: LocalVerifier,
    auth0: Option<Auth0Verifier>,
}

impl TokenVerifiers {
    /// Creates the verifier set
    pub fn new(local: LocalVerifier, auth0: Option<Auth0Verifier>) -> Self {
        Self { local, auth0 }
    }

    /// Verifies a token with the strategy selected by its header algorithm
    pub async fn verify(&self, token: &str) -> Result<Principal, VerifierError> {
        let header =
            decode_header(token).map_err(|e| VerifierError::InvalidToken(e.to_string()))?;

        match header.alg {
            Algorithm::HS256 => self.local.verify(token).await,
            Algorithm::RS256 => match &self.auth0 {
                Some(auth0) => auth0.verify(token).await,
                None => Err(VerifierError::UnsupportedAlgorithm(Algorithm::RS256)),
            },
            other => Err(VerifierError::UnsupportedAlgorithm(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::{create_token, Claims, TokenType};

    #[tokio::test]
    async fn test_local_verifier_accepts_access_token() {
        let secret = "test-secret-key-at-least-32-bytes-long";
        let user_id = Uuid::new_v4();

        let token = create_token(&Claims::new(user_id, TokenType::Access), secret).unwrap();

        let verifier = LocalVerifier::new(secret);
        let principal = verifier.verify(&token).await.unwrap();

        assert_eq!(principal.user_id, user_id);
        assert_eq!(principal.method, AuthMethod::Local);
    }

    #[tokio::test]
    async fn test_local_verifier_rejects_refresh_token() {
        let secret = "test-secret-key-at-least-32-bytes-long";

        let token =
            create_token(&Claims::new(Uuid::new_v4(), TokenType::Refresh), secret).unwrap();

        let verifier = LocalVerifier::new(secret);
        assert!(verifier.verify(&token).await.is_err());
    }

    #[tokio::test]
    async fn test_verifiers_route_hs256_to_local() {
        let secret = "test-secret-key-at-least-32-bytes-long";
        let user_id = Uuid::new_v4();

        let token = create_token(&Claims::new(user_id, TokenType::Access), secret).unwrap();

        let verifiers = TokenVerifiers::new(LocalVerifier::new(secret), None);
        let principal = verifiers.verify(&token).await.unwrap();

        assert_eq!(principal.user_id, user_id);
        assert_eq!(principal.method, AuthMethod::Local);
    }

    #[tokio::test]
    async fn test_verifiers_reject_garbage() {
        let verifiers = TokenVerifiers::new(LocalVerifier::new("secret"), None);

        let result = verifiers.verify("not-a-jwt").await;
        assert!(matches!(result, Err(VerifierError::InvalidToken(_))));
    }
}
