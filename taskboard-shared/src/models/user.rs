/// User model and database operations
///
/// Users authenticate either with a locally stored Argon2id password hash or
/// through Auth0 (linked via `auth0_sub`). The global `role` column is
/// distinct from per-project membership roles: a global admin bypasses
/// project membership checks entirely.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE user_role AS ENUM ('admin', 'member', 'viewer');
///
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     full_name VARCHAR(255) NOT NULL,
///     email VARCHAR(255) NOT NULL UNIQUE,
///     password_hash TEXT NOT NULL,
///     role user_role NOT NULL DEFAULT 'member',
///     avatar_url TEXT,
///     auth0_sub TEXT UNIQUE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Global (application-wide) user role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Full access to every resource, regardless of project membership
    Admin,

    /// Regular user; access governed by ownership and membership
    Member,

    /// Read-only user
    Viewer,
}

impl UserRole {
    /// Converts role to string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Member => "member",
            UserRole::Viewer => "viewer",
        }
    }

    /// Global admins bypass resource-level permission checks
    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }
}

/// User model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID
    pub id: Uuid,

    /// Display name
    pub full_name: String,

    /// Email address (unique)
    pub email: String,

    /// Argon2id password hash (PHC string)
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Global role
    pub role: UserRole,

    /// Optional avatar URL
    pub avatar_url: Option<String>,

    /// Auth0 subject claim, set once an Auth0 identity is linked
    #[serde(skip_serializing)]
    pub auth0_sub: Option<String>,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the account was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new user
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUser {
    /// Display name
    pub full_name: String,

    /// Email address
    pub email: String,

    /// Pre-hashed password (PHC string)
    pub password_hash: String,

    /// Optional avatar URL
    pub avatar_url: Option<String>,
}

/// Input for updating a user profile
///
/// Only profile fields are updatable; email, role, and credentials have
/// dedicated flows.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUser {
    /// New display name
    pub full_name: Option<String>,

    /// New avatar URL
    pub avatar_url: Option<String>,
}

impl User {
    /// Creates a new user with the default Member role
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (full_name, email, password_hash, avatar_url)
            VALUES ($1, $2, $3, $4)
            RETURNING id, full_name, email, password_hash, role, avatar_url,
                      auth0_sub, created_at, updated_at
            "#,
        )
        .bind(data.full_name)
        .bind(data.email)
        .bind(data.password_hash)
        .bind(data.avatar_url)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, full_name, email, password_hash, role, avatar_url,
                   auth0_sub, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by email
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, full_name, email, password_hash, role, avatar_url,
                   auth0_sub, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by their Auth0 subject claim
    pub async fn find_by_auth0_sub(
        pool: &PgPool,
        auth0_sub: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, full_name, email, password_hash, role, avatar_url,
                   auth0_sub, created_at, updated_at
            FROM users
            WHERE auth0_sub = $1
            "#,
        )
        .bind(auth0_sub)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Links an Auth0 identity to an existing account
    pub async fn link_auth0_sub(
        pool: &PgPool,
        id: Uuid,
        auth0_sub: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET auth0_sub = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(auth0_sub)
            .execute(pool)
            .await?;

        Ok(())
    }

    /// Gets a user's global role
    pub async fn get_role(pool: &PgPool, id: Uuid) -> Result<Option<UserRole>, sqlx::Error> {
        let role: Option<UserRole> = sqlx::query_scalar("SELECT role FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(role)
    }

    /// Updates profile fields, returning the updated user
    pub async fn update_profile(
        pool: &PgPool,
        id: Uuid,
        data: UpdateUser,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET full_name = COALESCE($2, full_name),
                avatar_url = COALESCE($3, avatar_url),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, full_name, email, password_hash, role, avatar_url,
                      auth0_sub, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(data.full_name)
        .bind(data.avatar_url)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Lists users with pagination, newest first
    pub async fn list(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<Self>, sqlx::Error> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, full_name, email, password_hash, role, avatar_url,
                   auth0_sub, created_at, updated_at
            FROM users
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        Ok(users)
    }

    /// Counts all users
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}

/// Public profile view of a user (safe to embed in API responses)
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserProfile {
    /// User ID
    pub id: Uuid,

    /// Display name
    pub full_name: String,

    /// Email address
    pub email: String,

    /// Optional avatar URL
    pub avatar_url: Option<String>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            full_name: user.full_name,
            email: user.email,
            avatar_url: user.avatar_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_role_as_str() {
        assert_eq!(UserRole::Admin.as_str(), "admin");
        assert_eq!(UserRole::Member.as_str(), "member");
        assert_eq!(UserRole::Viewer.as_str(), "viewer");
    }

    #[test]
    fn test_user_role_is_admin() {
        assert!(UserRole::Admin.is_admin());
        assert!(!UserRole::Member.is_admin());
        assert!(!UserRole::Viewer.is_admin());
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let user = User {
            id: Uuid::new_v4(),
            full_name: "Test User".to_string(),
            email: "test@example.com".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            role: UserRole::Member,
            avatar_url: None,
            auth0_sub: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("password_hash"));
        assert!(!json.contains("argon2id"));
    }
}
