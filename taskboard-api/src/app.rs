/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use taskboard_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
/// let app = taskboard_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::config::Config;
use axum::{
    extract::Request,
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{delete, get, post, put},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use taskboard_shared::auth::verifier::{Auth0Verifier, LocalVerifier, TokenVerifiers};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Configured token verification strategies
    pub verifiers: Arc<TokenVerifiers>,
}

impl AppState {
    /// Creates new application state
    ///
    /// Builds the verifier set from the configuration: the local HS256
    /// verifier is always present, the Auth0 verifier only when a tenant is
    /// configured.
    pub fn new(db: PgPool, config: Config) -> Self {
        let local = LocalVerifier::new(config.jwt.secret.clone());
        let auth0 = config
            .auth0
            .as_ref()
            .map(|settings| Auth0Verifier::new(settings.to_verifier_config(), db.clone()));

        Self {
            db,
            config: Arc::new(config),
            verifiers: Arc::new(TokenVerifiers::new(local, auth0)),
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                          # Health check (public)
/// └── /api/
///     ├── /auth/                       # register/login/refresh public, me authed
///     ├── /users/                      # User listing and profiles
///     ├── /projects/                   # Projects, members, labels, files
///     ├── /tasks/                      # Tasks, subtasks, comments, labels
///     ├── /dashboard/summary           # Principal-scoped aggregates
///     └── /audit-logs                  # Audit trail reader
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Authentication (per-route basis)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Auth routes (public, no auth required)
    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/refresh", post(routes::auth::refresh));

    // Current-principal route (authenticated)
    let me_routes = Router::new()
        .route("/me", get(routes::auth::me))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_layer,
        ));

    let user_routes = Router::new()
        .route("/", get(routes::users::list_users))
        .route("/:id", get(routes::users::get_user))
        .route("/:id", put(routes::users::update_user));

    let project_routes = Router::new()
        .route("/", get(routes::projects::list_projects))
        .route("/", post(routes::projects::create_project))
        .route("/:id", get(routes::projects::get_project))
        .route("/:id", put(routes::projects::update_project))
        .route("/:id", delete(routes::projects::delete_project))
        .route("/:id/progress", get(routes::projects::get_progress))
        .route("/:id/members", get(routes::members::list_members))
        .route("/:id/members", post(routes::members::add_member))
        .route(
            "/:id/members/:user_id",
            delete(routes::members::remove_member),
        )
        .route("/:id/labels", get(routes::labels::list_labels))
        .route("/:id/labels", post(routes::labels::create_label))
        .route(
            "/:id/labels/:label_id",
            delete(routes::labels::delete_label),
        )
        .route("/:id/files", get(routes::files::list_files))
        .route("/:id/files", post(routes::files::upload_file))
        .route("/:id/files/:file_id", delete(routes::files::delete_file));

    let task_routes = Router::new()
        .route("/", get(routes::tasks::list_tasks))
        .route("/", post(routes::tasks::create_task))
        .route("/:id", get(routes::tasks::get_task))
        .route("/:id", put(routes::tasks::update_task))
        .route("/:id", delete(routes::tasks::delete_task))
        .route("/:id/status", put(routes::tasks::set_status))
        .route("/:id/assign", put(routes::tasks::assign_task))
        .route("/:id/unassign", put(routes::tasks::unassign_task))
        .route("/:id/subtasks", get(routes::subtasks::list_subtasks))
        .route("/:id/subtasks", post(routes::subtasks::create_subtask))
        .route(
            "/:id/subtasks/:subtask_id",
            put(routes::subtasks::update_subtask),
        )
        .route(
            "/:id/subtasks/:subtask_id",
            delete(routes::subtasks::delete_subtask),
        )
        .route("/:id/comments", get(routes::comments::list_comments))
        .route("/:id/comments", post(routes::comments::create_comment))
        .route(
            "/:id/comments/:comment_id",
            delete(routes::comments::delete_comment),
        )
        .route("/:id/labels/:label_id", put(routes::tasks::attach_label))
        .route(
            "/:id/labels/:label_id",
            delete(routes::tasks::detach_label),
        );

    let dashboard_routes =
        Router::new().route("/summary", get(routes::dashboard::summary));

    let audit_routes = Router::new().route("/", get(routes::audit_logs::list_audit_logs));

    // Everything below /api except /api/auth requires a verified principal
    let protected = Router::new()
        .nest("/users", user_routes)
        .nest("/projects", project_routes)
        .nest("/tasks", task_routes)
        .nest("/dashboard", dashboard_routes)
        .nest("/audit-logs", audit_routes)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_layer,
        ));

    let api_routes = Router::new()
        .nest("/auth", auth_routes.merge(me_routes))
        .merge(protected);

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        // Production mode: configure allowed origins
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    // Combine all routes with middleware stack
    Router::new()
        .merge(health_routes)
        .nest("/api", api_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

/// Authentication middleware layer
///
/// Extracts the bearer token from the Authorization header, verifies it with
/// the strategy selected by its header algorithm, then injects the resolved
/// [`Principal`](taskboard_shared::auth::verifier::Principal) into request
/// extensions.
async fn auth_layer(
    state: axum::extract::State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, crate::error::ApiError> {
    // Extract Authorization header
    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            crate::error::ApiError::Unauthorized("Missing authorization header".to_string())
        })?;

    // Parse Bearer token
    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| crate::error::ApiError::Unauthorized("Expected Bearer token".to_string()))?;

    // Verify and resolve the principal
    let principal = state.verifiers.verify(token).await?;

    // Insert into request extensions
    req.extensions_mut().insert(principal);

    Ok(next.run(req).await)
}
