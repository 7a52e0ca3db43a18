/// Application state and router builder
///
/// This module defines the shared application state and provides a
/// function to build the axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use callboard_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
/// let app = callboard_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, middleware::security::SecurityHeadersLayer};
use axum::{
    extract::Request,
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{delete, get, post},
    Router,
};
use callboard_shared::auth::middleware::session_auth_middleware;
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// Gets the configured session lifetime in hours
    pub fn session_ttl_hours(&self) -> i64 {
        self.config.session.ttl_hours
    }
}

/// Builds the complete axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                    # Health check (public)
/// └── /v1/                       # API v1 (versioned)
///     ├── /auth/
///     │   ├── POST /register     # public
///     │   ├── POST /login        # public
///     │   ├── POST /logout       # public, idempotent
///     │   └── GET  /me           # session required
///     ├── /users/                # session required
///     │   ├── GET    /           # all users
///     │   ├── GET    /artists
///     │   ├── GET    /producers
///     │   ├── GET    /:id
///     │   ├── POST   /:id        # self only
///     │   ├── DELETE /:id        # self only
///     │   └── GET/POST /:id/companies
///     └── /companies/            # session required
///         ├── GET/POST  /
///         └── GET/POST/DELETE /:id
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Security headers
/// 4. Session authentication (per-nest basis)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Auth routes; register/login/logout are explicitly unprotected
    let auth_public = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/logout", post(routes::auth::logout));

    let auth_protected = Router::new()
        .route("/me", get(routes::auth::me))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            session_auth_layer,
        ));

    let auth_routes = auth_public.merge(auth_protected);

    // User routes (require an active session)
    let user_routes = Router::new()
        .route("/", get(routes::users::list_users))
        .route("/artists", get(routes::users::list_artists))
        .route("/producers", get(routes::users::list_producers))
        .route("/:id", get(routes::users::get_user))
        .route("/:id", post(routes::users::update_user))
        .route("/:id", delete(routes::users::delete_user))
        .route("/:id/companies", post(routes::users::add_company_to_user))
        .route("/:id/companies", get(routes::users::list_user_companies))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            session_auth_layer,
        ));

    // Company routes (require an active session)
    let company_routes = Router::new()
        .route("/", post(routes::companies::create_company))
        .route("/", get(routes::companies::list_companies))
        .route("/:id", get(routes::companies::get_company))
        .route("/:id", post(routes::companies::update_company))
        .route("/:id", delete(routes::companies::delete_company))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            session_auth_layer,
        ));

    // Build complete v1 API
    let v1_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/users", user_routes)
        .nest("/companies", company_routes);

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
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

/// Session authentication middleware layer
///
/// Thin adapter binding the shared session middleware to this server's
/// state; rejections surface through `AuthError`'s own response mapping.
async fn session_auth_layer(
    state: axum::extract::State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, callboard_shared::auth::middleware::AuthError> {
    session_auth_middleware(state.db.clone(), req, next).await
}

#[cfg(test)]
mod tests {
    // AppState construction and routing are exercised end-to-end by the
    // integration tests in tests/
}
