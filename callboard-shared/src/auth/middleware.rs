/// Session authentication middleware for axum
///
/// Protected routes sit behind this middleware. It extracts the session
/// token from the `Authorization: Bearer <token>` header, resolves it
/// against the sessions table, and adds an [`AuthContext`] to the request
/// extensions for handlers to consume.
///
/// A request moves through three states:
///
/// - **anonymous**: no header, a malformed header, or a token that matches
///   no live session - rejected with 401
/// - **session-expired**: the token matches a session past its expiry
///   (or one revoked by logout) - rejected with 401 and a distinct message
/// - **authenticated**: a live session; `last_seen_at` is touched and the
///   request proceeds with the user attached
///
/// # Example
///
/// ```no_run
/// use axum::{Extension, Json};
/// use callboard_shared::auth::middleware::AuthContext;
///
/// async fn handler(Extension(auth): Extension<AuthContext>) -> String {
///     format!("Hello, user {}!", auth.user_id)
/// }
/// ```

use axum::{
    extract::Request,
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::session::Session;

/// Authentication context added to request extensions
///
/// Handlers extract it with axum's `Extension` extractor after the
/// middleware has run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user ID
    pub user_id: Uuid,

    /// The session that authenticated this request
    pub session_id: Uuid,
}

impl AuthContext {
    /// Creates an auth context from a validated session
    pub fn from_session(session: &Session) -> Self {
        Self {
            user_id: session.user_id,
            session_id: session.id,
        }
    }
}

/// Error type for the authentication middleware
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No Authorization header on a protected route
    #[error("Missing credentials")]
    MissingCredentials,

    /// Authorization header is not a Bearer token
    #[error("Invalid authorization header: {0}")]
    InvalidFormat(String),

    /// Token matches no session, or the session was revoked
    #[error("Invalid session: {0}")]
    InvalidSession(String),

    /// Token matches a session past its expiry
    #[error("Session expired")]
    SessionExpired,

    /// Database error during session lookup
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            AuthError::MissingCredentials => {
                (StatusCode::UNAUTHORIZED, "Missing credentials").into_response()
            }
            AuthError::InvalidFormat(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            AuthError::InvalidSession(msg) => (StatusCode::UNAUTHORIZED, msg).into_response(),
            AuthError::SessionExpired => {
                (StatusCode::UNAUTHORIZED, "Session expired").into_response()
            }
            AuthError::DatabaseError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}

/// Extracts the Bearer token from a request's Authorization header
///
/// # Errors
///
/// Returns `AuthError::MissingCredentials` if the header is absent and
/// `AuthError::InvalidFormat` if it is not a Bearer token
pub fn bearer_token(req: &Request) -> Result<&str, AuthError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))
}

/// Session authentication middleware
///
/// Validates the Bearer session token against the sessions table and adds
/// an [`AuthContext`] to the request extensions.
///
/// # Errors
///
/// Returns 401 Unauthorized if:
/// - Authorization header is missing
/// - Token matches no session or a revoked one
/// - The session has expired
///
/// Returns 400 Bad Request if the header is not a Bearer token.
pub async fn session_auth_middleware(
    pool: PgPool,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let token = bearer_token(&req)?.to_string();

    // Look the session up without state filters so expiry is reported
    // distinctly from an unknown token
    let session = Session::find_by_token(&pool, &token)
        .await
        .map_err(|e| AuthError::DatabaseError(format!("Session lookup failed: {}", e)))?
        .ok_or_else(|| AuthError::InvalidSession("Unknown session token".to_string()))?;

    if session.revoked {
        return Err(AuthError::InvalidSession(
            "Session has been logged out".to_string(),
        ));
    }

    if session.is_expired() {
        return Err(AuthError::SessionExpired);
    }

    // Touch last_seen_at; the filtered update also guards against the
    // session being revoked between the lookup and here
    let session = Session::validate(&pool, &token)
        .await
        .map_err(|e| AuthError::DatabaseError(format!("Session validation failed: {}", e)))?
        .ok_or_else(|| AuthError::InvalidSession("Session no longer valid".to_string()))?;

    let auth_context = AuthContext::from_session(&session);
    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}
