/// Authentication endpoints
///
/// This module provides the account lifecycle endpoints:
/// - Registration
/// - Login (establishes a session)
/// - Logout (revokes it; idempotent)
/// - Current user lookup for clients restoring a persisted token
///
/// # Endpoints
///
/// - `POST /v1/auth/register` - Register new user
/// - `POST /v1/auth/login` - Login and get a session token
/// - `POST /v1/auth/logout` - Revoke the presented session
/// - `GET  /v1/auth/me` - Current user (session required)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::users::UserResponse,
};
use axum::{extract::State, http::HeaderMap, Extension, Json};
use callboard_shared::{
    auth::{middleware::AuthContext, password},
    models::{
        session::Session,
        user::{CreateUser, User},
    },
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Display name
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,

    /// Optional stage/nickname
    #[validate(length(max = 255, message = "Nickname must be at most 255 characters"))]
    pub nickname: Option<String>,

    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password (plaintext; hashed before storage)
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    /// Artist or producer account
    #[serde(default)]
    pub is_artist: bool,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// Session token - presented as `Authorization: Bearer <token>`.
    /// Only returned here; the server keeps a digest.
    pub token: String,

    /// When the session expires
    pub expires_at: DateTime<Utc>,

    /// The authenticated user
    pub user: UserResponse,
}

/// Logout response
#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    /// Always true; logout is idempotent
    pub logged_out: bool,
}

/// Register a new user
///
/// Creates an account from the submitted profile. The password is hashed
/// exactly once here, before the model layer is involved; a hashing
/// failure aborts the write.
///
/// # Endpoint
///
/// ```text
/// POST /v1/auth/register
/// Content-Type: application/json
///
/// {
///   "name": "nick",
///   "nickname": "funky duck",
///   "is_artist": false,
///   "email": "user@email.com",
///   "password": "password"
/// }
/// ```
///
/// # Errors
///
/// - `409 Conflict`: Email already exists
/// - `422 Unprocessable Entity`: Validation failed
/// - `500 Internal Server Error`: Server error
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<Json<UserResponse>> {
    req.validate().map_err(ApiError::from_validation)?;

    let password_hash = password::hash_password(&req.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            name: req.name,
            nickname: req.nickname,
            email: req.email.to_lowercase(),
            password_hash,
            is_artist: req.is_artist,
        },
    )
    .await?;

    tracing::info!(user_id = %user.id, "User registered");

    Ok(Json(UserResponse::from(user)))
}

/// Login endpoint
///
/// Verifies the credentials and establishes a session. The failure message
/// is identical for an unknown email and a wrong password.
///
/// # Endpoint
///
/// ```text
/// POST /v1/auth/login
/// Content-Type: application/json
///
/// {
///   "email": "user@email.com",
///   "password": "password"
/// }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Invalid credentials
/// - `422 Unprocessable Entity`: Validation failed
/// - `500 Internal Server Error`: Server error
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    req.validate().map_err(ApiError::from_validation)?;

    let user = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid email or password".to_string()))?;

    let valid = password::verify_password(&req.password, &user.password_hash)?;
    if !valid {
        return Err(ApiError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    }

    let (session, token) =
        Session::create(&state.db, user.id, state.session_ttl_hours()).await?;

    User::update_last_login(&state.db, user.id).await?;

    tracing::info!(user_id = %user.id, session_id = %session.id, "User logged in");

    Ok(Json(LoginResponse {
        token,
        expires_at: session.expires_at,
        user: UserResponse::from(user),
    }))
}

/// Logout endpoint
///
/// Revokes the session presented in the Authorization header. Idempotent:
/// a missing, unknown or already-revoked token still yields 200, because
/// the caller's goal - not being logged in - is met either way.
///
/// # Endpoint
///
/// ```text
/// POST /v1/auth/logout
/// Authorization: Bearer cb_...
/// ```
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<LogoutResponse>> {
    let token = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    if let Some(token) = token {
        let revoked = Session::revoke_by_token(&state.db, token).await?;
        if revoked {
            tracing::info!("Session revoked");
        }
    }

    Ok(Json(LogoutResponse { logged_out: true }))
}

/// Current user endpoint
///
/// Returns the account behind the presented session. Clients holding a
/// persisted token call this on startup to restore their signed-in state.
///
/// # Endpoint
///
/// ```text
/// GET /v1/auth/me
/// Authorization: Bearer cb_...
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: No valid session
/// - `404 Not Found`: Session's user no longer exists
pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<UserResponse>> {
    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(UserResponse::from(user)))
}
