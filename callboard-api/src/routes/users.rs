/// User endpoints
///
/// Collections, profile CRUD and company association. Everything here sits
/// behind the session middleware; the mutating routes are additionally
/// scoped to the authenticated caller's own record.
///
/// # Endpoints
///
/// - `GET    /v1/users` - All users
/// - `GET    /v1/users/artists` - Artist accounts
/// - `GET    /v1/users/producers` - Producer accounts
/// - `GET    /v1/users/:id` - Single user
/// - `POST   /v1/users/:id` - Update own profile
/// - `DELETE /v1/users/:id` - Delete own account
/// - `POST   /v1/users/:id/companies` - Affiliate a company (idempotent)
/// - `GET    /v1/users/:id/companies` - The user's company set

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::companies::CompanyResponse,
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use callboard_shared::{
    auth::{authorization::require_self, middleware::AuthContext, password},
    models::{
        affiliation::Affiliation,
        company::Company,
        session::Session,
        user::{UpdateUser, User},
    },
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Default page size for the collection endpoints
const DEFAULT_PAGE_SIZE: i64 = 100;

/// User representation returned to clients
///
/// The password hash never leaves the server.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    /// User ID
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// Optional stage/nickname
    pub nickname: Option<String>,

    /// Email address
    pub email: String,

    /// Artist or producer
    pub is_artist: bool,

    /// When the account was created
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            nickname: user.nickname,
            email: user.email,
            is_artist: user.is_artist,
            created_at: user.created_at,
        }
    }
}

/// Profile update request
///
/// All fields optional; a password included here is plaintext and gets
/// hashed exactly once before the model layer sees it.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    /// New display name
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: Option<String>,

    /// New nickname
    #[validate(length(max = 255, message = "Nickname must be at most 255 characters"))]
    pub nickname: Option<String>,

    /// New email address
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    /// New password (plaintext; hashed before storage)
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: Option<String>,

    /// Flip between artist and producer
    pub is_artist: Option<bool>,
}

/// Company association request
#[derive(Debug, Deserialize)]
pub struct AddCompanyRequest {
    /// Company to affiliate with
    pub company_id: Uuid,
}

/// Lists all users
///
/// # Endpoint
///
/// ```text
/// GET /v1/users
/// ```
pub async fn list_users(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<UserResponse>>> {
    let users = User::list(&state.db, DEFAULT_PAGE_SIZE, 0).await?;

    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// Lists artist accounts
///
/// # Endpoint
///
/// ```text
/// GET /v1/users/artists
/// ```
pub async fn list_artists(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<UserResponse>>> {
    let users = User::list_by_kind(&state.db, true, DEFAULT_PAGE_SIZE, 0).await?;

    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// Lists producer accounts
///
/// # Endpoint
///
/// ```text
/// GET /v1/users/producers
/// ```
pub async fn list_producers(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<UserResponse>>> {
    let users = User::list_by_kind(&state.db, false, DEFAULT_PAGE_SIZE, 0).await?;

    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// Fetches a single user
///
/// # Endpoint
///
/// ```text
/// GET /v1/users/:id
/// ```
///
/// # Errors
///
/// - `404 Not Found`: Unknown user ID
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<UserResponse>> {
    let user = User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(UserResponse::from(user)))
}

/// Updates the caller's own profile
///
/// # Endpoint
///
/// ```text
/// POST /v1/users/:id
/// Content-Type: application/json
///
/// { "name": "new name", "email": "newemail@email.com" }
/// ```
///
/// # Errors
///
/// - `403 Forbidden`: Caller is not the targeted user
/// - `404 Not Found`: Unknown user ID
/// - `409 Conflict`: Email taken by another account
/// - `422 Unprocessable Entity`: Validation failed
pub async fn update_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateUserRequest>,
) -> ApiResult<Json<UserResponse>> {
    require_self(&auth, id)?;

    req.validate().map_err(ApiError::from_validation)?;

    // Hash a freshly supplied password; an absent one leaves the stored
    // digest untouched
    let password_hash = match req.password {
        Some(plaintext) => Some(password::hash_password(&plaintext)?),
        None => None,
    };

    let password_changed = password_hash.is_some();

    let update = UpdateUser {
        name: req.name,
        nickname: req.nickname.map(Some),
        email: req.email.map(|e| e.to_lowercase()),
        password_hash,
        is_artist: req.is_artist,
    };

    let user = User::update(&state.db, id, update)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    // A password change invalidates every outstanding login
    if password_changed {
        let revoked = Session::revoke_all_for_user(&state.db, id).await?;
        tracing::info!(user_id = %id, revoked, "Password changed, sessions revoked");
    }

    Ok(Json(UserResponse::from(user)))
}

/// Deletes the caller's own account
///
/// Affiliations and sessions cascade away with the row, so companies drop
/// their back-reference and outstanding tokens stop working.
///
/// # Endpoint
///
/// ```text
/// DELETE /v1/users/:id
/// ```
///
/// # Errors
///
/// - `403 Forbidden`: Caller is not the targeted user
/// - `404 Not Found`: Unknown user ID
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    require_self(&auth, id)?;

    let deleted = User::delete(&state.db, id).await?;
    if !deleted {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    tracing::info!(user_id = %id, "User account deleted");

    Ok(Json(serde_json::json!({ "deleted": true })))
}

/// Affiliates a company with the caller's account
///
/// Idempotent: associating an already-linked company is a no-op and still
/// returns the full company set.
///
/// # Endpoint
///
/// ```text
/// POST /v1/users/:id/companies
/// Content-Type: application/json
///
/// { "company_id": "uuid" }
/// ```
///
/// # Errors
///
/// - `403 Forbidden`: Caller is not the targeted user
/// - `404 Not Found`: Unknown user or company ID
pub async fn add_company_to_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<AddCompanyRequest>,
) -> ApiResult<Json<Vec<CompanyResponse>>> {
    require_self(&auth, id)?;

    // Both ends must exist before linking
    if User::find_by_id(&state.db, id).await?.is_none() {
        return Err(ApiError::NotFound("User not found".to_string()));
    }
    if Company::find_by_id(&state.db, req.company_id).await?.is_none() {
        return Err(ApiError::NotFound("Company not found".to_string()));
    }

    Affiliation::create(&state.db, id, req.company_id).await?;

    user_companies(&state, id).await
}

/// Lists the companies affiliated with a user
///
/// # Endpoint
///
/// ```text
/// GET /v1/users/:id/companies
/// ```
pub async fn list_user_companies(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<CompanyResponse>>> {
    if User::find_by_id(&state.db, id).await?.is_none() {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    user_companies(&state, id).await
}

/// Resolves a user's affiliation rows to company records
async fn user_companies(
    state: &AppState,
    user_id: Uuid,
) -> ApiResult<Json<Vec<CompanyResponse>>> {
    let affiliations = Affiliation::list_by_user(&state.db, user_id).await?;

    let mut companies = Vec::with_capacity(affiliations.len());
    for affiliation in affiliations {
        if let Some(company) = Company::find_by_id(&state.db, affiliation.company_id).await? {
            companies.push(CompanyResponse::from(company));
        }
    }

    Ok(Json(companies))
}
