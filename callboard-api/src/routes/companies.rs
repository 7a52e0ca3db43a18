/// Company endpoints
///
/// CRUD over production companies. The red61 booking-system credentials
/// are hashed here, on the write path, before the model layer sees the
/// payload - and they never appear in a response; clients only learn
/// whether credentials are on file.
///
/// # Endpoints
///
/// - `POST   /v1/companies` - Create a company
/// - `GET    /v1/companies` - List companies
/// - `GET    /v1/companies/:id` - Single company
/// - `POST   /v1/companies/:id` - Update a company
/// - `DELETE /v1/companies/:id` - Delete a company

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    Json,
};
use callboard_shared::{
    auth::password,
    models::company::{Company, CreateCompany, UpdateCompany},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Default page size for the collection endpoint
const DEFAULT_PAGE_SIZE: i64 = 100;

/// Company representation returned to clients
///
/// Credential digests stay on the server; only their presence is exposed.
#[derive(Debug, Serialize, Deserialize)]
pub struct CompanyResponse {
    /// Company ID
    pub id: Uuid,

    /// Company name
    pub name: String,

    /// Whether red61 booking credentials are on file
    pub has_red61_credentials: bool,

    /// When the company was created
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<Company> for CompanyResponse {
    fn from(company: Company) -> Self {
        let has_red61_credentials = company.has_red61_credentials();
        Self {
            id: company.id,
            name: company.name,
            has_red61_credentials,
            created_at: company.created_at,
        }
    }
}

/// Company creation request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCompanyRequest {
    /// Company name
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,

    /// red61 account username (plaintext; hashed before storage)
    pub red61_username: Option<String>,

    /// red61 account password (plaintext; hashed before storage)
    pub red61_password: Option<String>,
}

/// Company update request
///
/// Credentials included here are plaintext and re-hashed; absent fields
/// leave the stored digests untouched.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCompanyRequest {
    /// New name
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: Option<String>,

    /// New red61 username
    pub red61_username: Option<String>,

    /// New red61 password
    pub red61_password: Option<String>,
}

/// Creates a company
///
/// # Endpoint
///
/// ```text
/// POST /v1/companies
/// Content-Type: application/json
///
/// {
///   "name": "Fringe Productions",
///   "red61_username": "fringe-box-office",
///   "red61_password": "secret"
/// }
/// ```
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Validation failed
/// - `500 Internal Server Error`: Server error
pub async fn create_company(
    State(state): State<AppState>,
    Json(req): Json<CreateCompanyRequest>,
) -> ApiResult<Json<CompanyResponse>> {
    req.validate().map_err(ApiError::from_validation)?;

    // Hash the booking credentials before anything touches the database;
    // a hashing failure aborts the write
    let red61_username_hash = match req.red61_username {
        Some(username) => Some(password::hash_secret(&username)?),
        None => None,
    };
    let red61_password_hash = match req.red61_password {
        Some(secret) => Some(password::hash_secret(&secret)?),
        None => None,
    };

    let company = Company::create(
        &state.db,
        CreateCompany {
            name: req.name,
            red61_username_hash,
            red61_password_hash,
        },
    )
    .await?;

    tracing::info!(company_id = %company.id, "Company created");

    Ok(Json(CompanyResponse::from(company)))
}

/// Lists companies
///
/// # Endpoint
///
/// ```text
/// GET /v1/companies
/// ```
pub async fn list_companies(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<CompanyResponse>>> {
    let companies = Company::list(&state.db, DEFAULT_PAGE_SIZE, 0).await?;

    Ok(Json(
        companies.into_iter().map(CompanyResponse::from).collect(),
    ))
}

/// Fetches a single company
///
/// # Endpoint
///
/// ```text
/// GET /v1/companies/:id
/// ```
///
/// # Errors
///
/// - `404 Not Found`: Unknown company ID
pub async fn get_company(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<CompanyResponse>> {
    let company = Company::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Company not found".to_string()))?;

    Ok(Json(CompanyResponse::from(company)))
}

/// Updates a company
///
/// Only supplied fields change; a patch without credentials cannot disturb
/// the stored digests.
///
/// # Endpoint
///
/// ```text
/// POST /v1/companies/:id
/// Content-Type: application/json
///
/// { "name": "Fringe Productions Ltd" }
/// ```
///
/// # Errors
///
/// - `404 Not Found`: Unknown company ID
/// - `422 Unprocessable Entity`: Validation failed
pub async fn update_company(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateCompanyRequest>,
) -> ApiResult<Json<CompanyResponse>> {
    req.validate().map_err(ApiError::from_validation)?;

    let red61_username_hash = match req.red61_username {
        Some(username) => Some(password::hash_secret(&username)?),
        None => None,
    };
    let red61_password_hash = match req.red61_password {
        Some(secret) => Some(password::hash_secret(&secret)?),
        None => None,
    };

    let company = Company::update(
        &state.db,
        id,
        UpdateCompany {
            name: req.name,
            red61_username_hash,
            red61_password_hash,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Company not found".to_string()))?;

    Ok(Json(CompanyResponse::from(company)))
}

/// Deletes a company
///
/// Affiliation rows pointing at the company cascade away with it.
///
/// # Endpoint
///
/// ```text
/// DELETE /v1/companies/:id
/// ```
///
/// # Errors
///
/// - `404 Not Found`: Unknown company ID
pub async fn delete_company(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    let deleted = Company::delete(&state.db, id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Company not found".to_string()));
    }

    tracing::info!(company_id = %id, "Company deleted");

    Ok(Json(serde_json::json!({ "deleted": true })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_company_response_hides_credentials() {
        let company = Company {
            id: Uuid::new_v4(),
            name: "Fringe Productions".to_string(),
            red61_username_hash: Some("$argon2id$u".to_string()),
            red61_password_hash: Some("$argon2id$p".to_string()),
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };

        let response = CompanyResponse::from(company);
        let json = serde_json::to_string(&response).unwrap();

        assert!(!json.contains("argon2id"));
        assert!(json.contains("\"has_red61_credentials\":true"));
    }

    #[test]
    fn test_create_request_validation() {
        let req = CreateCompanyRequest {
            name: "Fringe Productions".to_string(),
            red61_username: None,
            red61_password: None,
        };
        assert!(req.validate().is_ok());

        let req = CreateCompanyRequest {
            name: "".to_string(),
            red61_username: None,
            red61_password: None,
        };
        assert!(req.validate().is_err());
    }
}
