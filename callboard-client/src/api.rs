/// HTTP client for the Callboard API
///
/// Thin reqwest wrapper over the server's endpoints. Once a token is set
/// (by login or by the session store restoring one), it is sent as
/// `Authorization: Bearer <token>` on every request.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Error type for client operations
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport-level failure (connection refused, timeout, bad JSON)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server rejected the request
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Server-supplied message
        message: String,
    },

    /// An authenticated call was made without a token
    #[error("Not authenticated")]
    NotAuthenticated,
}

impl ClientError {
    /// Whether the server rejected the credentials/session (401)
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ClientError::Api { status: 401, .. })
    }
}

/// User as returned by the API (no sensitive fields)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub nickname: Option<String>,
    pub email: String,
    pub is_artist: bool,
    pub created_at: DateTime<Utc>,
}

/// Company as returned by the API
///
/// Booking credentials never cross the wire; only their presence does.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub id: Uuid,
    pub name: String,
    pub has_red61_credentials: bool,
    pub created_at: DateTime<Utc>,
}

/// New account payload for registration
#[derive(Debug, Clone, Serialize)]
pub struct NewUser {
    pub name: String,
    pub nickname: Option<String>,
    pub email: String,
    pub password: String,
    pub is_artist: bool,
}

/// Profile patch; absent fields stay unchanged on the server
#[derive(Debug, Clone, Default, Serialize)]
pub struct UserPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_artist: Option<bool>,
}

/// New company payload
#[derive(Debug, Clone, Serialize)]
pub struct NewCompany {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub red61_username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub red61_password: Option<String>,
}

/// Successful login payload
#[derive(Debug, Clone, Deserialize)]
pub struct LoginData {
    /// Session token; persist it to survive restarts
    pub token: String,

    /// When the session expires
    pub expires_at: DateTime<Utc>,

    /// The authenticated user
    pub user: UserProfile,
}

/// Server error body
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[allow(dead_code)]
    error: String,
    message: String,
}

/// Callboard API client
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
    token: Option<String>,
}

impl ApiClient {
    /// Creates a client against a server base URL (no trailing slash)
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }

        Self {
            base_url,
            http: reqwest::Client::new(),
            token: None,
        }
    }

    /// Attaches a session token to subsequent requests
    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }

    /// Drops the session token
    pub fn clear_token(&mut self) {
        self.token = None;
    }

    /// The currently attached token, if any
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Builds a request, attaching the token when present
    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let mut builder = self.http.request(method, self.url(path));
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    /// Decodes a response, turning non-2xx statuses into `ClientError::Api`
    async fn decode<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();
        if status.is_success() {
            Ok(response.json::<T>().await?)
        } else {
            let message = match response.json::<ErrorBody>().await {
                Ok(body) => body.message,
                Err(_) => status
                    .canonical_reason()
                    .unwrap_or("Unknown error")
                    .to_string(),
            };
            Err(ClientError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }

    fn require_token(&self) -> Result<(), ClientError> {
        if self.token.is_none() {
            return Err(ClientError::NotAuthenticated);
        }
        Ok(())
    }

    // ---- auth ----

    /// Registers a new account
    pub async fn register(&self, new_user: &NewUser) -> Result<UserProfile, ClientError> {
        let response = self
            .request(reqwest::Method::POST, "/v1/auth/register")
            .json(new_user)
            .send()
            .await?;
        Self::decode(response).await
    }

    /// Logs in; the caller decides what to do with the returned token
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginData, ClientError> {
        let response = self
            .request(reqwest::Method::POST, "/v1/auth/login")
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;
        Self::decode(response).await
    }

    /// Revokes the attached session on the server; idempotent
    pub async fn logout(&self) -> Result<(), ClientError> {
        let response = self
            .request(reqwest::Method::POST, "/v1/auth/logout")
            .send()
            .await?;
        let _: serde_json::Value = Self::decode(response).await?;
        Ok(())
    }

    /// Fetches the account behind the attached session
    pub async fn current_user(&self) -> Result<UserProfile, ClientError> {
        self.require_token()?;
        let response = self
            .request(reqwest::Method::GET, "/v1/auth/me")
            .send()
            .await?;
        Self::decode(response).await
    }

    // ---- users ----

    /// Lists all users
    pub async fn list_users(&self) -> Result<Vec<UserProfile>, ClientError> {
        self.require_token()?;
        let response = self.request(reqwest::Method::GET, "/v1/users").send().await?;
        Self::decode(response).await
    }

    /// Lists artist accounts
    pub async fn list_artists(&self) -> Result<Vec<UserProfile>, ClientError> {
        self.require_token()?;
        let response = self
            .request(reqwest::Method::GET, "/v1/users/artists")
            .send()
            .await?;
        Self::decode(response).await
    }

    /// Lists producer accounts
    pub async fn list_producers(&self) -> Result<Vec<UserProfile>, ClientError> {
        self.require_token()?;
        let response = self
            .request(reqwest::Method::GET, "/v1/users/producers")
            .send()
            .await?;
        Self::decode(response).await
    }

    /// Fetches a single user
    pub async fn get_user(&self, id: Uuid) -> Result<UserProfile, ClientError> {
        self.require_token()?;
        let response = self
            .request(reqwest::Method::GET, &format!("/v1/users/{}", id))
            .send()
            .await?;
        Self::decode(response).await
    }

    /// Updates the caller's own profile
    pub async fn update_user(
        &self,
        id: Uuid,
        patch: &UserPatch,
    ) -> Result<UserProfile, ClientError> {
        self.require_token()?;
        let response = self
            .request(reqwest::Method::POST, &format!("/v1/users/{}", id))
            .json(patch)
            .send()
            .await?;
        Self::decode(response).await
    }

    /// Deletes the caller's own account
    pub async fn delete_user(&self, id: Uuid) -> Result<(), ClientError> {
        self.require_token()?;
        let response = self
            .request(reqwest::Method::DELETE, &format!("/v1/users/{}", id))
            .send()
            .await?;
        let _: serde_json::Value = Self::decode(response).await?;
        Ok(())
    }

    /// Affiliates a company with a user; returns the updated company set
    pub async fn add_company_to_user(
        &self,
        user_id: Uuid,
        company_id: Uuid,
    ) -> Result<Vec<CompanyProfile>, ClientError> {
        self.require_token()?;
        let response = self
            .request(
                reqwest::Method::POST,
                &format!("/v1/users/{}/companies", user_id),
            )
            .json(&serde_json::json!({ "company_id": company_id }))
            .send()
            .await?;
        Self::decode(response).await
    }

    /// Lists the companies affiliated with a user
    pub async fn list_user_companies(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<CompanyProfile>, ClientError> {
        self.require_token()?;
        let response = self
            .request(
                reqwest::Method::GET,
                &format!("/v1/users/{}/companies", user_id),
            )
            .send()
            .await?;
        Self::decode(response).await
    }

    // ---- companies ----

    /// Creates a company
    pub async fn create_company(
        &self,
        new_company: &NewCompany,
    ) -> Result<CompanyProfile, ClientError> {
        self.require_token()?;
        let response = self
            .request(reqwest::Method::POST, "/v1/companies")
            .json(new_company)
            .send()
            .await?;
        Self::decode(response).await
    }

    /// Lists companies
    pub async fn list_companies(&self) -> Result<Vec<CompanyProfile>, ClientError> {
        self.require_token()?;
        let response = self
            .request(reqwest::Method::GET, "/v1/companies")
            .send()
            .await?;
        Self::decode(response).await
    }

    /// Fetches a single company
    pub async fn get_company(&self, id: Uuid) -> Result<CompanyProfile, ClientError> {
        self.require_token()?;
        let response = self
            .request(reqwest::Method::GET, &format!("/v1/companies/{}", id))
            .send()
            .await?;
        Self::decode(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = ApiClient::new("http://localhost:8080/");
        assert_eq!(client.url("/health"), "http://localhost:8080/health");

        let client = ApiClient::new("http://localhost:8080");
        assert_eq!(client.url("/health"), "http://localhost:8080/health");
    }

    #[test]
    fn test_token_attachment() {
        let mut client = ApiClient::new("http://localhost:8080");
        assert!(client.token().is_none());

        client.set_token("cb_abc123");
        assert_eq!(client.token(), Some("cb_abc123"));

        client.clear_token();
        assert!(client.token().is_none());
    }

    #[test]
    fn test_unauthenticated_guard() {
        let client = ApiClient::new("http://localhost:8080");
        assert!(matches!(
            client.require_token(),
            Err(ClientError::NotAuthenticated)
        ));
    }

    #[test]
    fn test_is_unauthorized() {
        let err = ClientError::Api {
            status: 401,
            message: "Session expired".to_string(),
        };
        assert!(err.is_unauthorized());

        let err = ClientError::Api {
            status: 404,
            message: "Not found".to_string(),
        };
        assert!(!err.is_unauthorized());
    }

    #[test]
    fn test_user_patch_skips_absent_fields() {
        let patch = UserPatch {
            name: Some("new name".to_string()),
            ..Default::default()
        };

        let json = serde_json::to_string(&patch).unwrap();
        assert_eq!(json, r#"{"name":"new name"}"#);
    }
}
