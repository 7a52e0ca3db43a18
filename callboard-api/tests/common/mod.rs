/// Common test utilities for integration tests
///
/// This module provides shared infrastructure for integration tests:
/// - Test database setup (migrations included)
/// - Router construction
/// - Registration/login helpers driving the real endpoints
///
/// The tests need a reachable PostgreSQL instance; when `DATABASE_URL` is
/// not set they skip themselves rather than fail.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use callboard_api::app::{build_router, AppState};
use callboard_api::config::{ApiConfig, Config, DatabaseConfig, SessionConfig};
use sqlx::PgPool;
use tower::Service as _;
use uuid::Uuid;

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,
}

impl TestContext {
    /// Creates a test context against the database named by `DATABASE_URL`
    ///
    /// Returns None (so the caller can skip) when the variable is unset.
    pub async fn try_new() -> Option<Self> {
        let url = match std::env::var("DATABASE_URL") {
            Ok(url) => url,
            Err(_) => {
                eprintln!("skipping: DATABASE_URL not set");
                return None;
            }
        };

        let db = PgPool::connect(&url)
            .await
            .expect("Failed to connect to test database");

        // Path relative to the callboard-api crate root
        sqlx::migrate!("../migrations")
            .run(&db)
            .await
            .expect("Failed to run migrations");

        let config = Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors_origins: vec!["*".to_string()],
                production: false,
            },
            database: DatabaseConfig {
                url,
                max_connections: 5,
            },
            session: SessionConfig { ttl_hours: 24 },
        };

        let state = AppState::new(db.clone(), config);
        let app = build_router(state);

        Some(Self { db, app })
    }

    /// Sends a request through the router and returns (status, JSON body)
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }

        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self
            .app
            .clone()
            .call(request)
            .await
            .expect("Request should not fail at the transport level");

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
        };

        (status, json)
    }

    /// Registers a user via the real endpoint; returns the response body
    pub async fn register_user(
        &self,
        email: &str,
        password: &str,
        is_artist: bool,
    ) -> serde_json::Value {
        let (status, body) = self
            .request(
                "POST",
                "/v1/auth/register",
                None,
                Some(serde_json::json!({
                    "name": "nick",
                    "nickname": "funky duck",
                    "is_artist": is_artist,
                    "email": email,
                    "password": password,
                })),
            )
            .await;

        assert_eq!(status, StatusCode::OK, "register failed: {}", body);
        body
    }

    /// Logs a user in via the real endpoint; returns the session token
    pub async fn login_user(&self, email: &str, password: &str) -> String {
        let (status, body) = self
            .request(
                "POST",
                "/v1/auth/login",
                None,
                Some(serde_json::json!({ "email": email, "password": password })),
            )
            .await;

        assert_eq!(status, StatusCode::OK, "login failed: {}", body);
        body["token"].as_str().expect("token in response").to_string()
    }
}

/// A unique email for this test run, so reruns against a shared database
/// never collide on the unique constraint
pub fn unique_email(tag: &str) -> String {
    format!("{}-{}@email.com", tag, Uuid::new_v4())
}
