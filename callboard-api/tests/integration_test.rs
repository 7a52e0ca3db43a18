/// Integration tests for the Callboard API
///
/// These tests drive the full router end-to-end:
/// - Registration, login, logout lifecycle
/// - Session gating of protected routes
/// - Hash-at-rest of passwords and booking credentials
/// - Company association (idempotency included)
/// - Caller scoping of user mutation routes
///
/// They need a PostgreSQL instance via `DATABASE_URL` and skip themselves
/// when it is not set.

mod common;

use axum::http::StatusCode;
use common::{unique_email, TestContext};
use serde_json::json;

/// Register → login → wrong password → logout → rejected
#[tokio::test]
async fn test_auth_lifecycle() {
    let Some(ctx) = TestContext::try_new().await else {
        return;
    };

    let email = unique_email("lifecycle");

    // Register returns the user without sensitive fields
    let user = ctx.register_user(&email, "password", false).await;
    assert_eq!(user["email"].as_str().unwrap(), email);
    assert!(user.get("password").is_none());
    assert!(user.get("password_hash").is_none());

    // Login with the same credentials succeeds and yields a session
    let token = ctx.login_user(&email, "password").await;
    assert!(token.starts_with("cb_"));

    // The session authenticates protected requests
    let (status, me) = ctx.request("GET", "/v1/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"].as_str().unwrap(), email);

    // Login with the wrong password is rejected
    let (status, _) = ctx
        .request(
            "POST",
            "/v1/auth/login",
            None,
            Some(json!({ "email": email, "password": "wrong-password" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Logout revokes the session
    let (status, body) = ctx
        .request("POST", "/v1/auth/logout", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["logged_out"], true);

    // The revoked token no longer authenticates
    let (status, _) = ctx.request("GET", "/v1/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Logout is idempotent
    let (status, _) = ctx
        .request("POST", "/v1/auth/logout", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    // A fresh login works again
    let token = ctx.login_user(&email, "password").await;
    let (status, _) = ctx.request("GET", "/v1/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
}

/// The stored password is a hash, never the submitted plaintext
#[tokio::test]
async fn test_password_stored_hashed() {
    let Some(ctx) = TestContext::try_new().await else {
        return;
    };

    let email = unique_email("hashed");
    ctx.register_user(&email, "password", false).await;

    let (stored,): (String,) =
        sqlx::query_as("SELECT password_hash FROM users WHERE email = $1")
            .bind(&email)
            .fetch_one(&ctx.db)
            .await
            .unwrap();

    assert_ne!(stored, "password");
    assert!(stored.starts_with("$argon2id$"));
}

/// Registration validates input and rejects duplicate emails
#[tokio::test]
async fn test_register_validation() {
    let Some(ctx) = TestContext::try_new().await else {
        return;
    };

    // Garbage payload is rejected
    let (status, _) = ctx
        .request(
            "POST",
            "/v1/auth/register",
            None,
            Some(json!({ "nothing": "nadie" })),
        )
        .await;
    assert!(!status.is_success());

    // Invalid fields are collected into a validation error
    let (status, body) = ctx
        .request(
            "POST",
            "/v1/auth/register",
            None,
            Some(json!({
                "name": "",
                "email": "not-an-email",
                "password": "short",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "validation_error");

    // Duplicate email conflicts
    let email = unique_email("duplicate");
    ctx.register_user(&email, "password", false).await;
    let (status, _) = ctx
        .request(
            "POST",
            "/v1/auth/register",
            None,
            Some(json!({
                "name": "nick",
                "email": email,
                "password": "password",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

/// Protected routes reject anonymous requests
#[tokio::test]
async fn test_protected_routes_require_session() {
    let Some(ctx) = TestContext::try_new().await else {
        return;
    };

    for uri in ["/v1/auth/me", "/v1/users", "/v1/companies"] {
        let (status, _) = ctx.request("GET", uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{} should be gated", uri);
    }

    // A made-up token is also rejected
    let (status, _) = ctx
        .request("GET", "/v1/users", Some("cb_not_a_real_token_000000000"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

/// Artist/producer collections filter on the is_artist flag
#[tokio::test]
async fn test_user_collections() {
    let Some(ctx) = TestContext::try_new().await else {
        return;
    };

    let artist_email = unique_email("artist");
    let producer_email = unique_email("producer");
    ctx.register_user(&artist_email, "password", true).await;
    ctx.register_user(&producer_email, "password", false).await;

    let token = ctx.login_user(&producer_email, "password").await;

    let (status, artists) = ctx
        .request("GET", "/v1/users/artists", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let artists = artists.as_array().unwrap();
    assert!(artists
        .iter()
        .any(|u| u["email"].as_str() == Some(artist_email.as_str())));
    assert!(artists.iter().all(|u| u["is_artist"] == true));

    let (status, producers) = ctx
        .request("GET", "/v1/users/producers", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let producers = producers.as_array().unwrap();
    assert!(producers
        .iter()
        .any(|u| u["email"].as_str() == Some(producer_email.as_str())));
    assert!(producers.iter().all(|u| u["is_artist"] == false));
}

/// Update and delete are scoped to the caller's own record
#[tokio::test]
async fn test_user_mutation_scoping() {
    let Some(ctx) = TestContext::try_new().await else {
        return;
    };

    let alice_email = unique_email("alice");
    let bob_email = unique_email("bob");
    let alice = ctx.register_user(&alice_email, "password", false).await;
    ctx.register_user(&bob_email, "password", false).await;

    let alice_id = alice["id"].as_str().unwrap().to_string();
    let bob_token = ctx.login_user(&bob_email, "password").await;

    // Bob cannot modify Alice's record
    let (status, _) = ctx
        .request(
            "POST",
            &format!("/v1/users/{}", alice_id),
            Some(&bob_token),
            Some(json!({ "name": "hijacked" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Nor delete it
    let (status, _) = ctx
        .request(
            "DELETE",
            &format!("/v1/users/{}", alice_id),
            Some(&bob_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Alice can update herself
    let alice_token = ctx.login_user(&alice_email, "password").await;
    let (status, updated) = ctx
        .request(
            "POST",
            &format!("/v1/users/{}", alice_id),
            Some(&alice_token),
            Some(json!({ "name": "new name" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "new name");
}

/// Deleting an account makes subsequent lookups 404
#[tokio::test]
async fn test_delete_user() {
    let Some(ctx) = TestContext::try_new().await else {
        return;
    };

    let victim_email = unique_email("deleted");
    let observer_email = unique_email("observer");
    let victim = ctx.register_user(&victim_email, "password", false).await;
    ctx.register_user(&observer_email, "password", false).await;

    let victim_id = victim["id"].as_str().unwrap().to_string();
    let victim_token = ctx.login_user(&victim_email, "password").await;

    let (status, body) = ctx
        .request(
            "DELETE",
            &format!("/v1/users/{}", victim_id),
            Some(&victim_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted"], true);

    // The victim's session died with the account; use an observer to look
    let observer_token = ctx.login_user(&observer_email, "password").await;
    let (status, _) = ctx
        .request(
            "GET",
            &format!("/v1/users/{}", victim_id),
            Some(&observer_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

/// Companies store booking credentials hashed and never echo them
#[tokio::test]
async fn test_company_credentials_hashed() {
    let Some(ctx) = TestContext::try_new().await else {
        return;
    };

    let email = unique_email("company-owner");
    ctx.register_user(&email, "password", false).await;
    let token = ctx.login_user(&email, "password").await;

    let (status, company) = ctx
        .request(
            "POST",
            "/v1/companies",
            Some(&token),
            Some(json!({
                "name": "Fringe Productions",
                "red61_username": "fringe-box-office",
                "red61_password": "red61-secret",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(company["has_red61_credentials"], true);
    assert!(company.get("red61_username").is_none());
    assert!(company.get("red61_password").is_none());

    let company_id: uuid::Uuid = company["id"].as_str().unwrap().parse().unwrap();
    let (username_hash, password_hash): (Option<String>, Option<String>) = sqlx::query_as(
        "SELECT red61_username_hash, red61_password_hash FROM companies WHERE id = $1",
    )
    .bind(company_id)
    .fetch_one(&ctx.db)
    .await
    .unwrap();

    let username_hash = username_hash.unwrap();
    let password_hash = password_hash.unwrap();
    assert_ne!(username_hash, "fringe-box-office");
    assert_ne!(password_hash, "red61-secret");
    assert!(username_hash.starts_with("$argon2id$"));
    assert!(password_hash.starts_with("$argon2id$"));

    // A name-only patch leaves the stored digests untouched
    let (status, patched) = ctx
        .request(
            "POST",
            &format!("/v1/companies/{}", company_id),
            Some(&token),
            Some(json!({ "name": "Fringe Productions Ltd" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched["name"], "Fringe Productions Ltd");

    let (after_username, after_password): (Option<String>, Option<String>) = sqlx::query_as(
        "SELECT red61_username_hash, red61_password_hash FROM companies WHERE id = $1",
    )
    .bind(company_id)
    .fetch_one(&ctx.db)
    .await
    .unwrap();

    assert_eq!(after_username.unwrap(), username_hash);
    assert_eq!(after_password.unwrap(), password_hash);
}

/// Associating a company is idempotent and requires both ends to exist
#[tokio::test]
async fn test_company_association() {
    let Some(ctx) = TestContext::try_new().await else {
        return;
    };

    let email = unique_email("affiliate");
    let user = ctx.register_user(&email, "password", true).await;
    let user_id = user["id"].as_str().unwrap().to_string();
    let token = ctx.login_user(&email, "password").await;

    let (_, company) = ctx
        .request(
            "POST",
            "/v1/companies",
            Some(&token),
            Some(json!({ "name": "Touring Co" })),
        )
        .await;
    let company_id = company["id"].as_str().unwrap().to_string();

    // Associate
    let (status, companies) = ctx
        .request(
            "POST",
            &format!("/v1/users/{}/companies", user_id),
            Some(&token),
            Some(json!({ "company_id": company_id })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(companies.as_array().unwrap().len(), 1);

    // Duplicate association is a no-op
    let (status, companies) = ctx
        .request(
            "POST",
            &format!("/v1/users/{}/companies", user_id),
            Some(&token),
            Some(json!({ "company_id": company_id })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(companies.as_array().unwrap().len(), 1);

    // Unknown company is a 404
    let (status, _) = ctx
        .request(
            "POST",
            &format!("/v1/users/{}/companies", user_id),
            Some(&token),
            Some(json!({ "company_id": uuid::Uuid::new_v4() })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // The set reads back
    let (status, companies) = ctx
        .request(
            "GET",
            &format!("/v1/users/{}/companies", user_id),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let companies = companies.as_array().unwrap();
    assert_eq!(companies.len(), 1);
    assert_eq!(companies[0]["name"], "Touring Co");
}

/// Health endpoint is public and reports database connectivity
#[tokio::test]
async fn test_health_check() {
    let Some(ctx) = TestContext::try_new().await else {
        return;
    };

    let (status, body) = ctx.request("GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "connected");
}
