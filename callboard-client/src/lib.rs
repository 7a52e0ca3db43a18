//! # Callboard Client
//!
//! Typed client for the Callboard API: an HTTP wrapper over every
//! endpoint plus a current-user store with an explicit lifecycle.
//!
//! The store replaces the usual front-end pattern of a global mutable
//! "current user" context: state is held in a value you own, the token
//! store is injected, and the signed-in/loading/anonymous transitions are
//! spelled out in one place.
//!
//! ## Example
//!
//! ```no_run
//! use callboard_client::api::ApiClient;
//! use callboard_client::store::{MemoryTokenStore, SessionStore};
//!
//! # async fn example() -> Result<(), callboard_client::api::ClientError> {
//! let api = ApiClient::new("http://localhost:8080");
//! let mut session = SessionStore::new(api, MemoryTokenStore::default());
//!
//! // Restores a persisted login, if any
//! session.init().await;
//!
//! session.login("user@email.com", "password").await?;
//! assert!(session.is_authenticated());
//!
//! session.logout().await;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod store;
