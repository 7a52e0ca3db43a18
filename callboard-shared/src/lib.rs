//! # Callboard Shared Library
//!
//! This crate contains the types, persistence layer and authentication
//! primitives shared between the Callboard API server and its clients.
//!
//! ## Module Organization
//!
//! - `models`: Database models (users, companies, affiliations, sessions)
//! - `auth`: Password hashing, session middleware, authorization checks
//! - `db`: PostgreSQL connection pool and migration runner

pub mod auth;
pub mod db;
pub mod models;

/// Current version of the Callboard shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
