/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Authentication endpoints (register, login, logout, me)
/// - `users`: User collections, profile CRUD, company association
/// - `companies`: Company CRUD

pub mod auth;
pub mod companies;
pub mod health;
pub mod users;
