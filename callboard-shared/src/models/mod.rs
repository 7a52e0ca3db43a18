/// Database models for Callboard
///
/// This module contains all database models and their CRUD operations.
///
/// # Models
///
/// - `user`: Platform accounts (artists and producers)
/// - `company`: Production companies with optional booking credentials
/// - `affiliation`: User-company many-to-many links
/// - `session`: Revocable login credentials
///
/// # Example
///
/// ```no_run
/// use callboard_shared::models::user::{User, CreateUser};
/// use callboard_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let user = User::create(&pool, CreateUser {
///     name: "Nick".to_string(),
///     nickname: None,
///     email: "user@email.com".to_string(),
///     password_hash: "$argon2id$...".to_string(),
///     is_artist: false,
/// }).await?;
/// # Ok(())
/// # }
/// ```

pub mod affiliation;
pub mod company;
pub mod session;
pub mod user;
