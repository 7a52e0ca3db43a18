/// Authentication and authorization utilities
///
/// This module provides the secure primitives Callboard is built on:
///
/// # Modules
///
/// - [`password`]: Argon2id hashing for passwords and booking credentials
/// - [`middleware`]: Session-token authentication middleware for axum
/// - [`authorization`]: Caller-scoping checks for protected routes
///
/// # Security Features
///
/// - **Secret Hashing**: Argon2id with 64 MB memory, 3 iterations; used for
///   user passwords and third-party booking-system credentials alike
/// - **Session Tokens**: Opaque random tokens, stored only as SHA-256
///   digests, revocable on logout
/// - **Constant-time Comparison**: All verification uses constant-time
///   operations
///
/// # Example
///
/// ```no_run
/// use callboard_shared::auth::password::{hash_password, verify_password};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod middleware;
pub mod password;
