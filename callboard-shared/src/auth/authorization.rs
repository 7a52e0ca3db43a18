/// Authorization helpers for protected routes
///
/// Callboard's authorization model is deliberately small: a user record
/// belongs to the user it describes, and the mutating user routes (update,
/// delete, company association) are scoped to the authenticated caller.
/// There is no role hierarchy - every authenticated user can read the
/// public collections.
///
/// # Example
///
/// ```
/// use callboard_shared::auth::authorization::require_self;
/// use callboard_shared::auth::middleware::AuthContext;
/// use uuid::Uuid;
///
/// # fn example(auth: &AuthContext, target: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// // Rejects when the caller tries to modify someone else's record
/// require_self(auth, target)?;
/// # Ok(())
/// # }
/// ```

use uuid::Uuid;

use super::middleware::AuthContext;

/// Error type for authorization checks
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// Caller is not the owner of the targeted record
    #[error("Not authorized to access this resource")]
    NotAuthorized,
}

/// Requires that the authenticated caller is the targeted user
///
/// # Errors
///
/// Returns `AuthzError::NotAuthorized` when `target_user_id` differs from
/// the caller's own ID
pub fn require_self(auth: &AuthContext, target_user_id: Uuid) -> Result<(), AuthzError> {
    if auth.user_id == target_user_id {
        Ok(())
    } else {
        Err(AuthzError::NotAuthorized)
    }
}
