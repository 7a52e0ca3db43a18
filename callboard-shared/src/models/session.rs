/// Session model and database operations
///
/// A session is the ephemeral credential proving a user's identity between
/// login and logout. The plaintext token is generated at login, handed to
/// the client exactly once, and only its SHA-256 digest is persisted.
/// Logout revokes the row, which immediately invalidates the token for
/// every subsequent request; expiry does the same passively.
///
/// # Security
///
/// - Tokens are stored as SHA-256 hashes (never plaintext)
/// - Tokens are prefixed with "cb_" for identification
/// - The full token is only returned on creation (never again)
/// - Sessions can be revoked (logout) or expire
///
/// # Schema
///
/// ```sql
/// CREATE TABLE sessions (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     token_prefix VARCHAR(10) NOT NULL,
///     token_hash VARCHAR(64) NOT NULL UNIQUE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     last_seen_at TIMESTAMPTZ,
///     revoked BOOLEAN NOT NULL DEFAULT FALSE,
///     revoked_at TIMESTAMPTZ,
///     expires_at TIMESTAMPTZ NOT NULL
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use callboard_shared::models::session::Session;
/// use callboard_shared::db::pool::{create_pool, DatabaseConfig};
/// use uuid::Uuid;
///
/// # async fn example(user_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// // Log a user in
/// let (session, token) = Session::create(&pool, user_id, 24).await?;
///
/// // IMPORTANT: hand `token` to the client now - it's never shown again!
///
/// // Later: log them out
/// Session::revoke_by_token(&pool, &token).await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use uuid::Uuid;

/// Session model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Session {
    /// Unique session ID
    pub id: Uuid,

    /// User this session authenticates
    pub user_id: Uuid,

    /// First 10 characters of the token (for display/debugging)
    pub token_prefix: String,

    /// SHA-256 hash of the full token (never store plaintext!)
    pub token_hash: String,

    /// When the session was established (login time)
    pub created_at: DateTime<Utc>,

    /// When the session last authenticated a request
    pub last_seen_at: Option<DateTime<Utc>>,

    /// Whether the session has been revoked (logout)
    pub revoked: bool,

    /// When the session was revoked (if applicable)
    pub revoked_at: Option<DateTime<Utc>>,

    /// When the session expires
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Generates a secure random session token
    ///
    /// Format: cb_{32_random_chars}
    ///
    /// # Example
    ///
    /// ```
    /// use callboard_shared::models::session::Session;
    ///
    /// let token = Session::generate_token();
    /// assert!(token.starts_with("cb_"));
    /// assert_eq!(token.len(), 35); // "cb_" (3) + 32 chars
    /// ```
    pub fn generate_token() -> String {
        use rand::Rng;
        const CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
        let mut rng = rand::thread_rng();

        let random: String = (0..32)
            .map(|_| {
                let idx = rng.gen_range(0..CHARSET.len());
                CHARSET[idx] as char
            })
            .collect();

        format!("cb_{}", random)
    }

    /// Hashes a session token with SHA-256
    ///
    /// # Example
    ///
    /// ```
    /// use callboard_shared::models::session::Session;
    ///
    /// let hash = Session::hash_token("cb_abc123");
    /// assert_eq!(hash.len(), 64); // SHA-256 hex is 64 chars
    /// ```
    pub fn hash_token(token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Extracts the prefix from a token (first 10 chars)
    pub fn extract_prefix(token: &str) -> String {
        token.chars().take(10).collect()
    }

    /// Checks if the session has passed its expiry time
    pub fn is_expired(&self) -> bool {
        self.expires_at < Utc::now()
    }

    /// Checks if the session can still authenticate requests
    ///
    /// A session is live when it is neither revoked nor expired.
    pub fn is_live(&self) -> bool {
        !self.revoked && !self.is_expired()
    }

    /// Establishes a new session for a user
    ///
    /// Returns both the database record and the plaintext token.
    /// **IMPORTANT**: The plaintext token is only returned once and never
    /// stored!
    ///
    /// # Arguments
    ///
    /// * `pool` - Database connection pool
    /// * `user_id` - User logging in
    /// * `ttl_hours` - Session lifetime in hours
    ///
    /// # Returns
    ///
    /// Tuple of (Session record, plaintext token string)
    ///
    /// # Errors
    ///
    /// Returns an error if the user does not exist (foreign key violation)
    /// or the database operation fails
    pub async fn create(
        pool: &PgPool,
        user_id: Uuid,
        ttl_hours: i64,
    ) -> Result<(Self, String), sqlx::Error> {
        let token = Self::generate_token();
        let token_hash = Self::hash_token(&token);
        let token_prefix = Self::extract_prefix(&token);
        let expires_at = Utc::now() + Duration::hours(ttl_hours);

        let session = sqlx::query_as::<_, Session>(
            r#"
            INSERT INTO sessions (user_id, token_prefix, token_hash, expires_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, token_prefix, token_hash, created_at,
                      last_seen_at, revoked, revoked_at, expires_at
            "#,
        )
        .bind(user_id)
        .bind(token_prefix)
        .bind(token_hash)
        .bind(expires_at)
        .fetch_one(pool)
        .await?;

        Ok((session, token))
    }

    /// Finds a session by its plaintext token, regardless of state
    ///
    /// Unlike [`Session::validate`], this also returns revoked and expired
    /// sessions, so callers can distinguish "no such session" from
    /// "session expired" when rejecting a request.
    pub async fn find_by_token(
        pool: &PgPool,
        token: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let token_hash = Self::hash_token(token);

        let session = sqlx::query_as::<_, Session>(
            r#"
            SELECT id, user_id, token_prefix, token_hash, created_at,
                   last_seen_at, revoked, revoked_at, expires_at
            FROM sessions
            WHERE token_hash = $1
            "#,
        )
        .bind(token_hash)
        .fetch_optional(pool)
        .await?;

        Ok(session)
    }

    /// Validates a session token and returns the session if it is live
    ///
    /// Checks:
    /// - Token hash matches
    /// - Not revoked
    /// - Not expired
    ///
    /// Also updates `last_seen_at` if valid.
    pub async fn validate(pool: &PgPool, token: &str) -> Result<Option<Self>, sqlx::Error> {
        let token_hash = Self::hash_token(token);

        let session = sqlx::query_as::<_, Session>(
            r#"
            UPDATE sessions
            SET last_seen_at = NOW()
            WHERE token_hash = $1
              AND revoked = FALSE
              AND expires_at > NOW()
            RETURNING id, user_id, token_prefix, token_hash, created_at,
                      last_seen_at, revoked, revoked_at, expires_at
            "#,
        )
        .bind(token_hash)
        .fetch_optional(pool)
        .await?;

        Ok(session)
    }

    /// Revokes the session matching a plaintext token (logout)
    ///
    /// Idempotent: revoking a token that is unknown or already revoked is
    /// not an error.
    ///
    /// # Returns
    ///
    /// True if a live session was revoked, false otherwise
    pub async fn revoke_by_token(pool: &PgPool, token: &str) -> Result<bool, sqlx::Error> {
        let token_hash = Self::hash_token(token);

        let result = sqlx::query(
            r#"
            UPDATE sessions
            SET revoked = TRUE, revoked_at = NOW()
            WHERE token_hash = $1 AND revoked = FALSE
            "#,
        )
        .bind(token_hash)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Revokes every session belonging to a user
    ///
    /// Used when an account is deleted or a password changes, so stale
    /// tokens stop authenticating immediately.
    ///
    /// # Returns
    ///
    /// Number of sessions revoked
    pub async fn revoke_all_for_user(pool: &PgPool, user_id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE sessions
            SET revoked = TRUE, revoked_at = NOW()
            WHERE user_id = $1 AND revoked = FALSE
            "#,
        )
        .bind(user_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Deletes sessions that expired before the given cutoff
    ///
    /// Housekeeping helper; expired rows stop authenticating on their own,
    /// this just keeps the table from growing forever.
    pub async fn purge_expired(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at < NOW()")
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_token() {
        let token = Session::generate_token();
        assert!(token.starts_with("cb_"));
        assert_eq!(token.len(), 35);
    }

    #[test]
    fn test_generate_token_unique() {
        let a = Session::generate_token();
        let b = Session::generate_token();
        assert_ne!(a, b);
    }

    #[test]
    fn test_hash_token() {
        let hash = Session::hash_token("cb_abc123");
        assert_eq!(hash.len(), 64);

        // Deterministic
        assert_eq!(hash, Session::hash_token("cb_abc123"));

        // Different tokens, different hashes
        assert_ne!(hash, Session::hash_token("cb_abc124"));
    }

    #[test]
    fn test_extract_prefix() {
        assert_eq!(Session::extract_prefix("cb_abc123xyz"), "cb_abc123x");
        assert_eq!(Session::extract_prefix("cb_a"), "cb_a");
    }

    #[test]
    fn test_is_expired() {
        let mut session = Session {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            token_prefix: "cb_abc123x".to_string(),
            token_hash: Session::hash_token("cb_abc123xyz"),
            created_at: Utc::now(),
            last_seen_at: None,
            revoked: false,
            revoked_at: None,
            expires_at: Utc::now() + Duration::hours(1),
        };

        assert!(!session.is_expired());
        assert!(session.is_live());

        session.expires_at = Utc::now() - Duration::hours(1);
        assert!(session.is_expired());
        assert!(!session.is_live());
    }

    #[test]
    fn test_revoked_session_is_not_live() {
        let session = Session {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            token_prefix: "cb_abc123x".to_string(),
            token_hash: Session::hash_token("cb_abc123xyz"),
            created_at: Utc::now(),
            last_seen_at: None,
            revoked: true,
            revoked_at: Some(Utc::now()),
            expires_at: Utc::now() + Duration::hours(1),
        };

        assert!(!session.is_live());
    }

    // Integration tests for database operations are in callboard-api/tests
}
