/// Affiliation model and database operations
///
/// An affiliation is the many-to-many link between a user and a company:
/// a user may belong to several companies, and a company is referenced by
/// any number of users. The table is a plain join table with a composite
/// primary key; creating the same affiliation twice is a no-op, so the
/// associate endpoint is idempotent.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE affiliations (
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     company_id UUID NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     PRIMARY KEY (user_id, company_id)
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use callboard_shared::models::affiliation::Affiliation;
/// use callboard_shared::db::pool::{create_pool, DatabaseConfig};
/// use uuid::Uuid;
///
/// # async fn example(user_id: Uuid, company_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// Affiliation::create(&pool, user_id, company_id).await?;
///
/// // Idempotent: a second call changes nothing
/// Affiliation::create(&pool, user_id, company_id).await?;
///
/// let companies = Affiliation::list_by_user(&pool, user_id).await?;
/// assert_eq!(companies.len(), 1);
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Affiliation model representing a user-company link
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Affiliation {
    /// User ID
    pub user_id: Uuid,

    /// Company ID
    pub company_id: Uuid,

    /// When the affiliation was created
    pub created_at: DateTime<Utc>,
}

impl Affiliation {
    /// Creates an affiliation (adds a company to a user's set)
    ///
    /// Idempotent: if the pair already exists the insert is skipped and
    /// the existing row is returned.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - User or company doesn't exist (foreign key violation)
    /// - Database connection fails
    pub async fn create(
        pool: &PgPool,
        user_id: Uuid,
        company_id: Uuid,
    ) -> Result<Self, sqlx::Error> {
        // ON CONFLICT DO NOTHING returns no row for duplicates, so fall
        // back to the existing one
        let inserted = sqlx::query_as::<_, Affiliation>(
            r#"
            INSERT INTO affiliations (user_id, company_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, company_id) DO NOTHING
            RETURNING user_id, company_id, created_at
            "#,
        )
        .bind(user_id)
        .bind(company_id)
        .fetch_optional(pool)
        .await?;

        if let Some(affiliation) = inserted {
            return Ok(affiliation);
        }

        let existing = sqlx::query_as::<_, Affiliation>(
            r#"
            SELECT user_id, company_id, created_at
            FROM affiliations
            WHERE user_id = $1 AND company_id = $2
            "#,
        )
        .bind(user_id)
        .bind(company_id)
        .fetch_one(pool)
        .await?;

        Ok(existing)
    }

    /// Checks whether a user is affiliated with a company
    pub async fn exists(
        pool: &PgPool,
        user_id: Uuid,
        company_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM affiliations
                WHERE user_id = $1 AND company_id = $2
            )
            "#,
        )
        .bind(user_id)
        .bind(company_id)
        .fetch_one(pool)
        .await?;

        Ok(exists)
    }

    /// Deletes an affiliation (removes a company from a user's set)
    ///
    /// # Returns
    ///
    /// True if the affiliation was deleted, false if it didn't exist
    pub async fn delete(
        pool: &PgPool,
        user_id: Uuid,
        company_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM affiliations WHERE user_id = $1 AND company_id = $2")
                .bind(user_id)
                .bind(company_id)
                .execute(pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists all affiliations for a user
    ///
    /// Ordered by creation date (oldest first).
    pub async fn list_by_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let affiliations = sqlx::query_as::<_, Affiliation>(
            r#"
            SELECT user_id, company_id, created_at
            FROM affiliations
            WHERE user_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(affiliations)
    }

    /// Lists all affiliations for a company
    pub async fn list_by_company(
        pool: &PgPool,
        company_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let affiliations = sqlx::query_as::<_, Affiliation>(
            r#"
            SELECT user_id, company_id, created_at
            FROM affiliations
            WHERE company_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(company_id)
        .fetch_all(pool)
        .await?;

        Ok(affiliations)
    }

    /// Counts companies affiliated with a user
    pub async fn count_by_user(pool: &PgPool, user_id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM affiliations WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(pool)
                .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_affiliation_struct() {
        let affiliation = Affiliation {
            user_id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            created_at: Utc::now(),
        };

        assert_ne!(affiliation.user_id, affiliation.company_id);
    }

    // Integration tests for database operations (including idempotency of
    // create) are in callboard-api/tests
}
