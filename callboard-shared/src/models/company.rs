/// Company model and database operations
///
/// Companies are the production houses and venues users affiliate with.
/// A company may carry credentials for the red61 booking system; those are
/// sensitive fields and only their Argon2id digests are ever persisted.
/// Callers hash with `auth::password::hash_secret` before constructing the
/// write payload - a patch that omits a credential leaves the stored
/// digest untouched.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE companies (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     red61_username_hash VARCHAR(255),
///     red61_password_hash VARCHAR(255),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use callboard_shared::models::company::{Company, CreateCompany};
/// use callboard_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let company = Company::create(&pool, CreateCompany {
///     name: "Fringe Productions".to_string(),
///     red61_username_hash: Some("$argon2id$...".to_string()),
///     red61_password_hash: Some("$argon2id$...".to_string()),
/// }).await?;
///
/// assert!(company.has_red61_credentials());
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Company model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Company {
    /// Unique company ID (UUID v4)
    pub id: Uuid,

    /// Company name
    pub name: String,

    /// Argon2id digest of the red61 account username (None if not linked)
    pub red61_username_hash: Option<String>,

    /// Argon2id digest of the red61 account password (None if not linked)
    pub red61_password_hash: Option<String>,

    /// When the company was created
    pub created_at: DateTime<Utc>,

    /// When the company was last updated
    pub updated_at: DateTime<Utc>,
}

impl Company {
    /// Whether the company has red61 booking credentials on file
    pub fn has_red61_credentials(&self) -> bool {
        self.red61_username_hash.is_some() && self.red61_password_hash.is_some()
    }
}

/// Input for creating a new company
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCompany {
    /// Company name
    pub name: String,

    /// Digest of the red61 username (hash the plaintext first!)
    pub red61_username_hash: Option<String>,

    /// Digest of the red61 password (hash the plaintext first!)
    pub red61_password_hash: Option<String>,
}

/// Input for updating an existing company
///
/// All fields are optional. Only non-None fields will be updated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCompany {
    /// New name
    pub name: Option<String>,

    /// New red61 username digest
    pub red61_username_hash: Option<String>,

    /// New red61 password digest
    pub red61_password_hash: Option<String>,
}

impl Company {
    /// Creates a new company in the database
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn create(pool: &PgPool, data: CreateCompany) -> Result<Self, sqlx::Error> {
        let company = sqlx::query_as::<_, Company>(
            r#"
            INSERT INTO companies (name, red61_username_hash, red61_password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, name, red61_username_hash, red61_password_hash,
                      created_at, updated_at
            "#,
        )
        .bind(data.name)
        .bind(data.red61_username_hash)
        .bind(data.red61_password_hash)
        .fetch_one(pool)
        .await?;

        Ok(company)
    }

    /// Finds a company by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let company = sqlx::query_as::<_, Company>(
            r#"
            SELECT id, name, red61_username_hash, red61_password_hash,
                   created_at, updated_at
            FROM companies
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(company)
    }

    /// Updates an existing company
    ///
    /// Only non-None fields in `data` will be updated; a patch without
    /// credential digests cannot disturb the stored ones.
    ///
    /// # Returns
    ///
    /// The updated company if found, None if the company doesn't exist
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateCompany,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE companies SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", name = ${}", bind_count));
        }
        if data.red61_username_hash.is_some() {
            bind_count += 1;
            query.push_str(&format!(", red61_username_hash = ${}", bind_count));
        }
        if data.red61_password_hash.is_some() {
            bind_count += 1;
            query.push_str(&format!(", red61_password_hash = ${}", bind_count));
        }

        query.push_str(
            " WHERE id = $1 RETURNING id, name, red61_username_hash, red61_password_hash, created_at, updated_at",
        );

        let mut q = sqlx::query_as::<_, Company>(&query).bind(id);

        if let Some(name) = data.name {
            q = q.bind(name);
        }
        if let Some(username_hash) = data.red61_username_hash {
            q = q.bind(username_hash);
        }
        if let Some(password_hash) = data.red61_password_hash {
            q = q.bind(password_hash);
        }

        let company = q.fetch_optional(pool).await?;

        Ok(company)
    }

    /// Deletes a company by ID
    ///
    /// Affiliation rows pointing at the company are removed by the
    /// ON DELETE CASCADE constraint.
    ///
    /// # Returns
    ///
    /// True if the company was deleted, false if it didn't exist
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM companies WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists all companies with pagination
    ///
    /// Ordered by creation date (newest first).
    pub async fn list(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<Self>, sqlx::Error> {
        let companies = sqlx::query_as::<_, Company>(
            r#"
            SELECT id, name, red61_username_hash, red61_password_hash,
                   created_at, updated_at
            FROM companies
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        Ok(companies)
    }

    /// Counts total number of companies
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM companies")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_red61_credentials() {
        let mut company = Company {
            id: Uuid::new_v4(),
            name: "Fringe Productions".to_string(),
            red61_username_hash: Some("$argon2id$u".to_string()),
            red61_password_hash: Some("$argon2id$p".to_string()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        assert!(company.has_red61_credentials());

        // Half-linked does not count
        company.red61_password_hash = None;
        assert!(!company.has_red61_credentials());

        company.red61_username_hash = None;
        assert!(!company.has_red61_credentials());
    }

    #[test]
    fn test_update_company_default() {
        let update = UpdateCompany::default();
        assert!(update.name.is_none());
        assert!(update.red61_username_hash.is_none());
        assert!(update.red61_password_hash.is_none());
    }

    // Integration tests for database operations are in callboard-api/tests
}
