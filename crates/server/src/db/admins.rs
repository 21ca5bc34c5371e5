//! Admin account repository.

use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use voltstore_core::{AdminId, Email};

use super::RepositoryError;

/// An admin account row.
#[derive(Debug, Clone)]
pub struct Admin {
    pub id: AdminId,
    pub email: Email,
    pub password_hash: String,
}

/// Repository for admin database operations.
pub struct AdminRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AdminRepository<'a> {
    /// Create a new admin repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get an admin by email address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored email is invalid.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<Admin>, RepositoryError> {
        let row = sqlx::query("SELECT id, email, password_hash FROM admin WHERE email = $1")
            .bind(email.as_str())
            .fetch_optional(self.pool)
            .await?;

        row.as_ref().map(admin_from_row).transpose()
    }

    /// Get an admin by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored email is invalid.
    pub async fn get_by_id(&self, id: AdminId) -> Result<Option<Admin>, RepositoryError> {
        let row = sqlx::query("SELECT id, email, password_hash FROM admin WHERE id = $1")
            .bind(id.as_i32())
            .fetch_optional(self.pool)
            .await?;

        row.as_ref().map(admin_from_row).transpose()
    }

    /// Create a new admin account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        email: &Email,
        password_hash: &str,
    ) -> Result<Admin, RepositoryError> {
        let row = sqlx::query(
            "INSERT INTO admin (email, password_hash) VALUES ($1, $2) \
             RETURNING id, email, password_hash",
        )
        .bind(email.as_str())
        .bind(password_hash)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("email already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        admin_from_row(&row)
    }
}

/// Map a database row onto the admin type.
fn admin_from_row(row: &PgRow) -> Result<Admin, RepositoryError> {
    let email_raw: String = row.try_get("email")?;
    let email = Email::parse(&email_raw)
        .map_err(|e| RepositoryError::DataCorruption(format!("invalid email in database: {e}")))?;

    Ok(Admin {
        id: AdminId::new(row.try_get::<i32, _>("id")?),
        email,
        password_hash: row.try_get("password_hash")?,
    })
}
