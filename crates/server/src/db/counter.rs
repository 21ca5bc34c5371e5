//! Named counter repository.
//!
//! The visitor tally is a single row; increments go through an atomic
//! upsert so concurrent page loads never lose updates.

use sqlx::{PgPool, Row};

use super::RepositoryError;

/// Key of the visitor counter row.
pub const VISITORS_KEY: &str = "visitors";

/// Repository for counter database operations.
pub struct CounterRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CounterRepository<'a> {
    /// Create a new counter repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Ensure a counter row exists without touching its value.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the upsert fails.
    pub async fn ensure(&self, key: &str) -> Result<(), RepositoryError> {
        sqlx::query("INSERT INTO counter (key, count) VALUES ($1, 0) ON CONFLICT (key) DO NOTHING")
            .bind(key)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    /// Atomically increment a counter and return the new value.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the upsert fails.
    pub async fn increment(&self, key: &str) -> Result<i64, RepositoryError> {
        let row = sqlx::query(
            "INSERT INTO counter (key, count) VALUES ($1, 1) \
             ON CONFLICT (key) DO UPDATE SET count = counter.count + 1 \
             RETURNING count",
        )
        .bind(key)
        .fetch_one(self.pool)
        .await?;

        Ok(row.try_get::<i64, _>("count")?)
    }

    /// Read a counter's current value; missing counters read as zero.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, key: &str) -> Result<i64, RepositoryError> {
        let row = sqlx::query("SELECT count FROM counter WHERE key = $1")
            .bind(key)
            .fetch_optional(self.pool)
            .await?;

        match row {
            Some(row) => Ok(row.try_get::<i64, _>("count")?),
            None => Ok(0),
        }
    }
}
