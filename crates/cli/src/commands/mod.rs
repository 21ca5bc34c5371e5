//! CLI command implementations.

pub mod admin;
pub mod migrate;

use thiserror::Error;

/// Errors shared by CLI commands.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Auth error: {0}")]
    Auth(#[from] voltstore_server::services::auth::AuthError),
}

/// Load the database URL from `VOLTSTORE_DATABASE_URL` (or `DATABASE_URL`).
pub fn database_url() -> Result<String, CommandError> {
    dotenvy::dotenv().ok();

    std::env::var("VOLTSTORE_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| CommandError::MissingEnvVar("VOLTSTORE_DATABASE_URL"))
}
