//! Database migration command.
//!
//! Migrations live in `crates/server/migrations/` and are embedded at
//! compile time; the server never runs them implicitly on startup.

use sqlx::PgPool;

use super::{CommandError, database_url};

/// Run all pending database migrations.
pub async fn run() -> Result<(), CommandError> {
    let database_url = database_url()?;

    tracing::info!("Connecting to database...");
    let pool = PgPool::connect(&database_url).await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../server/migrations").run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
