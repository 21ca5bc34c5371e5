//! Admin account management commands.

use secrecy::SecretString;
use sqlx::PgPool;

use voltstore_server::config::AdminSeed;
use voltstore_server::services::auth::seed_admin;

use super::{CommandError, database_url};

/// Create an admin account; an existing account with the same email is
/// left untouched.
pub async fn create(email: &str, password: &str) -> Result<(), CommandError> {
    let database_url = database_url()?;

    tracing::info!("Connecting to database...");
    let pool = PgPool::connect(&database_url).await?;

    let seed = AdminSeed {
        email: email.to_owned(),
        password: SecretString::from(password.to_owned()),
    };
    seed_admin(&pool, &seed).await?;

    tracing::info!(email, "admin account ensured");
    Ok(())
}
