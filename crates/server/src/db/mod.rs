//! Database operations for the store's `PostgreSQL` instance.
//!
//! ## Tables
//!
//! - `product` - Catalog products, admin-managed
//! - `store_order` - Orders with value snapshots of their line items
//! - `admin` - Admin accounts (email + argon2 hash)
//! - `counter` - Named counters (currently only `visitors`)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p voltstore-cli -- migrate
//! ```
//!
//! Queries use the runtime `sqlx` API (not the compile-time `query!` macros)
//! so the workspace builds without a reachable database.

pub mod admins;
pub mod counter;
pub mod orders;
pub mod products;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use admins::AdminRepository;
pub use counter::CounterRepository;
pub use orders::OrderRepository;
pub use products::ProductRepository;

/// Errors from repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool.
///
/// The pool connects lazily: a database that is down at startup is logged by
/// the caller but never prevents the process from serving; individual
/// requests fail instead.
///
/// # Errors
///
/// Returns `sqlx::Error` only if the connection URL cannot be parsed.
pub fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect_lazy(database_url.expose_secret())
}
