//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `VOLTSTORE_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `VOLTSTORE_JWT_SECRET` - Bearer token signing secret (min 32 chars)
//!
//! ## Optional
//! - `VOLTSTORE_HOST` - Bind address (default: 127.0.0.1)
//! - `VOLTSTORE_PORT` - Listen port (default: 3000)
//! - `VOLTSTORE_TOKEN_TTL_DAYS` - Bearer token validity (default: 7)
//! - `ADMIN_EMAIL` / `ADMIN_PASSWORD` - Admin account seeded at startup
//! - `ASSET_HOST_URL` / `ASSET_HOST_KEY` - External image host; uploads echo
//!   their input when unset
//! - `VOLTSTORE_CORS_ORIGINS` - Comma-separated allowed origins (permissive
//!   when unset)

use std::net::{IpAddr, SocketAddr};

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_JWT_SECRET_LENGTH: usize = 32;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "your-",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Server application configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Bearer token signing secret
    pub jwt_secret: SecretString,
    /// Bearer token validity in days
    pub token_ttl_days: i64,
    /// Admin account seeded at startup if absent
    pub admin_seed: Option<AdminSeed>,
    /// External asset host for image uploads
    pub asset_host: Option<AssetHostConfig>,
    /// Allowed CORS origins; permissive when empty
    pub cors_origins: Vec<String>,
}

/// Admin credentials seeded at process start.
#[derive(Clone)]
pub struct AdminSeed {
    pub email: String,
    pub password: SecretString,
}

impl std::fmt::Debug for AdminSeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminSeed")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// External asset host configuration.
#[derive(Clone)]
pub struct AssetHostConfig {
    /// Upload endpoint URL
    pub url: String,
    /// API key presented as a bearer token
    pub key: SecretString,
}

impl std::fmt::Debug for AssetHostConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetHostConfig")
            .field("url", &self.url)
            .field("key", &"[REDACTED]")
            .finish()
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid,
    /// or if the JWT secret fails validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("VOLTSTORE_DATABASE_URL")?;
        let host = get_env_or_default("VOLTSTORE_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("VOLTSTORE_HOST".to_owned(), e.to_string()))?;
        let port = get_env_or_default("VOLTSTORE_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("VOLTSTORE_PORT".to_owned(), e.to_string()))?;

        let jwt_secret = get_required_secret("VOLTSTORE_JWT_SECRET")?;
        validate_signing_secret(&jwt_secret, "VOLTSTORE_JWT_SECRET")?;

        let token_ttl_days = get_env_or_default("VOLTSTORE_TOKEN_TTL_DAYS", "7")
            .parse::<i64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("VOLTSTORE_TOKEN_TTL_DAYS".to_owned(), e.to_string())
            })?;

        let admin_seed = match (
            get_optional_env("ADMIN_EMAIL"),
            get_optional_env("ADMIN_PASSWORD"),
        ) {
            (Some(email), Some(password)) => Some(AdminSeed {
                email,
                password: SecretString::from(password),
            }),
            _ => None,
        };

        let asset_host = match (
            get_optional_env("ASSET_HOST_URL"),
            get_optional_env("ASSET_HOST_KEY"),
        ) {
            (Some(url), Some(key)) => Some(AssetHostConfig {
                url,
                key: SecretString::from(key),
            }),
            _ => None,
        };

        let cors_origins = get_optional_env("VOLTSTORE_CORS_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            database_url,
            host,
            port,
            jwt_secret,
            token_ttl_days,
            admin_seed,
            asset_host,
            cors_origins,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_owned()))
}

/// Get a required environment variable as a secret.
fn get_required_secret(key: &str) -> Result<SecretString, ConfigError> {
    Ok(SecretString::from(get_required_env(key)?))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_owned()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

/// Validate that a signing secret is long enough and not a placeholder.
fn validate_signing_secret(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_JWT_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_owned(),
            format!(
                "must be at least {} characters (got {})",
                MIN_JWT_SECRET_LENGTH,
                value.len()
            ),
        ));
    }

    let lower = value.to_lowercase();
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_owned(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    Ok(())
}
