//! Admin authentication: argon2 password hashing and bearer tokens.
//!
//! A successful login exchanges email + password for an HS256-signed JWT
//! embedding the admin's id, valid for a configurable number of days
//! (default 7). Every privileged request presents it as
//! `Authorization: Bearer <token>`.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use axum::http::StatusCode;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use voltstore_core::{AdminId, Email, EmailError};

use crate::config::AdminSeed;
use crate::db::admins::{Admin, AdminRepository};
use crate::db::RepositoryError;

/// Authentication errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Email/password pair did not match an account.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Bearer token missing, malformed, expired, or signed with another key.
    #[error("invalid token")]
    InvalidToken,

    /// Token could not be created.
    #[error("token creation failed: {0}")]
    TokenCreation(jsonwebtoken::errors::Error),

    /// Password could not be hashed.
    #[error("password hashing failed: {0}")]
    Hashing(String),

    /// Email address failed validation.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Underlying repository failure.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl AuthError {
    /// HTTP status this error maps to at the request boundary.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidCredentials | Self::InvalidToken => StatusCode::UNAUTHORIZED,
            Self::InvalidEmail(_) => StatusCode::BAD_REQUEST,
            Self::TokenCreation(_) | Self::Hashing(_) | Self::Repository(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message safe to show a client.
    #[must_use]
    pub const fn public_message(&self) -> &'static str {
        match self {
            Self::InvalidCredentials | Self::InvalidToken => "unauthorized",
            Self::InvalidEmail(_) => "invalid email",
            Self::TokenCreation(_) | Self::Hashing(_) | Self::Repository(_) => {
                "internal server error"
            }
        }
    }
}

/// Claims carried by an admin bearer token.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// Admin id.
    sub: String,
    /// Issued at (Unix timestamp).
    iat: i64,
    /// Expiration time (Unix timestamp).
    exp: i64,
}

/// Issues and verifies admin bearer tokens.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_days: i64,
}

impl TokenService {
    /// Create a token service from the shared signing secret.
    #[must_use]
    pub fn new(secret: &SecretString, ttl_days: i64) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
            ttl_days,
        }
    }

    /// Issue a token for the given admin.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenCreation` if encoding fails.
    pub fn issue(&self, admin_id: AdminId) -> Result<String, AuthError> {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: admin_id.to_string(),
            iat: now,
            exp: now + self.ttl_days * 24 * 60 * 60,
        };

        jsonwebtoken::encode(&Header::default(), &claims, &self.encoding)
            .map_err(AuthError::TokenCreation)
    }

    /// Verify a token and return the admin id it was issued for.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` for any signature, shape, or expiry
    /// problem.
    pub fn verify(&self, token: &str) -> Result<AdminId, AuthError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &Validation::default())
            .map_err(|_| AuthError::InvalidToken)?;

        let id: i32 = data
            .claims
            .sub
            .parse()
            .map_err(|_| AuthError::InvalidToken)?;

        Ok(AdminId::new(id))
    }
}

/// Admin authentication service.
pub struct AuthService<'a> {
    admins: AdminRepository<'a>,
    tokens: &'a TokenService,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, tokens: &'a TokenService) -> Self {
        Self {
            admins: AdminRepository::new(pool),
            tokens,
        }
    }

    /// Login with email and password, returning a bearer token.
    ///
    /// When the account is missing but matches the configured seed
    /// credentials, it is created on the fly (mirrors the startup seeding).
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        seed: Option<&AdminSeed>,
    ) -> Result<String, AuthError> {
        let email = Email::parse(email)?;

        let admin = match self.admins.get_by_email(&email).await? {
            Some(admin) => admin,
            None => {
                let Some(seed) = seed.filter(|s| s.email == email.as_str()) else {
                    return Err(AuthError::InvalidCredentials);
                };
                self.create_admin(&email, seed.password.expose_secret())
                    .await?
            }
        };

        verify_password(password, &admin.password_hash)?;

        tracing::debug!(email = %admin.email, "admin logged in");
        self.tokens.issue(admin.id)
    }

    async fn create_admin(&self, email: &Email, password: &str) -> Result<Admin, AuthError> {
        let password_hash = hash_password(password)?;
        Ok(self.admins.create(email, &password_hash).await?)
    }
}

/// Ensure the configured admin account exists. Used at server startup and
/// by the CLI; an existing account is left untouched.
///
/// # Errors
///
/// Returns `AuthError` if hashing or the insert fails for a reason other
/// than the account already existing.
pub async fn seed_admin(pool: &PgPool, seed: &AdminSeed) -> Result<(), AuthError> {
    let email = Email::parse(&seed.email)?;
    let admins = AdminRepository::new(pool);

    if admins.get_by_email(&email).await?.is_some() {
        return Ok(());
    }

    let password_hash = hash_password(seed.password.expose_secret())?;
    match admins.create(&email, &password_hash).await {
        Ok(_) => {
            tracing::info!(email = %email, "seeded admin account");
            Ok(())
        }
        // Concurrent seeding (e.g., two replicas) is fine.
        Err(RepositoryError::Conflict(_)) => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Hashing(e.to_string()))
}

/// Verify a password against a stored hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new(&SecretString::from("t".repeat(32)), 7)
    }

    #[test]
    fn test_token_roundtrip() {
        let tokens = service();
        let token = tokens.issue(AdminId::new(42)).unwrap();
        assert_eq!(tokens.verify(&token).unwrap(), AdminId::new(42));
    }

    #[test]
    fn test_token_rejects_other_key() {
        let token = service().issue(AdminId::new(1)).unwrap();
        let other = TokenService::new(&SecretString::from("u".repeat(32)), 7);
        assert!(matches!(
            other.verify(&token),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_token_rejects_garbage() {
        assert!(matches!(
            service().verify("not-a-token"),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_password_hash_roundtrip() {
        let hash = hash_password("volt@#123").unwrap();
        assert!(verify_password("volt@#123", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("pw").unwrap();
        let b = hash_password("pw").unwrap();
        assert_ne!(a, b);
    }
}
