//! Unified error handling at the HTTP boundary.
//!
//! Provides a unified `AppError` type; all route handlers return
//! `Result<T, AppError>`. Internal failures are logged and answered with a
//! generic body so database details never reach a client.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;

/// Application-level error type for the server.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Resource not found.
    #[error("not found")]
    NotFound,

    /// Request lacked a valid admin bearer token.
    #[error("unauthorized")]
    Unauthorized,

    /// Request payload failed validation; nothing was mutated.
    #[error("{0}")]
    Validation(String),

    /// A precondition on the current state failed; nothing was mutated.
    #[error("{0}")]
    Precondition(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Database(RepositoryError::NotFound) | Self::NotFound => StatusCode::NOT_FOUND,
            Self::Database(RepositoryError::Conflict(_)) => StatusCode::CONFLICT,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Auth(err) => err.status_code(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Validation(_) | Self::Precondition(_) => StatusCode::BAD_REQUEST,
        };

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "request error");
        }

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Database(RepositoryError::NotFound) | Self::NotFound => "not found".to_owned(),
            Self::Database(RepositoryError::Conflict(msg)) => msg.clone(),
            Self::Database(_) => "internal server error".to_owned(),
            Self::Auth(err) => err.public_message().to_owned(),
            Self::Unauthorized => "unauthorized".to_owned(),
            Self::Validation(msg) | Self::Precondition(msg) => msg.clone(),
        };

        (status, message).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
