//! Admin authentication extractor.
//!
//! Privileged routes take [`AdminAuth`] as an argument; requests without a
//! valid bearer token are rejected uniformly with 401 before the handler
//! body runs.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use voltstore_core::AdminId;

use crate::db::AdminRepository;
use crate::error::AppError;
use crate::state::AppState;

/// Extractor that requires a valid admin bearer token.
///
/// Verifies the token's signature and expiry, then confirms the admin row
/// still exists (a deleted admin's outstanding tokens stop working).
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     AdminAuth(admin_id): AdminAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, admin {admin_id}!")
/// }
/// ```
pub struct AdminAuth(pub AdminId);

impl FromRequestParts<AppState> for AdminAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(AppError::Unauthorized)?;

        let admin_id = state
            .tokens()
            .verify(token)
            .map_err(|_| AppError::Unauthorized)?;

        let admin = AdminRepository::new(state.pool())
            .get_by_id(admin_id)
            .await?;

        if admin.is_none() {
            return Err(AppError::Unauthorized);
        }

        Ok(Self(admin_id))
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header.
fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}
