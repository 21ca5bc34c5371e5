//! Admin authentication route handlers.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::Result;
use crate::middleware::AdminAuth;
use crate::services::auth::AuthService;
use crate::state::AppState;

/// Auth routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin/auth/login", post(login))
        .route("/admin/auth/me", get(me))
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Serialize)]
struct LoginResponse {
    token: String,
}

/// Exchange email + password for a bearer token.
#[instrument(skip(state, body), fields(email = %body.email))]
async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let token = AuthService::new(state.pool(), state.tokens())
        .login(
            &body.email,
            &body.password,
            state.config().admin_seed.as_ref(),
        )
        .await?;

    Ok(Json(LoginResponse { token }))
}

#[derive(Serialize)]
struct MeResponse {
    ok: bool,
    id: i32,
}

/// Validate the presented bearer token.
#[instrument(skip_all)]
async fn me(AdminAuth(admin_id): AdminAuth) -> Json<MeResponse> {
    Json(MeResponse {
        ok: true,
        id: admin_id.as_i32(),
    })
}
