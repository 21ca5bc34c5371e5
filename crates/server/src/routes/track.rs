//! Visitor tracking route handlers.

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;
use tracing::instrument;

use voltstore_core::ChangeEvent;

use crate::db::CounterRepository;
use crate::db::counter::VISITORS_KEY;
use crate::error::Result;
use crate::state::AppState;

/// Tracking routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/track", get(track))
        .route("/admin/users-count", get(users_count))
}

#[derive(Serialize)]
struct TrackResponse {
    ok: bool,
    #[serde(rename = "totalUsers")]
    total_users: i64,
}

#[derive(Serialize)]
struct UsersCountResponse {
    #[serde(rename = "totalUsers")]
    total_users: i64,
}

/// Increment the visitor counter and return the new tally.
///
/// Callers fire this without awaiting the outcome; the broadcast that
/// follows is equally best-effort.
#[instrument(skip(state))]
async fn track(State(state): State<AppState>) -> Result<Json<TrackResponse>> {
    let total_users = CounterRepository::new(state.pool())
        .increment(VISITORS_KEY)
        .await?;
    state.notify(ChangeEvent::UsersCount { total_users });

    Ok(Json(TrackResponse {
        ok: true,
        total_users,
    }))
}

/// Read the visitor counter. Degrades to zero when the store is unreachable.
#[instrument(skip(state))]
async fn users_count(State(state): State<AppState>) -> Json<UsersCountResponse> {
    let total_users = match CounterRepository::new(state.pool()).get(VISITORS_KEY).await {
        Ok(count) => count,
        Err(e) => {
            tracing::warn!(error = %e, "visitor count read failed");
            0
        }
    };

    Json(UsersCountResponse { total_users })
}
