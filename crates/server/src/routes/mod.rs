//! Route handlers.

pub mod auth;
pub mod events;
pub mod orders;
pub mod products;
pub mod track;

use axum::Router;

use crate::state::AppState;

/// Assemble all application routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(products::routes())
        .merge(orders::routes())
        .merge(auth::routes())
        .merge(track::routes())
        .merge(events::routes())
}
