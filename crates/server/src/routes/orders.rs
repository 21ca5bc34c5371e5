//! Order route handlers.
//!
//! Checkout submissions are public; status changes and deletion require an
//! admin bearer token. Every mutation broadcasts `orders_changed` after the
//! commit.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, patch, post},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use voltstore_core::{ChangeEvent, Email, NewOrder, Order, OrderId, OrderStatus, items_total};

use crate::db::OrderRepository;
use crate::error::{AppError, Result};
use crate::middleware::AdminAuth;
use crate::state::AppState;

/// Order routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/orders", post(create).get(list))
        .route("/admin/order/{id}/status", patch(set_status))
        .route("/admin/order/{id}/approve", patch(approve))
        .route("/admin/order/{id}", delete(remove))
}

#[derive(Serialize)]
struct Ack {
    ok: bool,
}

/// Create an order from a checkout submission.
///
/// The stored status is always `pending`. The claimed total is recomputed
/// from the submitted line items and a mismatch is rejected before any
/// write.
#[instrument(skip(state, new), fields(items = new.items.len()))]
async fn create(
    State(state): State<AppState>,
    Json(new): Json<NewOrder>,
) -> Result<(StatusCode, Json<Order>)> {
    validate_order(&new)?;

    let order = OrderRepository::new(state.pool()).create(&new).await?;
    state.notify(ChangeEvent::OrdersChanged);

    Ok((StatusCode::CREATED, Json(order)))
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    email: Option<String>,
}

/// List orders, newest first, optionally filtered by customer email.
#[instrument(skip(state))]
async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Order>>> {
    // An empty email parameter means no filter.
    let email = query.email.as_deref().filter(|e| !e.is_empty());
    let orders = OrderRepository::new(state.pool()).list(email).await?;
    Ok(Json(orders))
}

#[derive(Debug, Deserialize)]
struct SetStatusRequest {
    status: String,
}

/// Set an order's status to one of pending/on_the_way/delivered.
#[instrument(skip(state, body))]
async fn set_status(
    State(state): State<AppState>,
    AdminAuth(_admin): AdminAuth,
    Path(id): Path<i32>,
    Json(body): Json<SetStatusRequest>,
) -> Result<Json<Order>> {
    let status: OrderStatus = body
        .status
        .parse()
        .map_err(|_| AppError::Validation("invalid status".to_owned()))?;

    update_status(&state, OrderId::new(id), status).await
}

/// Shortcut: mark an order delivered.
#[instrument(skip(state))]
async fn approve(
    State(state): State<AppState>,
    AdminAuth(_admin): AdminAuth,
    Path(id): Path<i32>,
) -> Result<Json<Order>> {
    update_status(&state, OrderId::new(id), OrderStatus::Delivered).await
}

/// Delete an order. Fails unless its current status is `delivered`, so an
/// in-flight order can never be lost by a stray click.
#[instrument(skip(state))]
async fn remove(
    State(state): State<AppState>,
    AdminAuth(_admin): AdminAuth,
    Path(id): Path<i32>,
) -> Result<Json<Ack>> {
    let id = OrderId::new(id);
    let repository = OrderRepository::new(state.pool());

    let order = repository.get(id).await?.ok_or(AppError::NotFound)?;
    if !order.status.deletable() {
        return Err(AppError::Precondition(
            "only delivered orders can be deleted".to_owned(),
        ));
    }

    if !repository.delete(id).await? {
        return Err(AppError::NotFound);
    }
    state.notify(ChangeEvent::OrdersChanged);

    Ok(Json(Ack { ok: true }))
}

async fn update_status(
    state: &AppState,
    id: OrderId,
    status: OrderStatus,
) -> Result<Json<Order>> {
    let order = OrderRepository::new(state.pool())
        .set_status(id, status)
        .await?
        .ok_or(AppError::NotFound)?;
    state.notify(ChangeEvent::OrdersChanged);

    Ok(Json(order))
}

/// Reject broken checkout payloads before any write.
fn validate_order(new: &NewOrder) -> Result<()> {
    if new.items.is_empty() {
        return Err(AppError::Validation(
            "order must contain at least one item".to_owned(),
        ));
    }
    if new.items.iter().any(|item| item.quantity == 0) {
        return Err(AppError::Validation(
            "line item quantity must be at least 1".to_owned(),
        ));
    }
    Email::parse(&new.customer.email)
        .map_err(|e| AppError::Validation(format!("customer email: {e}")))?;

    let computed = items_total(&new.items);
    if computed != new.total {
        return Err(AppError::Validation(format!(
            "total {} does not match line items (expected {computed})",
            new.total
        )));
    }
    Ok(())
}
