//! Product route handlers.
//!
//! Reads are public; every mutation requires an admin bearer token and
//! broadcasts `products_changed` after the commit so open clients refetch.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use voltstore_core::{ChangeEvent, NewProduct, Product, ProductId};

use crate::db::ProductRepository;
use crate::error::{AppError, Result};
use crate::middleware::AdminAuth;
use crate::services::images::ImageError;
use crate::state::AppState;

/// Product routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin/products", get(list))
        .route("/admin/add-product", post(create))
        .route("/admin/product/{id}", put(update).delete(remove))
        .route("/admin/upload-images", post(upload_images))
}

/// Generic `{"ok":true}` acknowledgement.
#[derive(Serialize)]
struct Ack {
    ok: bool,
}

const ACK: Ack = Ack { ok: true };

/// List products, newest first.
#[instrument(skip(state))]
async fn list(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    let products = ProductRepository::new(state.pool()).list().await?;
    Ok(Json(products))
}

/// Create a product.
#[instrument(skip(state, new), fields(name = %new.name))]
async fn create(
    State(state): State<AppState>,
    AdminAuth(_admin): AdminAuth,
    Json(new): Json<NewProduct>,
) -> Result<(StatusCode, Json<Product>)> {
    validate_product(&new)?;

    let product = ProductRepository::new(state.pool()).create(&new).await?;
    state.notify(ChangeEvent::ProductsChanged);

    Ok((StatusCode::CREATED, Json(product)))
}

/// Replace a product. Last write wins.
#[instrument(skip(state, new))]
async fn update(
    State(state): State<AppState>,
    AdminAuth(_admin): AdminAuth,
    Path(id): Path<i32>,
    Json(new): Json<NewProduct>,
) -> Result<Json<Product>> {
    validate_product(&new)?;

    let product = ProductRepository::new(state.pool())
        .update(ProductId::new(id), &new)
        .await?
        .ok_or(AppError::NotFound)?;
    state.notify(ChangeEvent::ProductsChanged);

    Ok(Json(product))
}

/// Delete a product. Orders keep their snapshots.
#[instrument(skip(state))]
async fn remove(
    State(state): State<AppState>,
    AdminAuth(_admin): AdminAuth,
    Path(id): Path<i32>,
) -> Result<Json<Ack>> {
    let deleted = ProductRepository::new(state.pool())
        .delete(ProductId::new(id))
        .await?;
    if !deleted {
        return Err(AppError::NotFound);
    }
    state.notify(ChangeEvent::ProductsChanged);

    Ok(Json(ACK))
}

#[derive(Debug, Deserialize)]
struct UploadImagesRequest {
    images: Vec<String>,
}

#[derive(Serialize)]
struct UploadImagesResponse {
    urls: Vec<String>,
}

/// Upload 1-5 images to the asset host, echoing input when unconfigured.
#[instrument(skip(state, body), fields(count = body.images.len()))]
async fn upload_images(
    State(state): State<AppState>,
    AdminAuth(_admin): AdminAuth,
    Json(body): Json<UploadImagesRequest>,
) -> Result<Json<UploadImagesResponse>> {
    let urls = state
        .images()
        .upload(body.images)
        .await
        .map_err(|e: ImageError| AppError::Precondition(e.to_string()))?;

    Ok(Json(UploadImagesResponse { urls }))
}

/// Reject obviously broken product payloads before any write.
fn validate_product(new: &NewProduct) -> Result<()> {
    if new.name.trim().is_empty() {
        return Err(AppError::Validation("product name is required".to_owned()));
    }
    if new.description.trim().is_empty() {
        return Err(AppError::Validation(
            "product description is required".to_owned(),
        ));
    }
    if new.price.is_sign_negative() {
        return Err(AppError::Validation(
            "product price cannot be negative".to_owned(),
        ));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn product(name: &str) -> NewProduct {
        serde_json::from_value(serde_json::json!({
            "name": name,
            "price": 999,
            "description": "desc"
        }))
        .unwrap()
    }

    #[test]
    fn test_validate_product_accepts_normal_payload() {
        assert!(validate_product(&product("Nova X1")).is_ok());
    }

    #[test]
    fn test_validate_product_rejects_blank_name() {
        assert!(validate_product(&product("   ")).is_err());
    }

    #[test]
    fn test_validate_product_rejects_negative_price() {
        let mut p = product("Nova X1");
        p.price = Decimal::from(-1);
        assert!(validate_product(&p).is_err());
    }
}
