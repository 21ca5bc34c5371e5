//! HTTP client for the store's JSON API.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use url::Url;

use voltstore_core::{NewOrder, NewProduct, Order, OrderId, OrderStatus, Product, ProductId};

use crate::cart::StoreProduct;

/// Client-side API errors.
///
/// Transport failures (connection refused, DNS, timeouts) are distinguished
/// from non-success statuses, whose textual body is surfaced as the message.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{status}: {message}")]
    Status { status: StatusCode, message: String },
    #[error("invalid API base URL: {0}")]
    BadUrl(#[from] url::ParseError),
}

/// Submits orders; the seam that keeps the checkout flow testable without a
/// network.
pub trait OrderGateway {
    /// POST a checkout submission.
    fn submit_order(
        &self,
        order: &NewOrder,
    ) -> impl Future<Output = Result<Order, ApiError>> + Send;
}

/// HTTP client for the store API.
#[derive(Debug, Clone)]
pub struct StoreApi {
    http: reqwest::Client,
    base_url: Url,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    token: String,
}

#[derive(Serialize)]
struct SetStatusRequest {
    status: OrderStatus,
}

#[derive(Serialize)]
struct UploadImagesRequest<'a> {
    images: &'a [String],
}

#[derive(Deserialize)]
struct UploadImagesResponse {
    urls: Vec<String>,
}

#[derive(Deserialize)]
struct UsersCountResponse {
    #[serde(rename = "totalUsers")]
    total_users: i64,
}

impl StoreApi {
    /// Create a client against the given base URL.
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    /// The configured base URL.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.base_url.join(path)?)
    }

    // =========================================================================
    // Storefront
    // =========================================================================

    /// Fetch the product list, newest first.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or a non-success status.
    pub async fn list_products(&self) -> Result<Vec<StoreProduct>, ApiError> {
        let response = self.http.get(self.url("admin/products")?).send().await?;
        Ok(check(response).await?.json().await?)
    }

    /// Fetch orders, optionally filtered by customer email.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or a non-success status.
    pub async fn list_orders(&self, email: Option<&str>) -> Result<Vec<Order>, ApiError> {
        let mut url = self.url("orders")?;
        if let Some(email) = email {
            url.query_pairs_mut().append_pair("email", email);
        }
        let response = self.http.get(url).send().await?;
        Ok(check(response).await?.json().await?)
    }

    /// Fire the visitor tracking ping.
    ///
    /// Best effort by design: the result is discarded and a failure never
    /// reaches the caller.
    pub async fn track(&self) {
        let Ok(url) = self.url("track") else { return };
        if let Err(e) = self.http.get(url).send().await {
            tracing::debug!(error = %e, "tracking ping failed");
        }
    }

    // =========================================================================
    // Admin
    // =========================================================================

    /// Exchange email + password for a bearer token.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Status` with 401 on bad credentials.
    pub async fn login(&self, email: &str, password: &str) -> Result<String, ApiError> {
        let response = self
            .http
            .post(self.url("admin/auth/login")?)
            .json(&LoginRequest { email, password })
            .send()
            .await?;
        let body: LoginResponse = check(response).await?.json().await?;
        Ok(body.token)
    }

    /// Validate a bearer token; `Ok` means the admin session is live.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Status` with 401 when the token is rejected; the
    /// caller should treat the session as logged out.
    pub async fn me(&self, token: &str) -> Result<(), ApiError> {
        let response = self
            .http
            .get(self.url("admin/auth/me")?)
            .bearer_auth(token)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    /// Read the visitor counter.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or a non-success status.
    pub async fn users_count(&self) -> Result<i64, ApiError> {
        let response = self.http.get(self.url("admin/users-count")?).send().await?;
        let body: UsersCountResponse = check(response).await?.json().await?;
        Ok(body.total_users)
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or a non-success status.
    pub async fn add_product(
        &self,
        token: &str,
        product: &NewProduct,
    ) -> Result<Product, ApiError> {
        let response = self
            .http
            .post(self.url("admin/add-product")?)
            .bearer_auth(token)
            .json(product)
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    /// Replace a product.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or a non-success status.
    pub async fn update_product(
        &self,
        token: &str,
        id: ProductId,
        product: &NewProduct,
    ) -> Result<Product, ApiError> {
        let response = self
            .http
            .put(self.url(&format!("admin/product/{id}"))?)
            .bearer_auth(token)
            .json(product)
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or a non-success status.
    pub async fn delete_product(&self, token: &str, id: ProductId) -> Result<(), ApiError> {
        let response = self
            .http
            .delete(self.url(&format!("admin/product/{id}"))?)
            .bearer_auth(token)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    /// Upload 1-5 images, receiving their hosted URLs.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or a non-success status.
    pub async fn upload_images(
        &self,
        token: &str,
        images: &[String],
    ) -> Result<Vec<String>, ApiError> {
        let response = self
            .http
            .post(self.url("admin/upload-images")?)
            .bearer_auth(token)
            .json(&UploadImagesRequest { images })
            .send()
            .await?;
        let body: UploadImagesResponse = check(response).await?.json().await?;
        Ok(body.urls)
    }

    /// Set an order's status.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or a non-success status.
    pub async fn set_order_status(
        &self,
        token: &str,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, ApiError> {
        let response = self
            .http
            .patch(self.url(&format!("admin/order/{id}/status"))?)
            .bearer_auth(token)
            .json(&SetStatusRequest { status })
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    /// Shortcut: mark an order delivered.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or a non-success status.
    pub async fn approve_order(&self, token: &str, id: OrderId) -> Result<Order, ApiError> {
        let response = self
            .http
            .patch(self.url(&format!("admin/order/{id}/approve"))?)
            .bearer_auth(token)
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    /// Delete an order. The server refuses unless its status is `delivered`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Status` with 400 when the precondition fails.
    pub async fn delete_order(&self, token: &str, id: OrderId) -> Result<(), ApiError> {
        let response = self
            .http
            .delete(self.url(&format!("admin/order/{id}"))?)
            .bearer_auth(token)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }
}

impl OrderGateway for StoreApi {
    async fn submit_order(&self, order: &NewOrder) -> Result<Order, ApiError> {
        let response = self
            .http
            .post(self.url("orders")?)
            .json(order)
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }
}

/// Convert a non-success response into `ApiError::Status` carrying the body.
async fn check(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response.text().await.unwrap_or_default();
    Err(ApiError::Status { status, message })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_url_join_keeps_base_path() {
        let api = StoreApi::new(Url::parse("http://localhost:3000/api/").unwrap());
        assert_eq!(
            api.url("orders").unwrap().as_str(),
            "http://localhost:3000/api/orders"
        );
        assert_eq!(
            api.url("admin/order/7/status").unwrap().as_str(),
            "http://localhost:3000/api/admin/order/7/status"
        );
    }

    #[test]
    fn test_list_orders_email_filter_is_encoded() {
        let api = StoreApi::new(Url::parse("http://localhost:3000/").unwrap());
        let mut url = api.url("orders").unwrap();
        url.query_pairs_mut().append_pair("email", "a+b@example.com");
        assert!(url.as_str().contains("email=a%2Bb%40example.com"));
    }
}
