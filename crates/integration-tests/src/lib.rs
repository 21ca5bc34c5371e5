//! Integration tests for Voltstore.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the database and run migrations
//! docker compose up -d postgres
//! cargo run -p voltstore-cli -- migrate
//!
//! # Start the server with seeded admin credentials
//! ADMIN_EMAIL=admin@example.com ADMIN_PASSWORD='integration-test-pass' \
//!     cargo run -p voltstore-server
//!
//! # Run the ignored end-to-end tests
//! cargo test -p voltstore-integration-tests -- --ignored
//! ```
//!
//! Configuration via environment:
//! - `SERVER_BASE_URL` (default `http://localhost:3000`)
//! - `ADMIN_EMAIL` / `ADMIN_PASSWORD` (default the values above)

use serde_json::{Value, json};

/// Shared context for end-to-end tests.
pub struct TestContext {
    pub client: reqwest::Client,
    pub base_url: String,
}

impl TestContext {
    /// Build a context from the environment.
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url(),
        }
    }

    /// Absolute URL for an API path.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Log in with the seeded admin credentials and return the bearer token.
    ///
    /// # Panics
    ///
    /// Panics when the server is unreachable or the credentials are wrong -
    /// these tests only run against a prepared stack.
    pub async fn admin_token(&self) -> String {
        let response = self
            .client
            .post(self.url("/admin/auth/login"))
            .json(&json!({ "email": admin_email(), "password": admin_password() }))
            .send()
            .await
            .expect("login request failed");
        assert!(
            response.status().is_success(),
            "admin login rejected; is the server seeded?"
        );

        let body: Value = response.json().await.expect("login response not JSON");
        body["token"]
            .as_str()
            .expect("login response missing token")
            .to_owned()
    }

    /// Create a product via the admin API, returning its JSON.
    ///
    /// # Panics
    ///
    /// Panics when the request fails.
    pub async fn create_product(&self, token: &str, name: &str, price: i64) -> Value {
        let response = self
            .client
            .post(self.url("/admin/add-product"))
            .bearer_auth(token)
            .json(&json!({
                "name": name,
                "price": price,
                "description": "integration test product",
                "images": ["/assets/test.png"]
            }))
            .send()
            .await
            .expect("add-product request failed");
        assert_eq!(response.status(), 201, "product creation failed");
        response.json().await.expect("product response not JSON")
    }

    /// Submit an order, returning its JSON.
    ///
    /// # Panics
    ///
    /// Panics when the request fails.
    pub async fn create_order(&self, email: &str, items: Value, total: i64) -> Value {
        let response = self
            .client
            .post(self.url("/orders"))
            .json(&json!({
                "items": items,
                "total": total,
                "customer": {
                    "name": "Integration Tester",
                    "email": email,
                    "address": "12 MG Road, Bengaluru, 560001",
                    "phone": "9876543210"
                }
            }))
            .send()
            .await
            .expect("order request failed");
        assert_eq!(response.status(), 201, "order creation failed");
        response.json().await.expect("order response not JSON")
    }

    /// List orders for a customer email.
    ///
    /// # Panics
    ///
    /// Panics when the request fails.
    pub async fn list_orders(&self, email: &str) -> Vec<Value> {
        let response = self
            .client
            .get(self.url("/orders"))
            .query(&[("email", email)])
            .send()
            .await
            .expect("orders request failed");
        assert!(response.status().is_success());
        response.json().await.expect("orders response not JSON")
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Base URL for the running server (configurable via environment).
#[must_use]
pub fn base_url() -> String {
    std::env::var("SERVER_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned())
}

/// Seeded admin email.
#[must_use]
pub fn admin_email() -> String {
    std::env::var("ADMIN_EMAIL").unwrap_or_else(|_| "admin@example.com".to_owned())
}

/// Seeded admin password.
#[must_use]
pub fn admin_password() -> String {
    std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "integration-test-pass".to_owned())
}

/// A unique customer email per test run, so listings don't collide.
#[must_use]
pub fn unique_email(prefix: &str) -> String {
    format!("{prefix}-{}@example.com", uuid::Uuid::new_v4().simple())
}
