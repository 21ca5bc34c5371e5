//! Checkout: form validation and the cart-to-order submission flow.
//!
//! The flow is deliberately failure-shaped: the local history entry is
//! recorded at submission time, but the cart is only cleared after the
//! server accepts the order. A failed submission leaves the cart intact so
//! resubmitting needs nothing but another click.

use rust_decimal::Decimal;
use thiserror::Error;

use voltstore_core::{Customer, Email, NewOrder, Order, OrderItem, OrderStatus};

use crate::api::{ApiError, OrderGateway};
use crate::cart::Cart;
use crate::history::{HistoryCustomer, OrderHistory};
use crate::storage::{self, LocalStore, StorageError};

/// The checkout form as the shopper fills it in.
#[derive(Debug, Clone, Default)]
pub struct CheckoutForm {
    pub name: String,
    pub product_name: String,
    pub email: String,
    pub address: String,
    pub city: String,
    pub zip: String,
    pub phone: String,
    pub product_details: String,
    pub desired_count: u32,
    pub location_link: Option<String>,
}

/// A single field validation failure, for inline display next to the field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

impl CheckoutForm {
    /// Validate every field, collecting all failures so a form can show
    /// them inline at once.
    ///
    /// # Errors
    ///
    /// Returns the full list of failing fields.
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        let mut check = |ok: bool, field: &'static str, message: &'static str| {
            if !ok {
                errors.push(FieldError { field, message });
            }
        };

        check(self.name.trim().len() >= 2, "name", "Full Name is required");
        check(
            self.product_name.trim().len() >= 2,
            "product_name",
            "Product Name is required",
        );
        check(
            Email::parse(self.email.trim()).is_ok(),
            "email",
            "Invalid email",
        );
        check(
            self.address.trim().len() >= 5,
            "address",
            "Address is required",
        );
        check(self.city.trim().len() >= 2, "city", "City is required");
        check(
            self.zip.trim().len() >= 5,
            "zip",
            "Valid ZIP code is required",
        );
        check(
            self.phone.chars().filter(char::is_ascii_digit).count() >= 10,
            "phone",
            "Valid phone number is required",
        );
        check(
            self.product_details.trim().len() >= 5,
            "product_details",
            "Please add product details",
        );
        check(
            self.desired_count >= 1,
            "desired_count",
            "Minimum 1 product",
        );

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    /// The single address line stored on the order.
    #[must_use]
    pub fn full_address(&self) -> String {
        format!("{}, {}, {}", self.address, self.city, self.zip)
    }
}

/// Checkout failures.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// One or more form fields failed validation.
    #[error("checkout form is invalid")]
    Invalid(Vec<FieldError>),

    /// The cart is empty; there is nothing to order.
    #[error("cart is empty")]
    EmptyCart,

    /// The server rejected or never received the order. The cart is intact.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Local persistence failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// The cart-to-order submission flow.
///
/// Owns nothing: every collaborator is borrowed in, so tests can hand it a
/// stub gateway and in-memory stores.
pub struct CheckoutFlow<'a, G, S: LocalStore> {
    api: &'a G,
    cart: &'a mut Cart<S>,
    history: &'a mut OrderHistory<S>,
    prefs: &'a S,
}

impl<'a, G: OrderGateway, S: LocalStore> CheckoutFlow<'a, G, S> {
    /// Assemble the flow from its collaborators.
    pub fn new(
        api: &'a G,
        cart: &'a mut Cart<S>,
        history: &'a mut OrderHistory<S>,
        prefs: &'a S,
    ) -> Self {
        Self {
            api,
            cart,
            history,
            prefs,
        }
    }

    /// Submit the current cart as an order.
    ///
    /// On success the order is persisted server-side with status `pending`,
    /// the submitter's email is remembered for history reconciliation, and
    /// the cart is cleared. On failure the cart is untouched.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::Invalid` / `EmptyCart` before any effect,
    /// `CheckoutError::Api` when the server rejects or is unreachable.
    pub async fn submit(&mut self, form: &CheckoutForm) -> Result<Order, CheckoutError> {
        form.validate().map_err(CheckoutError::Invalid)?;
        if self.cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let items: Vec<OrderItem> = self.cart.items().iter().map(OrderItem::from).collect();
        let total: Decimal = self.cart.total();
        let address = form.full_address();

        // Local history first: it exists to survive server trouble.
        self.history.add(
            total,
            items.clone(),
            HistoryCustomer {
                name: form.name.trim().to_owned(),
                address: address.clone(),
                details: Some(form.product_details.clone()),
                desired_count: Some(form.desired_count),
            },
        )?;
        self.prefs
            .set(storage::keys::LAST_CHECKOUT_EMAIL, form.email.trim())?;

        let order = NewOrder {
            items,
            total,
            customer: Customer {
                name: form.name.trim().to_owned(),
                email: form.email.trim().to_owned(),
                address,
                details: Some(form.product_details.clone()),
                desired_count: Some(form.desired_count),
                phone: Some(form.phone.clone()),
                location_link: form.location_link.clone(),
            },
            status: OrderStatus::Pending,
        };

        // Submission failure leaves the cart as-is: recoverable by resubmit.
        let order = self.api.submit_order(&order).await?;

        self.cart.clear()?;
        Ok(order)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::cart::LineItem;
    use crate::storage::MemoryStore;
    use chrono::Utc;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use voltstore_core::{OrderId, SnapshotId};

    /// Gateway stub: succeeds or fails on demand, echoing the submission.
    struct StubGateway {
        fail: AtomicBool,
    }

    impl StubGateway {
        fn ok() -> Self {
            Self {
                fail: AtomicBool::new(false),
            }
        }

        fn failing() -> Self {
            Self {
                fail: AtomicBool::new(true),
            }
        }

        fn recover(&self) {
            self.fail.store(false, Ordering::SeqCst);
        }
    }

    impl OrderGateway for StubGateway {
        async fn submit_order(&self, order: &NewOrder) -> Result<Order, ApiError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(ApiError::Status {
                    status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
                    message: "store unreachable".to_owned(),
                });
            }
            Ok(Order {
                id: OrderId::new(1),
                items: order.items.clone(),
                total: order.total,
                customer: order.customer.clone(),
                status: OrderStatus::Pending,
                created_at: Utc::now(),
            })
        }
    }

    fn valid_form() -> CheckoutForm {
        CheckoutForm {
            name: "Asha Rao".to_owned(),
            product_name: "Nova X1".to_owned(),
            email: "asha@example.com".to_owned(),
            address: "12 MG Road".to_owned(),
            city: "Bengaluru".to_owned(),
            zip: "560001".to_owned(),
            phone: "9876543210".to_owned(),
            product_details: "Black, 512GB".to_owned(),
            desired_count: 1,
            location_link: None,
        }
    }

    fn line_item(id: i64, price: i64, quantity: u32) -> LineItem {
        LineItem {
            id: SnapshotId::new(id),
            name: format!("product-{id}"),
            price: Decimal::from(price),
            image: None,
            quantity,
        }
    }

    fn loaded_cart(store: &Arc<MemoryStore>) -> Cart<Arc<MemoryStore>> {
        let mut cart = Cart::load(Arc::clone(store));
        cart.add_item(line_item(1, 999, 1)).unwrap();
        cart.add_item(line_item(2, 349, 2)).unwrap();
        cart
    }

    #[test]
    fn test_validate_collects_all_failures() {
        let form = CheckoutForm::default();
        let errors = form.validate().unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field).collect();
        assert!(fields.contains(&"name"));
        assert!(fields.contains(&"email"));
        assert!(fields.contains(&"phone"));
        assert!(fields.contains(&"desired_count"));
    }

    #[test]
    fn test_validate_phone_counts_digits_only() {
        let mut form = valid_form();
        form.phone = "(987) 654-3210".to_owned();
        assert!(form.validate().is_ok());
        form.phone = "12345".to_owned();
        assert!(form.validate().is_err());
    }

    #[test]
    fn test_full_address_combines_fields() {
        assert_eq!(
            valid_form().full_address(),
            "12 MG Road, Bengaluru, 560001"
        );
    }

    #[tokio::test]
    async fn test_successful_submission_clears_cart() {
        let store = Arc::new(MemoryStore::new());
        let mut cart = loaded_cart(&store);
        let mut history = OrderHistory::load(Arc::clone(&store));
        let api = StubGateway::ok();

        let order = CheckoutFlow::new(&api, &mut cart, &mut history, &store)
            .submit(&valid_form())
            .await
            .unwrap();

        // 999 + 349 * 2 = 1697
        assert_eq!(order.total, Decimal::from(1697));
        assert_eq!(order.items.len(), 2);
        assert!(cart.is_empty(), "cart cleared on success");
        assert_eq!(history.entries().len(), 1);
        assert_eq!(
            store.get(storage::keys::LAST_CHECKOUT_EMAIL).as_deref(),
            Some("asha@example.com")
        );
    }

    #[tokio::test]
    async fn test_failed_submission_keeps_cart_for_resubmit() {
        let store = Arc::new(MemoryStore::new());
        let mut cart = loaded_cart(&store);
        let mut history = OrderHistory::load(Arc::clone(&store));
        let api = StubGateway::failing();

        let err = CheckoutFlow::new(&api, &mut cart, &mut history, &store)
            .submit(&valid_form())
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::Api(_)));
        assert_eq!(cart.items().len(), 2, "cart intact after failure");

        // Recovery: the same cart resubmits without re-entering anything.
        api.recover();
        let order = CheckoutFlow::new(&api, &mut cart, &mut history, &store)
            .submit(&valid_form())
            .await
            .unwrap();
        assert_eq!(order.total, Decimal::from(1697));
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_form_is_rejected_before_any_effect() {
        let store = Arc::new(MemoryStore::new());
        let mut cart = loaded_cart(&store);
        let mut history = OrderHistory::load(Arc::clone(&store));
        let api = StubGateway::ok();

        let mut form = valid_form();
        form.email = "nope".to_owned();

        let err = CheckoutFlow::new(&api, &mut cart, &mut history, &store)
            .submit(&form)
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::Invalid(_)));
        assert_eq!(cart.items().len(), 2);
        assert!(history.entries().is_empty(), "no history for rejected form");
    }

    #[tokio::test]
    async fn test_empty_cart_cannot_check_out() {
        let store = Arc::new(MemoryStore::new());
        let mut cart = Cart::load(Arc::clone(&store));
        let mut history = OrderHistory::load(Arc::clone(&store));
        let api = StubGateway::ok();

        let err = CheckoutFlow::new(&api, &mut cart, &mut history, &store)
            .submit(&valid_form())
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::EmptyCart));
    }
}
