//! Order wire types.
//!
//! An order carries a value snapshot of the purchased products: each line
//! item embeds the id/name/price/image it had at checkout time, so later
//! product edits or deletions never touch existing orders.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{OrderId, OrderStatus, SnapshotId};

/// One product-and-quantity entry within an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: SnapshotId,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl OrderItem {
    /// Line subtotal: unit price times quantity.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// Sum of `price * quantity` over a set of line items.
///
/// This is the authoritative figure: the server recomputes it from the
/// submitted snapshot and rejects orders whose claimed total disagrees.
#[must_use]
pub fn items_total(items: &[OrderItem]) -> Decimal {
    items.iter().map(OrderItem::subtotal).sum()
}

/// Customer details captured at checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub name: String,
    pub email: String,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desired_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_link: Option<String>,
}

/// Checkout submission payload.
///
/// `status` is accepted for wire compatibility but the store always creates
/// orders as [`OrderStatus::Pending`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOrder {
    pub items: Vec<OrderItem>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    pub customer: Customer,
    #[serde(default)]
    pub status: OrderStatus,
}

/// An order as stored and served by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub items: Vec<OrderItem>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    pub customer: Customer,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}
