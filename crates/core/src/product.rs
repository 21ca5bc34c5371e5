//! Product wire types.
//!
//! Field names follow the store's JSON wire format (camelCase). Orders
//! never reference these rows: checkout snapshots product data by value, so
//! an order stays intact when the product it came from is edited or deleted.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::ProductId;

/// A catalog product as stored and served by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long_description: Option<String>,
    /// Primary image; defaults to the first entry of `images` on create.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub original_price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_percent: Option<i32>,
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub discounted_price: Option<Decimal>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub warranty_2yr: bool,
    #[serde(default)]
    pub free_shipping: bool,
    #[serde(default)]
    pub thirty_day_returns: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warranty_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub returns_text: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Payload for creating or replacing a product. Identical to [`Product`]
/// minus the store-assigned fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub original_price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_percent: Option<i32>,
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub discounted_price: Option<Decimal>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub warranty_2yr: bool,
    #[serde(default)]
    pub free_shipping: bool,
    #[serde(default)]
    pub thirty_day_returns: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warranty_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub returns_text: Option<String>,
}

impl NewProduct {
    /// The primary image: the explicit `image` if set, else the first of
    /// `images`.
    #[must_use]
    pub fn primary_image(&self) -> Option<String> {
        self.image
            .clone()
            .or_else(|| self.images.first().cloned())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn minimal_new_product() -> NewProduct {
        serde_json::from_value(serde_json::json!({
            "name": "Nova X1 Smartphone",
            "price": 999,
            "description": "Holographic edge display."
        }))
        .unwrap()
    }

    #[test]
    fn test_deserialize_minimal_payload() {
        let p = minimal_new_product();
        assert_eq!(p.name, "Nova X1 Smartphone");
        assert_eq!(p.price, Decimal::from(999));
        assert!(p.images.is_empty());
        assert!(!p.free_shipping);
        assert!(p.primary_image().is_none());
    }

    #[test]
    fn test_primary_image_falls_back_to_first() {
        let mut p = minimal_new_product();
        p.images = vec!["a.png".into(), "b.png".into()];
        assert_eq!(p.primary_image().as_deref(), Some("a.png"));

        p.image = Some("main.png".into());
        assert_eq!(p.primary_image().as_deref(), Some("main.png"));
    }

    #[test]
    fn test_wire_field_names_are_camel_case() {
        let p = Product {
            id: ProductId::new(1),
            name: "Sonic Flow Headphones".into(),
            price: Decimal::from(349),
            description: "Adaptive noise cancellation.".into(),
            long_description: Some("Neural audio enhancement.".into()),
            image: None,
            images: vec![],
            category: Some("Audio".into()),
            rating: Some(4.9),
            original_price: Some(Decimal::from(349)),
            discount_percent: Some(50),
            discounted_price: None,
            features: vec!["Neural ANC 2.0".into()],
            warranty_2yr: true,
            free_shipping: false,
            thirty_day_returns: false,
            warranty_text: None,
            shipping_text: None,
            returns_text: None,
            created_at: Utc::now(),
        };
        let value = serde_json::to_value(&p).unwrap();
        assert!(value.get("longDescription").is_some());
        assert!(value.get("originalPrice").is_some());
        assert!(value.get("warranty2yr").is_some());
        assert!(value.get("createdAt").is_some());
        assert!(value.get("long_description").is_none());
    }
}
