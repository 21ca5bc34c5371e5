//! The built-in static catalog.
//!
//! Four flagship products the storefront renders before (or without) any
//! server round-trip. Their shape differs from the store's product list -
//! numeric ids, a required primary image, `specs` instead of `features` -
//! which is exactly why the cart goes through one explicit adapter
//! ([`crate::cart::CartSource`]) instead of poking at fields.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A product from the static catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogProduct {
    pub id: i64,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub image: String,
    pub images: Vec<String>,
    pub category: String,
    pub rating: f64,
    pub description: String,
    pub long_description: String,
    pub specs: Vec<String>,
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
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub benefits: Option<Vec<String>>,
}

const STANDARD_BENEFITS: [&str; 3] = ["2 Year Warranty", "Free Shipping", "30 Day Returns"];

fn standard_benefits() -> Vec<String> {
    STANDARD_BENEFITS.iter().map(|s| (*s).to_owned()).collect()
}

/// The demo catalog shipped with the storefront.
#[must_use]
pub fn demo_catalog() -> Vec<CatalogProduct> {
    vec![
        CatalogProduct {
            id: 1,
            name: "Nova X1 Smartphone".to_owned(),
            price: Decimal::from(999),
            original_price: Some(Decimal::from(999)),
            discount_percent: Some(50),
            discounted_price: Some(Decimal::from(500)),
            benefits: Some(standard_benefits()),
            image: "/assets/phone.png".to_owned(),
            images: vec![
                "/assets/phone.png".to_owned(),
                "/assets/phone-side.png".to_owned(),
                "/assets/phone-back.png".to_owned(),
            ],
            category: "Mobile".to_owned(),
            rating: 4.8,
            description: "Holographic edge display with quantum processing power.".to_owned(),
            long_description: "The Nova X1 redefines mobile computing with its bezel-less \
                holographic edge display. Powered by the Quantum Snapdragon 9 processor, it \
                delivers instant AI responses and immersive AR experiences."
                .to_owned(),
            specs: vec![
                "6.8\" Holographic AMOLED".to_owned(),
                "Quantum Snapdragon 9".to_owned(),
                "12GB RAM / 512GB Storage".to_owned(),
                "108MP Neural Camera".to_owned(),
            ],
        },
        CatalogProduct {
            id: 2,
            name: "Sonic Flow Headphones".to_owned(),
            price: Decimal::from(349),
            original_price: Some(Decimal::from(349)),
            discount_percent: Some(50),
            discounted_price: Some(Decimal::from(175)),
            benefits: Some(standard_benefits()),
            image: "/assets/headphones.png".to_owned(),
            images: vec![
                "/assets/headphones.png".to_owned(),
                "/assets/headphones-folded.png".to_owned(),
            ],
            category: "Audio".to_owned(),
            rating: 4.9,
            description: "Adaptive noise cancellation with neural audio enhancement.".to_owned(),
            long_description: "Sonic Flow headphones use real-time neural processing to adapt \
                audio profiles to your specific ear shape and environment."
                .to_owned(),
            specs: vec![
                "Neural ANC 2.0".to_owned(),
                "40h Battery Life".to_owned(),
                "Lossless Wireless Audio".to_owned(),
            ],
        },
        CatalogProduct {
            id: 3,
            name: "Chronos Smartwatch".to_owned(),
            price: Decimal::from(499),
            original_price: Some(Decimal::from(499)),
            discount_percent: Some(50),
            discounted_price: Some(Decimal::from(250)),
            benefits: Some(standard_benefits()),
            image: "/assets/watch.png".to_owned(),
            images: vec![
                "/assets/watch.png".to_owned(),
                "/assets/watch-ui.png".to_owned(),
            ],
            category: "Wearables".to_owned(),
            rating: 4.7,
            description: "Biometric health tracking projected directly on your skin.".to_owned(),
            long_description: "Chronos projects vital stats directly onto your wrist using a \
                safe, low-power laser interface. The titanium chassis is virtually \
                indestructible."
                .to_owned(),
            specs: vec![
                "Holographic Projection UI".to_owned(),
                "Titanium Body".to_owned(),
                "7-Day Battery".to_owned(),
            ],
        },
        CatalogProduct {
            id: 4,
            name: "Blade Runner Laptop".to_owned(),
            price: Decimal::from(2499),
            original_price: Some(Decimal::from(2499)),
            discount_percent: Some(50),
            discounted_price: Some(Decimal::from(1250)),
            benefits: Some(standard_benefits()),
            image: "/assets/laptop.png".to_owned(),
            images: vec![
                "/assets/laptop.png".to_owned(),
                "/assets/laptop-keyboard.png".to_owned(),
            ],
            category: "Computing".to_owned(),
            rating: 5.0,
            description: "Desktop power in a wafer-thin chassis with RGB aura.".to_owned(),
            long_description: "The Blade Runner is the thinnest gaming laptop ever created. \
                Despite its size, it packs a desktop-class GPU and a liquid cooling system."
                .to_owned(),
            specs: vec![
                "RTX 5090 Mobile".to_owned(),
                "i9-14900HK".to_owned(),
                "4K 240Hz OLED".to_owned(),
            ],
        },
    ]
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_has_unique_ids() {
        let catalog = demo_catalog();
        let mut ids: Vec<i64> = catalog.iter().map(|p| p.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), catalog.len());
    }

    #[test]
    fn test_every_product_has_a_primary_image_in_its_gallery() {
        for product in demo_catalog() {
            assert_eq!(product.images[0], product.image, "{}", product.name);
        }
    }

    #[test]
    fn test_discounts_are_consistent() {
        for product in demo_catalog() {
            let discounted = product.discounted_price.unwrap();
            assert!(discounted < product.price, "{}", product.name);
        }
    }
}
