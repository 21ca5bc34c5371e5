//! The cart engine.
//!
//! An explicitly-owned, ordered collection of line items keyed by product
//! identity. Adding a product already in the cart increments its quantity;
//! the total is recomputed from the line items on every read and never
//! stored. The cart lives entirely on the client: the server first sees its
//! contents as the snapshot inside a checkout submission.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use voltstore_core::{OrderItem, SnapshotId};

use crate::catalog::CatalogProduct;
use crate::storage::{self, LocalStore, StorageError};

/// One product-and-quantity entry in the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: SnapshotId,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub quantity: u32,
}

impl From<&LineItem> for OrderItem {
    /// The value snapshot embedded in a checkout submission.
    fn from(item: &LineItem) -> Self {
        Self {
            id: item.id,
            name: item.name.clone(),
            price: item.price,
            quantity: item.quantity,
            image: item.image.clone(),
        }
    }
}

// =============================================================================
// Identity Normalization
// =============================================================================

/// A product identifier as it appears on the wire: numeric from this store,
/// a string from the legacy document store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProductKey {
    Num(i64),
    Str(String),
}

/// Deterministic numeric surrogate for a string identifier.
///
/// Polynomial hash, base 31, unsigned 32-bit wraparound, over the string's
/// UTF-16 code units. Determinism is what matters: the same product added
/// twice must merge into one line item. Collisions are tolerated at
/// single-session cart scope.
#[must_use]
pub fn hash_id(input: &str) -> u32 {
    let mut h: u32 = 0;
    for unit in input.encode_utf16() {
        h = h.wrapping_mul(31).wrapping_add(u32::from(unit));
    }
    h
}

impl ProductKey {
    /// Collapse to the numeric surrogate used as line-item identity.
    ///
    /// String keys hash deterministically; the zero-hash edge (and a missing
    /// key, handled by callers) falls back to a random surrogate that never
    /// merges.
    #[must_use]
    pub fn surrogate(&self) -> SnapshotId {
        match self {
            Self::Num(n) => SnapshotId::new(*n),
            Self::Str(s) => {
                let h = hash_id(s);
                if h == 0 {
                    random_surrogate()
                } else {
                    SnapshotId::new(i64::from(h))
                }
            }
        }
    }
}

fn random_surrogate() -> SnapshotId {
    SnapshotId::new(i64::from(rand::random::<u32>()))
}

/// A product as served by the store's product list.
///
/// Deliberately lenient: ids may be numeric or strings, prices may be
/// missing, and both `features` and the legacy `specs` spelling are
/// accepted. The adapter below is the only place this shape is interpreted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct StoreProduct {
    #[serde(default, alias = "_id")]
    pub id: Option<ProductKey>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub price: Option<Decimal>,
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub discounted_price: Option<Decimal>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub long_description: Option<String>,
    #[serde(default, alias = "specs")]
    pub features: Vec<String>,
}

/// Input contract of the cart adapter: a product from the built-in static
/// catalog, or one from the store's dynamic product list. The two shapes
/// differ in field names and id types; every consumer goes through this
/// tagged union instead of interpreting fields itself.
#[derive(Debug, Clone)]
pub enum CartSource<'a> {
    Catalog(&'a CatalogProduct),
    Store(&'a StoreProduct),
}

impl CartSource<'_> {
    /// Normalize into the canonical line-item shape, quantity 1.
    ///
    /// The discounted price wins over the list price when present; the
    /// primary image falls back to the first gallery image.
    #[must_use]
    pub fn to_line_item(&self) -> LineItem {
        match self {
            Self::Catalog(p) => LineItem {
                id: SnapshotId::new(p.id),
                name: p.name.clone(),
                price: p.discounted_price.unwrap_or(p.price),
                image: Some(p.image.clone()),
                quantity: 1,
            },
            Self::Store(p) => LineItem {
                id: p
                    .id
                    .as_ref()
                    .map_or_else(random_surrogate, ProductKey::surrogate),
                name: p.name.clone().unwrap_or_else(|| "Product".to_owned()),
                price: p
                    .discounted_price
                    .or(p.price)
                    .unwrap_or(Decimal::ZERO),
                image: p.image.clone().or_else(|| p.images.first().cloned()),
                quantity: 1,
            },
        }
    }
}

// =============================================================================
// Cart State
// =============================================================================

/// Pure cart state: ordered line items, at most one per product identity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartState {
    items: Vec<LineItem>,
}

impl CartState {
    /// Merge a line item into the cart: increment the quantity of an
    /// existing entry with the same id, else append.
    pub fn add(&mut self, item: LineItem) {
        match self.items.iter_mut().find(|existing| existing.id == item.id) {
            Some(existing) => existing.quantity += item.quantity,
            None => self.items.push(item),
        }
    }

    /// Remove the line item with this id. Removing an absent id is a no-op.
    pub fn remove(&mut self, id: SnapshotId) {
        self.items.retain(|item| item.id != id);
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Sum of `price * quantity` over all line items, recomputed on every
    /// read so it can never drift from the items.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.items
            .iter()
            .map(|item| item.price * Decimal::from(item.quantity))
            .sum()
    }

    /// Total number of units across all line items.
    #[must_use]
    pub fn count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// The line items, in insertion order.
    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// =============================================================================
// Persistent Cart
// =============================================================================

/// A cart bound to a durable local store.
///
/// Every mutation persists the new state before returning, so a reload (or
/// crash) picks up where the shopper left off. There is deliberately no
/// global instance: construct one where it is needed and pass it down.
pub struct Cart<S: LocalStore> {
    state: CartState,
    store: S,
}

impl<S: LocalStore> Cart<S> {
    /// Load the cart persisted in `store`; unparseable or missing state
    /// starts empty.
    pub fn load(store: S) -> Self {
        let state = store
            .get(storage::keys::CART_ITEMS)
            .and_then(|raw| match serde_json::from_str(&raw) {
                Ok(state) => Some(state),
                Err(e) => {
                    tracing::warn!(error = %e, "corrupt persisted cart, starting empty");
                    None
                }
            })
            .unwrap_or_default();

        Self { state, store }
    }

    /// Normalize a product and merge it into the cart.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the updated cart cannot be persisted; the
    /// in-memory state is updated regardless.
    pub fn add(&mut self, source: &CartSource<'_>) -> Result<(), StorageError> {
        self.add_item(source.to_line_item())
    }

    /// Merge an already-normalized line item into the cart.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the updated cart cannot be persisted.
    pub fn add_item(&mut self, item: LineItem) -> Result<(), StorageError> {
        self.state.add(item);
        self.persist()
    }

    /// Remove a line item by id; absent ids are a no-op.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the updated cart cannot be persisted.
    pub fn remove(&mut self, id: SnapshotId) -> Result<(), StorageError> {
        self.state.remove(id);
        self.persist()
    }

    /// Empty the cart; called after a successful order submission.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the updated cart cannot be persisted.
    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.state.clear();
        self.persist()
    }

    /// See [`CartState::total`].
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.state.total()
    }

    /// See [`CartState::count`].
    #[must_use]
    pub fn count(&self) -> u32 {
        self.state.count()
    }

    /// See [`CartState::items`].
    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        self.state.items()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }

    fn persist(&self) -> Result<(), StorageError> {
        let raw = serde_json::to_string(&self.state)?;
        self.store.set(storage::keys::CART_ITEMS, &raw)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use std::sync::Arc;

    fn line_item(id: i64, price: i64) -> LineItem {
        LineItem {
            id: SnapshotId::new(id),
            name: format!("product-{id}"),
            price: Decimal::from(price),
            image: None,
            quantity: 1,
        }
    }

    fn store_product(json: serde_json::Value) -> StoreProduct {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_adding_same_product_merges_quantity() {
        let mut cart = CartState::default();
        for _ in 0..5 {
            cart.add(line_item(1, 999));
        }
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 5);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut cart = CartState::default();
        cart.add(line_item(1, 999));
        cart.remove(SnapshotId::new(1));
        assert!(cart.is_empty());
        // Second removal of the same id is a no-op, not an error.
        cart.remove(SnapshotId::new(1));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_total_recomputes_after_every_mutation() {
        let mut cart = CartState::default();
        cart.add(line_item(1, 999));
        cart.add(line_item(2, 349));
        cart.add(line_item(2, 349));
        // 999 + 349 * 2 = 1697
        assert_eq!(cart.total(), Decimal::from(1697));

        cart.remove(SnapshotId::new(1));
        assert_eq!(cart.total(), Decimal::from(698));

        cart.clear();
        assert_eq!(cart.total(), Decimal::ZERO);
    }

    #[test]
    fn test_hash_id_is_deterministic() {
        let a = hash_id("6650cf4b9a2d1c0012345678");
        let b = hash_id("6650cf4b9a2d1c0012345678");
        assert_eq!(a, b);
        assert_ne!(a, hash_id("6650cf4b9a2d1c0012345679"));
    }

    #[test]
    fn test_hash_id_matches_reference_values() {
        // h = h * 31 + code_unit, u32 wraparound.
        assert_eq!(hash_id(""), 0);
        assert_eq!(hash_id("a"), 97);
        assert_eq!(hash_id("ab"), 97 * 31 + 98);
    }

    #[test]
    fn test_string_ids_merge_across_normalizations() {
        let p = store_product(serde_json::json!({
            "_id": "6650cf4b9a2d1c0012345678",
            "name": "Chronos Smartwatch",
            "price": 499
        }));
        let mut cart = CartState::default();
        cart.add(CartSource::Store(&p).to_line_item());
        cart.add(CartSource::Store(&p).to_line_item());
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 2);
    }

    #[test]
    fn test_normalization_prefers_discounted_price() {
        let p = store_product(serde_json::json!({
            "id": 7,
            "name": "Nova X1",
            "price": 999,
            "discountedPrice": 500
        }));
        let item = CartSource::Store(&p).to_line_item();
        assert_eq!(item.price, Decimal::from(500));
        assert_eq!(item.id, SnapshotId::new(7));
    }

    #[test]
    fn test_normalization_falls_back_to_first_image() {
        let p = store_product(serde_json::json!({
            "id": 7,
            "name": "Nova X1",
            "price": 999,
            "images": ["front.png", "back.png"]
        }));
        let item = CartSource::Store(&p).to_line_item();
        assert_eq!(item.image.as_deref(), Some("front.png"));
    }

    #[test]
    fn test_catalog_products_normalize_directly() {
        let catalog = crate::catalog::demo_catalog();
        let item = CartSource::Catalog(&catalog[0]).to_line_item();
        assert_eq!(item.id, SnapshotId::new(catalog[0].id));
        assert_eq!(item.quantity, 1);
    }

    #[test]
    fn test_missing_id_gets_surrogate_that_never_merges() {
        let p = store_product(serde_json::json!({
            "name": "Mystery Box",
            "price": 10
        }));
        let mut cart = CartState::default();
        cart.add(CartSource::Store(&p).to_line_item());
        cart.add(CartSource::Store(&p).to_line_item());
        // Random surrogates: two adds almost surely stay two lines; what
        // matters is that nothing panics and quantities stay per-line.
        assert_eq!(cart.count(), 2);
    }

    #[test]
    fn test_cart_persists_through_store() {
        let store = Arc::new(MemoryStore::new());

        let mut cart = Cart::load(Arc::clone(&store));
        cart.add_item(line_item(1, 999)).unwrap();
        cart.add_item(line_item(1, 999)).unwrap();

        // A fresh cart over the same store sees the persisted state.
        let reloaded = Cart::load(Arc::clone(&store));
        assert_eq!(reloaded.items().len(), 1);
        assert_eq!(reloaded.items()[0].quantity, 2);
        assert_eq!(reloaded.total(), Decimal::from(1998));
    }

    #[test]
    fn test_corrupt_persisted_cart_starts_empty() {
        let store = Arc::new(MemoryStore::new());
        store.set(storage::keys::CART_ITEMS, "{broken").unwrap();

        let cart = Cart::load(Arc::clone(&store));
        assert!(cart.is_empty());
    }
}
