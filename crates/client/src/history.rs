//! Locally-kept order history.
//!
//! Maintained independently of server state and keyed by a client-generated
//! random identifier, so past orders render before any server round-trip
//! and survive even when the server copy cannot be fetched (a different
//! device, say). Once the server-authoritative list is available - matched
//! by the submitter's email - it is preferred over these entries.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use voltstore_core::{Order, OrderItem};

use crate::storage::{self, LocalStore, StorageError};

/// Customer details kept with a local history entry. Leaner than the order's
/// customer record: history never needs contact fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryCustomer {
    pub name: String,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desired_count: Option<u32>,
}

/// One locally-recorded order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Client-generated random identifier; unrelated to the server order id.
    pub id: String,
    pub date: DateTime<Utc>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    pub items: Vec<OrderItem>,
    pub customer: HistoryCustomer,
}

/// Order history bound to a durable local store, newest first.
pub struct OrderHistory<S: LocalStore> {
    entries: Vec<HistoryEntry>,
    store: S,
}

impl<S: LocalStore> OrderHistory<S> {
    /// Load the history persisted in `store`; unparseable or missing state
    /// starts empty. Entries written by older clients that split the
    /// customer name into first/last fields are migrated on the way in.
    pub fn load(store: S) -> Self {
        let entries = store
            .get(storage::keys::ORDER_HISTORY)
            .and_then(|raw| match serde_json::from_str(&raw) {
                Ok(values) => Some(migrate_entries(values)),
                Err(e) => {
                    tracing::warn!(error = %e, "corrupt persisted history, starting empty");
                    None
                }
            })
            .unwrap_or_default();

        Self { entries, store }
    }

    /// Record an order at the front of the history and return its
    /// client-generated id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the updated history cannot be persisted.
    pub fn add(
        &mut self,
        total: Decimal,
        items: Vec<OrderItem>,
        customer: HistoryCustomer,
    ) -> Result<String, StorageError> {
        let entry = HistoryEntry {
            id: Uuid::new_v4().to_string(),
            date: Utc::now(),
            total,
            items,
            customer,
        };
        let id = entry.id.clone();
        self.entries.insert(0, entry);
        self.persist()?;

        Ok(id)
    }

    /// Remove an entry by its client-generated id; absent ids are a no-op.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the updated history cannot be persisted.
    pub fn remove(&mut self, id: &str) -> Result<(), StorageError> {
        self.entries.retain(|entry| entry.id != id);
        self.persist()
    }

    /// Drop every entry.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the updated history cannot be persisted.
    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.entries.clear();
        self.persist()
    }

    /// The entries, newest first.
    #[must_use]
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    fn persist(&self) -> Result<(), StorageError> {
        let raw = serde_json::to_string(&self.entries)?;
        self.store.set(storage::keys::ORDER_HISTORY, &raw)
    }
}

/// What the history view should render.
#[derive(Debug, Clone, PartialEq)]
pub enum HistorySource<'a> {
    /// The server-authoritative list, matched by the submitter's email.
    Server(&'a [Order]),
    /// The locally-kept entries.
    Local(&'a [HistoryEntry]),
}

/// Reconcile the two histories: server orders win once the fetch has
/// succeeded and found something; until then (or on another device where
/// the fetch comes back empty) the local entries carry the view.
#[must_use]
pub fn reconcile<'a>(
    server: Option<&'a [Order]>,
    local: &'a [HistoryEntry],
) -> HistorySource<'a> {
    match server {
        Some(orders) if !orders.is_empty() => HistorySource::Server(orders),
        _ => HistorySource::Local(local),
    }
}

/// Parse persisted entries, folding the legacy `firstName`/`lastName`
/// customer shape into the single `name` field. Entries that still fail to
/// parse are dropped rather than poisoning the whole history.
fn migrate_entries(values: Vec<serde_json::Value>) -> Vec<HistoryEntry> {
    values
        .into_iter()
        .filter_map(|mut value| {
            if let Some(customer) = value.get_mut("customer").and_then(|c| c.as_object_mut())
                && (customer.contains_key("firstName") || customer.contains_key("lastName"))
            {
                let first = customer
                    .remove("firstName")
                    .and_then(|v| v.as_str().map(str::to_owned));
                let last = customer
                    .remove("lastName")
                    .and_then(|v| v.as_str().map(str::to_owned));
                let name = [first, last]
                    .into_iter()
                    .flatten()
                    .collect::<Vec<_>>()
                    .join(" ")
                    .trim()
                    .to_owned();
                customer.insert("name".to_owned(), serde_json::Value::String(name));
            }
            serde_json::from_value(value).ok()
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use std::sync::Arc;
    use voltstore_core::SnapshotId;

    fn customer() -> HistoryCustomer {
        HistoryCustomer {
            name: "Asha Rao".to_owned(),
            address: "12 MG Road, Bengaluru, 560001".to_owned(),
            details: None,
            desired_count: Some(1),
        }
    }

    fn items() -> Vec<OrderItem> {
        vec![OrderItem {
            id: SnapshotId::new(1),
            name: "Nova X1 Smartphone".to_owned(),
            price: Decimal::from(999),
            quantity: 1,
            image: None,
        }]
    }

    #[test]
    fn test_add_prepends_and_persists() {
        let store = Arc::new(MemoryStore::new());
        let mut history = OrderHistory::load(Arc::clone(&store));

        history.add(Decimal::from(999), items(), customer()).unwrap();
        let second = history
            .add(Decimal::from(175), items(), customer())
            .unwrap();

        assert_eq!(history.entries().len(), 2);
        assert_eq!(history.entries()[0].id, second, "newest first");

        let reloaded = OrderHistory::load(Arc::clone(&store));
        assert_eq!(reloaded.entries().len(), 2);
    }

    #[test]
    fn test_entry_ids_are_unique() {
        let store = Arc::new(MemoryStore::new());
        let mut history = OrderHistory::load(store);
        let a = history.add(Decimal::from(999), items(), customer()).unwrap();
        let b = history.add(Decimal::from(999), items(), customer()).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let store = Arc::new(MemoryStore::new());
        let mut history = OrderHistory::load(store);
        let id = history.add(Decimal::from(999), items(), customer()).unwrap();

        history.remove(&id).unwrap();
        assert!(history.entries().is_empty());
        history.remove(&id).unwrap();
        assert!(history.entries().is_empty());
    }

    #[test]
    fn test_legacy_customer_shape_is_migrated() {
        let store = Arc::new(MemoryStore::new());
        let legacy = serde_json::json!([{
            "id": "abc123xyz",
            "date": "2024-11-02T10:00:00Z",
            "total": 999,
            "items": [{"id": 1, "name": "Nova X1", "price": 999, "quantity": 1}],
            "customer": {
                "firstName": "Asha",
                "lastName": "Rao",
                "address": "12 MG Road"
            }
        }]);
        store
            .set(storage::keys::ORDER_HISTORY, &legacy.to_string())
            .unwrap();

        let history = OrderHistory::load(store);
        assert_eq!(history.entries().len(), 1);
        assert_eq!(history.entries()[0].customer.name, "Asha Rao");
    }

    #[test]
    fn test_corrupt_history_starts_empty() {
        let store = Arc::new(MemoryStore::new());
        store.set(storage::keys::ORDER_HISTORY, "[{oops").unwrap();
        let history = OrderHistory::load(store);
        assert!(history.entries().is_empty());
    }

    #[test]
    fn test_reconcile_prefers_nonempty_server_list() {
        let store = Arc::new(MemoryStore::new());
        let mut history = OrderHistory::load(store);
        history.add(Decimal::from(999), items(), customer()).unwrap();

        let server = vec![voltstore_core::Order {
            id: voltstore_core::OrderId::new(1),
            items: items(),
            total: Decimal::from(999),
            customer: voltstore_core::Customer {
                name: "Asha Rao".to_owned(),
                email: "asha@example.com".to_owned(),
                address: "12 MG Road".to_owned(),
                details: None,
                desired_count: None,
                phone: None,
                location_link: None,
            },
            status: voltstore_core::OrderStatus::Pending,
            created_at: Utc::now(),
        }];

        // Fetched and non-empty: server wins.
        assert!(matches!(
            reconcile(Some(&server), history.entries()),
            HistorySource::Server(_)
        ));
        // Fetched but empty (different device): local entries carry the view.
        assert!(matches!(
            reconcile(Some(&[]), history.entries()),
            HistorySource::Local(_)
        ));
        // Not fetched yet: local entries.
        assert!(matches!(
            reconcile(None, history.entries()),
            HistorySource::Local(_)
        ));
    }
}
