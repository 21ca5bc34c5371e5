//! Durable local storage.
//!
//! A small string key-value store that survives restarts - the cart, the
//! order history, the admin token, and the last checkout email all live
//! here. The trait seam keeps every consumer testable with an in-memory
//! implementation.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use thiserror::Error;

/// Well-known storage keys. All values are opaque to the server.
pub mod keys {
    /// Serialized cart line items.
    pub const CART_ITEMS: &str = "cart_items";
    /// Serialized local order history.
    pub const ORDER_HISTORY: &str = "order_history";
    /// Admin bearer token.
    pub const ADMIN_TOKEN: &str = "admin_token";
    /// Email used on the last checkout, for history reconciliation.
    pub const LAST_CHECKOUT_EMAIL: &str = "last_checkout_email";
}

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A durable string key-value store.
pub trait LocalStore: Send + Sync {
    /// Read a value.
    fn get(&self, key: &str) -> Option<String>;

    /// Write a value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be persisted.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a value. Deleting a missing key is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the deletion cannot be persisted.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

impl<T: LocalStore + ?Sized> LocalStore for Arc<T> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

/// In-memory store for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocalStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .ok()
            .and_then(|entries| entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_owned(), value.to_owned());
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        if let Ok(mut entries) = self.entries.lock() {
            entries.remove(key);
        }
        Ok(())
    }
}

/// File-backed store: one JSON object per file, rewritten on every change.
///
/// The volumes involved (a cart, a short order history, one token) make the
/// whole-file rewrite the simplest correct option.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl FileStore {
    /// Open a file-backed store, creating parent directories as needed.
    ///
    /// A corrupt file is treated as empty rather than refusing to start.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the parent directory cannot be created
    /// or an existing file cannot be read.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let entries = if path.exists() {
            let raw = std::fs::read_to_string(&path)?;
            match serde_json::from_str(&raw) {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "corrupt local store, starting empty");
                    HashMap::new()
                }
            }
        } else {
            HashMap::new()
        };

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    fn flush(&self, entries: &HashMap<String, String>) -> Result<(), StorageError> {
        let raw = serde_json::to_string_pretty(entries)?;
        std::fs::write(&self.path, raw)?;
        Ok(())
    }
}

impl LocalStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .ok()
            .and_then(|entries| entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let Ok(mut entries) = self.entries.lock() else {
            return Ok(());
        };
        entries.insert(key.to_owned(), value.to_owned());
        self.flush(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let Ok(mut entries) = self.entries.lock() else {
            return Ok(());
        };
        entries.remove(key);
        self.flush(&entries)
    }
}
