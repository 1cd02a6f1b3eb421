//! Session and local storage, web-storage style
//!
//! In-memory key/value areas with the familiar item API. Test fixtures seed
//! either area through the app configuration.

use std::cell::RefCell;
use std::collections::BTreeMap;

use serde_json::Value;

use crate::config::StorageConfig;

/// One storage area (session or local).
#[derive(Clone, Debug, Default)]
pub struct StorageArea {
    items: RefCell<BTreeMap<String, Value>>,
}

impl StorageArea {
    /// Get a stored value.
    pub fn get_item(&self, key: &str) -> Option<Value> {
        self.items.borrow().get(key).cloned()
    }

    /// Store a value under a key, replacing any previous value.
    pub fn set_item(&self, key: impl Into<String>, value: impl Into<Value>) {
        self.items.borrow_mut().insert(key.into(), value.into());
    }

    /// Remove a key, returning its value if present.
    pub fn remove_item(&self, key: &str) -> Option<Value> {
        self.items.borrow_mut().remove(key)
    }

    /// Remove everything.
    pub fn clear(&self) {
        self.items.borrow_mut().clear();
    }

    /// Number of stored items.
    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    /// Whether the area is empty.
    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    /// The stored keys, in sorted order.
    pub fn keys(&self) -> Vec<String> {
        self.items.borrow().keys().cloned().collect()
    }

    fn seed(&self, values: &serde_json::Map<String, Value>) {
        let mut items = self.items.borrow_mut();
        for (key, value) in values {
            items.insert(key.clone(), value.clone());
        }
    }
}

/// The page's storage service: a session area and a local area.
#[derive(Clone, Debug, Default)]
pub struct Storage {
    session: StorageArea,
    local: StorageArea,
}

impl Storage {
    /// Build storage, seeding both areas from the configuration.
    pub fn new(config: &StorageConfig) -> Self {
        let storage = Self::default();
        storage.session.seed(&config.session);
        storage.local.seed(&config.local);
        storage
    }

    /// The session storage area.
    pub fn session(&self) -> &StorageArea {
        &self.session
    }

    /// The local storage area.
    pub fn local(&self) -> &StorageArea {
        &self.local
    }
}
