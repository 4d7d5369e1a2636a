//! Store module
//!
//! Key-value persistence consumed by the ledger. The storage medium is
//! injected; the ledger only needs synchronous whole-document get/set.

mod error;
mod file;
mod transaction;

pub use error::StoreError;
pub use file::JsonFileStore;
pub use transaction::{recover, StoreTransaction};

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Synchronous document store keyed by string.
///
/// Setting `Value::Null` removes the key.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    fn set(&mut self, key: &str, value: Value) -> Result<(), StoreError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &mut S {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), StoreError> {
        (**self).set(key, value)
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), StoreError> {
        (**self).set(key, value)
    }
}

/// Read and decode a typed document, treating absence as `None`
pub fn get_typed<T: DeserializeOwned, S: KeyValueStore + ?Sized>(
    store: &S,
    key: &str,
) -> Result<Option<T>, StoreError> {
    match store.get(key)? {
        None | Some(Value::Null) => Ok(None),
        Some(value) => serde_json::from_value(value)
            .map(Some)
            .map_err(|e| StoreError::invalid_document(key, e)),
    }
}

/// Encode and write a typed document
pub fn set_typed<T: Serialize + ?Sized, S: KeyValueStore + ?Sized>(
    store: &mut S,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    store.set(key, serde_json::to_value(value)?)
}

/// Storage keys for the logical namespaces, derived from one prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespaces {
    pub accounts: String,
    pub codes: String,
    pub current_user: String,
    pub admin: String,
    pub journal: String,
}

impl Namespaces {
    pub fn new(prefix: &str) -> Self {
        Self {
            accounts: format!("{prefix}_users"),
            codes: format!("{prefix}_codes"),
            current_user: format!("{prefix}_currentUser"),
            admin: format!("{prefix}_admin"),
            journal: format!("{prefix}_journal"),
        }
    }
}

impl Default for Namespaces {
    fn default() -> Self {
        Self::new("chip_ledger")
    }
}

/// In-memory store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), StoreError> {
        if value.is_null() {
            self.entries.remove(key);
        } else {
            self.entries.insert(key.to_string(), value);
        }
        Ok(())
    }
}
