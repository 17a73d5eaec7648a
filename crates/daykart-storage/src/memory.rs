//! In-memory implementation of the `KeyValueStore` trait.

use std::collections::HashMap;
use std::sync::RwLock;

use daykart_core::error::DomainError;
use daykart_core::storage::KeyValueStore;

/// Process-lifetime key/value store. Share one instance between tabs with `Arc`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().map_or(0, |entries| entries.len())
    }

    /// Returns `true` if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, DomainError> {
        let entries = self
            .entries
            .read()
            .map_err(|_| DomainError::Storage("lock poisoned".to_owned()))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: String) -> Result<(), DomainError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| DomainError::Storage("lock poisoned".to_owned()))?;
        entries.insert(key.to_owned(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), DomainError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| DomainError::Storage("lock poisoned".to_owned()))?;
        entries.remove(key);
        Ok(())
    }
}
