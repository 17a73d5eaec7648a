//! Mock `KeyValueStore` implementations for tests.

use std::collections::HashMap;
use std::sync::Mutex;

use daykart_core::error::DomainError;
use daykart_core::storage::KeyValueStore;

/// An in-memory store that also records every write. Useful for asserting
/// that a container persisted after a mutation.
#[derive(Debug, Default)]
pub struct RecordingStore {
    entries: Mutex<HashMap<String, String>>,
    writes: Mutex<Vec<(String, Option<String>)>>,
}

impl RecordingStore {
    /// Creates an empty recording store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `entries`, without recording them
    /// as writes.
    #[must_use]
    pub fn with_entries<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let store = Self::new();
        {
            let mut map = store.entries.lock().unwrap();
            for (key, value) in entries {
                map.insert(key.to_owned(), value.to_owned());
            }
        }
        store
    }

    /// Returns every write in order; removals are recorded with `None`.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn writes(&self) -> Vec<(String, Option<String>)> {
        self.writes.lock().unwrap().clone()
    }

    /// Number of writes (sets and removals) to `key`.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn writes_to(&self, key: &str) -> usize {
        self.writes
            .lock()
            .unwrap()
            .iter()
            .filter(|(k, _)| k == key)
            .count()
    }

    /// Current raw value of `key`.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    /// Current value of `key` parsed as JSON.
    ///
    /// # Panics
    ///
    /// Panics if the value is missing or not valid JSON.
    pub fn json(&self, key: &str) -> serde_json::Value {
        let raw = self.raw(key).expect("key not present in RecordingStore");
        serde_json::from_str(&raw).expect("stored value is not valid JSON")
    }
}

impl KeyValueStore for RecordingStore {
    fn get(&self, key: &str) -> Result<Option<String>, DomainError> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    fn set(&self, key: &str, value: String) -> Result<(), DomainError> {
        self.writes
            .lock()
            .unwrap()
            .push((key.to_owned(), Some(value.clone())));
        self.entries.lock().unwrap().insert(key.to_owned(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), DomainError> {
        self.writes.lock().unwrap().push((key.to_owned(), None));
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }
}

/// A store that always returns a storage error. Useful for testing
/// error-handling paths.
#[derive(Debug)]
pub struct FailingStore;

impl KeyValueStore for FailingStore {
    fn get(&self, _key: &str) -> Result<Option<String>, DomainError> {
        Err(DomainError::Storage("storage unavailable".into()))
    }

    fn set(&self, _key: &str, _value: String) -> Result<(), DomainError> {
        Err(DomainError::Storage("storage unavailable".into()))
    }

    fn remove(&self, _key: &str) -> Result<(), DomainError> {
        Err(DomainError::Storage("storage unavailable".into()))
    }
}
