//! Capped copy of recent events in the key/value store.
//!
//! The mirror lets a freshly opened tab see what happened recently in its
//! siblings. It is never replayed into subscribers automatically.

use std::sync::Arc;

use daykart_core::error::DomainError;
use daykart_core::storage::{KeyValueStore, read_json, write_json};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Persisted, capped list of recently published events.
#[derive(Clone)]
pub struct EventMirror {
    store: Arc<dyn KeyValueStore>,
    key: String,
    capacity: usize,
}

impl EventMirror {
    /// Creates a mirror stored under `key`, keeping at most `capacity` events.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>, key: impl Into<String>, capacity: usize) -> Self {
        Self {
            store,
            key: key.into(),
            capacity: capacity.max(1),
        }
    }

    /// Appends an event, trimming the persisted list to the most recent
    /// `capacity` entries.
    ///
    /// A corrupt persisted list is discarded and restarted.
    ///
    /// # Errors
    ///
    /// Returns `DomainError` if the event cannot be encoded or the store
    /// cannot be read or written.
    pub fn append<E: Serialize>(&self, event: &E) -> Result<(), DomainError> {
        let mut entries: Vec<serde_json::Value> = match read_json(&*self.store, &self.key) {
            Ok(entries) => entries.unwrap_or_default(),
            Err(DomainError::Serialization(e)) => {
                tracing::warn!(key = %self.key, error = %e, "discarding corrupt event mirror");
                Vec::new()
            }
            Err(e) => return Err(e),
        };
        entries.push(serde_json::to_value(event)?);
        if entries.len() > self.capacity {
            let excess = entries.len() - self.capacity;
            entries.drain(..excess);
        }
        write_json(&*self.store, &self.key, &entries)
    }

    /// Returns the mirrored events, oldest first. Entries that no longer
    /// decode as `E` are skipped.
    ///
    /// # Errors
    ///
    /// Returns `DomainError` if the store cannot be read or the list itself
    /// is corrupt.
    pub fn recent<E: DeserializeOwned>(&self) -> Result<Vec<E>, DomainError> {
        let entries: Vec<serde_json::Value> =
            read_json(&*self.store, &self.key)?.unwrap_or_default();
        Ok(entries
            .into_iter()
            .filter_map(|value| match serde_json::from_value(value) {
                Ok(event) => Some(event),
                Err(e) => {
                    tracing::warn!(key = %self.key, error = %e, "skipping undecodable mirrored event");
                    None
                }
            })
            .collect())
    }

    /// Storage key the mirror lives under.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Maximum number of mirrored events.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl std::fmt::Debug for EventMirror {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventMirror")
            .field("key", &self.key)
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}
