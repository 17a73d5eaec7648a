//! Key/value storage abstraction.
//!
//! Every container persists its state as a JSON string under a well-known
//! key, mirroring a browser's `localStorage`. Reads and writes are
//! synchronous; backends are expected to be fast and in-memory backed.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::DomainError;

/// Well-known storage keys.
pub mod keys {
    /// Product collection.
    pub const PRODUCTS: &str = "products";
    /// Cart entries.
    pub const CART: &str = "cart";
    /// Liked product ids.
    pub const LIKED: &str = "liked";
    /// Current theme (`"light"` or `"dark"`).
    pub const THEME: &str = "theme";
    /// Current user session.
    pub const USER: &str = "user";
    /// Capped mirror of recently published product events.
    pub const PRODUCT_EVENTS: &str = "productEvents";
    /// Admin "orders visible" toggle (`"true"` or `"false"`).
    pub const ADMIN_ORDERS_VISIBLE: &str = "adminOrdersVisible";
}

/// String-keyed store of string values.
pub trait KeyValueStore: Send + Sync {
    /// Returns the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Storage` if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, DomainError>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Storage` if the backend cannot be written.
    fn set(&self, key: &str, value: String) -> Result<(), DomainError>;

    /// Removes `key`. Removing an absent key succeeds.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Storage` if the backend cannot be written.
    fn remove(&self, key: &str) -> Result<(), DomainError>;
}

/// Reads and decodes the JSON value stored under `key`.
///
/// # Errors
///
/// Returns `DomainError::Storage` if the read fails and
/// `DomainError::Serialization` if the stored value is not valid JSON for `T`.
pub fn read_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, DomainError> {
    match store.get(key)? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// Encodes `value` as JSON and stores it under `key`.
///
/// # Errors
///
/// Returns `DomainError::Serialization` if encoding fails and
/// `DomainError::Storage` if the write fails.
pub fn write_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), DomainError> {
    let raw = serde_json::to_string(value)?;
    store.set(key, raw)
}

/// Loads the value under `key`, falling back to `default` when it is missing
/// or cannot be read. Failures are logged, never surfaced.
pub fn load_or_else<T, F>(store: &dyn KeyValueStore, key: &str, default: F) -> T
where
    T: DeserializeOwned,
    F: FnOnce() -> T,
{
    match read_json(store, key) {
        Ok(Some(value)) => value,
        Ok(None) => default(),
        Err(e) => {
            tracing::warn!(key, error = %e, "failed to load persisted value, using default");
            default()
        }
    }
}

/// Persists `value` under `key`, logging instead of failing.
pub fn persist_or_log<T: Serialize + ?Sized>(store: &dyn KeyValueStore, key: &str, value: &T) {
    if let Err(e) = write_json(store, key, value) {
        tracing::warn!(key, error = %e, "failed to persist value");
    }
}
