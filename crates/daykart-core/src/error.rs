//! Domain error types.

use thiserror::Error;

/// Top-level domain error type shared by every storefront container.
#[derive(Debug, Error)]
pub enum DomainError {
    /// No product with the given identifier exists in the catalog.
    #[error("product not found: {0}")]
    ProductNotFound(u64),

    /// A validation error in domain logic.
    #[error("validation error: {0}")]
    Validation(String),

    /// The current session is not allowed to perform the operation.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The backing key/value store failed to read or write.
    #[error("storage error: {0}")]
    Storage(String),

    /// A persisted or broadcast value could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// An event listener reported a failure while handling an event.
    #[error("listener error: {0}")]
    Listener(String),
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
