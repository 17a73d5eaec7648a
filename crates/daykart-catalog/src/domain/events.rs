//! Domain events for the product catalog.

use daykart_core::event::{DomainEvent, EventMetadata};
use serde::{Deserialize, Serialize};

use crate::domain::product::Product;

/// Payload of `PRODUCT_DELETED`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDeleted {
    /// The product identifier.
    pub id: u64,
}

/// Event payload variants for the product catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductEventKind {
    /// A product has been added.
    ProductAdded(Product),
    /// A product has been updated; carries the full record after the change.
    ProductUpdated(Product),
    /// A product has been deleted.
    ProductDeleted(ProductDeleted),
}

/// Domain event envelope for the product catalog.
///
/// Serialized as `{"type": ..., "payload": ..., "metadata": ...}`, which is
/// the shape stored in the event mirror and carried across tabs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductEvent {
    /// Event-specific payload.
    #[serde(flatten)]
    pub kind: ProductEventKind,
    /// Event metadata.
    pub metadata: EventMetadata,
}

impl ProductEvent {
    /// Builds a `PRODUCT_ADDED` event.
    #[must_use]
    pub fn added(metadata: EventMetadata, product: Product) -> Self {
        Self {
            metadata,
            kind: ProductEventKind::ProductAdded(product),
        }
    }

    /// Builds a `PRODUCT_UPDATED` event from the product as it now stands.
    #[must_use]
    pub fn updated(metadata: EventMetadata, product: Product) -> Self {
        Self {
            metadata,
            kind: ProductEventKind::ProductUpdated(product),
        }
    }

    /// Builds a `PRODUCT_DELETED` event.
    #[must_use]
    pub fn deleted(metadata: EventMetadata, id: u64) -> Self {
        Self {
            metadata,
            kind: ProductEventKind::ProductDeleted(ProductDeleted { id }),
        }
    }

    /// Identifier of the product the event is about.
    #[must_use]
    pub fn product_id(&self) -> u64 {
        match &self.kind {
            ProductEventKind::ProductAdded(product) | ProductEventKind::ProductUpdated(product) => {
                product.id
            }
            ProductEventKind::ProductDeleted(deleted) => deleted.id,
        }
    }
}

impl DomainEvent for ProductEvent {
    fn event_type(&self) -> &'static str {
        match &self.kind {
            ProductEventKind::ProductAdded(_) => "PRODUCT_ADDED",
            ProductEventKind::ProductUpdated(_) => "PRODUCT_UPDATED",
            ProductEventKind::ProductDeleted(_) => "PRODUCT_DELETED",
        }
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }
}
