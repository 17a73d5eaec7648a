//! Minimal domain event for exercising the generic event machinery.

use daykart_core::event::{DomainEvent, EventMetadata};
use serde::{Deserialize, Serialize};

/// A labelled event with no domain meaning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestEvent {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Free-form label used in assertions.
    pub label: String,
}

impl TestEvent {
    /// Creates an event with the given metadata and label.
    #[must_use]
    pub fn new(metadata: EventMetadata, label: impl Into<String>) -> Self {
        Self {
            metadata,
            label: label.into(),
        }
    }
}

impl DomainEvent for TestEvent {
    fn event_type(&self) -> &'static str {
        "test.event"
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }
}
