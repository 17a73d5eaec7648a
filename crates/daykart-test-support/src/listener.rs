//! Listener that captures every event delivered to it.

use std::sync::{Arc, Mutex};

use daykart_core::error::DomainError;

/// Callback type accepted by `EventManager::subscribe`.
pub type BoxedCallback<E> = Box<dyn Fn(&E) -> Result<(), DomainError> + Send + Sync>;

/// Collects delivered events in arrival order.
#[derive(Debug)]
pub struct RecordingListener<E> {
    received: Arc<Mutex<Vec<E>>>,
}

impl<E: Clone + Send + 'static> RecordingListener<E> {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            received: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Returns a callback that appends each event to this recorder.
    ///
    /// # Panics
    ///
    /// The callback panics if the internal mutex is poisoned.
    #[must_use]
    pub fn callback(&self) -> BoxedCallback<E> {
        let received = Arc::clone(&self.received);
        Box::new(move |event: &E| {
            received.lock().unwrap().push(event.clone());
            Ok(())
        })
    }

    /// Returns a snapshot of the events received so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn received(&self) -> Vec<E> {
        self.received.lock().unwrap().clone()
    }

    /// Number of events received so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn count(&self) -> usize {
        self.received.lock().unwrap().len()
    }
}

impl<E: Clone + Send + 'static> Default for RecordingListener<E> {
    fn default() -> Self {
        Self::new()
    }
}
