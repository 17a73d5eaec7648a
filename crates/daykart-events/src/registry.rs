//! Listener registry.

use std::fmt;
use std::sync::Arc;

use daykart_core::error::DomainError;

/// Callback invoked with every delivered event.
pub type Listener<E> = Arc<dyn Fn(&E) -> Result<(), DomainError> + Send + Sync>;

/// Handle identifying one registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

/// Registered listeners in insertion order.
pub struct ListenerRegistry<E> {
    entries: Vec<(ListenerId, Listener<E>)>,
    next_id: u64,
}

impl<E> ListenerRegistry<E> {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 1,
        }
    }

    /// Registers a listener and returns its id.
    pub fn add(&mut self, listener: Listener<E>) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, listener));
        id
    }

    /// Removes a listener. Returns `false` if it was already gone.
    pub fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    /// Returns `true` if the listener is still registered.
    #[must_use]
    pub fn contains(&self, id: ListenerId) -> bool {
        self.entries.iter().any(|(entry_id, _)| *entry_id == id)
    }

    /// Copies the current listeners, in registration order, so a fan-out can
    /// run without holding the registry.
    #[must_use]
    pub fn snapshot(&self) -> Vec<(ListenerId, Listener<E>)> {
        self.entries.clone()
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no listener is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<E> Default for ListenerRegistry<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for ListenerRegistry<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("listeners", &self.entries.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> Listener<u32> {
        Arc::new(|_| Ok(()))
    }

    #[test]
    fn test_add_assigns_distinct_increasing_ids() {
        let mut registry = ListenerRegistry::new();

        let first = registry.add(noop());
        let second = registry.add(noop());

        assert!(first < second);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut registry = ListenerRegistry::new();
        let id = registry.add(noop());

        assert!(registry.remove(id));
        assert!(!registry.remove(id));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_remove_leaves_other_listeners_in_order() {
        let mut registry = ListenerRegistry::new();
        let a = registry.add(noop());
        let b = registry.add(noop());
        let c = registry.add(noop());

        registry.remove(b);

        let ids: Vec<ListenerId> = registry.snapshot().into_iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![a, c]);
    }

    #[test]
    fn test_snapshot_is_unaffected_by_later_removal() {
        let mut registry = ListenerRegistry::new();
        let id = registry.add(noop());
        let snapshot = registry.snapshot();

        registry.remove(id);

        assert_eq!(snapshot.len(), 1);
        assert!(!registry.contains(id));
    }
}
