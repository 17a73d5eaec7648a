//! Bounded FIFO of recently published events.

use std::collections::VecDeque;

/// Ordered sequence of events capped at a fixed length.
///
/// Pushing beyond capacity evicts the oldest entries first.
#[derive(Debug, Clone)]
pub struct EventQueue<E> {
    events: VecDeque<E>,
    capacity: usize,
}

impl<E: Clone> EventQueue<E> {
    /// Creates an empty queue holding at most `capacity` events.
    ///
    /// A capacity of zero is raised to one.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends an event, returning how many old events were evicted.
    pub fn push(&mut self, event: E) -> usize {
        self.events.push_back(event);
        let mut evicted = 0;
        while self.events.len() > self.capacity {
            self.events.pop_front();
            evicted += 1;
        }
        evicted
    }

    /// Returns a copy of the current contents, oldest first.
    #[must_use]
    pub fn snapshot(&self) -> Vec<E> {
        self.events.iter().cloned().collect()
    }

    /// Iterates over the current contents, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &E> {
        self.events.iter()
    }

    /// Removes every queued event.
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Number of queued events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns `true` if nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Maximum number of events retained.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_within_capacity_keeps_everything_in_order() {
        let mut queue = EventQueue::new(3);

        assert_eq!(queue.push(1), 0);
        assert_eq!(queue.push(2), 0);

        assert_eq!(queue.snapshot(), vec![1, 2]);
    }

    #[test]
    fn test_push_beyond_capacity_evicts_oldest_first() {
        let mut queue = EventQueue::new(3);
        for n in 1..=3 {
            queue.push(n);
        }

        let evicted = queue.push(4);

        assert_eq!(evicted, 1);
        assert_eq!(queue.snapshot(), vec![2, 3, 4]);
        assert_eq!(queue.len(), queue.capacity());
    }

    #[test]
    fn test_capacity_one_hundred_keeps_most_recent_after_one_hundred_and_one_pushes() {
        let mut queue = EventQueue::new(100);

        for n in 0..101 {
            queue.push(n);
        }

        let contents = queue.snapshot();
        assert_eq!(contents.len(), 100);
        assert!(!contents.contains(&0));
        assert_eq!(contents.first(), Some(&1));
        assert_eq!(contents.last(), Some(&100));
    }

    #[test]
    fn test_zero_capacity_is_raised_to_one() {
        let mut queue = EventQueue::new(0);

        queue.push("a");
        queue.push("b");

        assert_eq!(queue.capacity(), 1);
        assert_eq!(queue.snapshot(), vec!["b"]);
    }

    #[test]
    fn test_clear_empties_queue() {
        let mut queue = EventQueue::new(4);
        queue.push(1);

        queue.clear();

        assert!(queue.is_empty());
    }
}
