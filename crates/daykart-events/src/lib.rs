//! DayKart Events: in-process publish-subscribe with cross-tab propagation.
//!
//! # Architecture
//!
//! Events flow from a publisher through the `EventManager` to every local
//! listener, then out to other tabs:
//! - `EventQueue`: bounded FIFO of recent events, replayed to new subscribers
//! - `ListenerRegistry`: registered callbacks, snapshotted per publish
//! - `EventMirror`: capped copy of recent events in the key/value store
//! - `BroadcastChannel`: named signal shared by every tab of a storefront
//! - `CrossTabRelay`: re-publishes events received from other tabs locally

use std::sync::{Mutex, MutexGuard, PoisonError};

pub mod channel;
pub mod manager;
pub mod mirror;
pub mod queue;
pub mod registry;
pub mod relay;

pub use channel::{
    BroadcastChannel, BroadcastMessage, BroadcastSubscriber, DEFAULT_CHANNEL_CAPACITY, SignalReceiver,
};
pub use manager::{EventManager, EventManagerConfig, Subscription};
pub use mirror::EventMirror;
pub use queue::EventQueue;
pub use registry::{Listener, ListenerId, ListenerRegistry};
pub use relay::CrossTabRelay;

/// Default capacity of the in-process event queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;

/// Default capacity of the persisted event mirror.
pub const DEFAULT_MIRROR_CAPACITY: usize = 50;

/// Signal name carried by product event broadcasts.
pub const PRODUCT_EVENT_SIGNAL: &str = "productEventUpdate";

/// Locks `mutex`, recovering the guard if a previous holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
