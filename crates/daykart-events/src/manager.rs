//! Event manager: bounded queue, listener fan-out, mirror and broadcast.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, Weak};

use chrono::{DateTime, TimeDelta, Utc};
use daykart_core::clock::Clock;
use daykart_core::error::DomainError;
use daykart_core::event::{DomainEvent, EventMetadata};
use daykart_core::storage::{KeyValueStore, keys};
use serde::Serialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::channel::{BroadcastChannel, BroadcastMessage};
use crate::mirror::EventMirror;
use crate::queue::EventQueue;
use crate::registry::{Listener, ListenerId, ListenerRegistry};
use crate::{DEFAULT_MIRROR_CAPACITY, DEFAULT_QUEUE_CAPACITY, PRODUCT_EVENT_SIGNAL, lock};

/// Tuning for one event manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventManagerConfig {
    /// Maximum events kept in memory for replay.
    pub queue_capacity: usize,
    /// Maximum events kept in the persisted mirror.
    pub mirror_capacity: usize,
    /// Storage key of the persisted mirror.
    pub mirror_key: String,
    /// Signal name used on the broadcast channel.
    pub signal: String,
}

impl Default for EventManagerConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            mirror_capacity: DEFAULT_MIRROR_CAPACITY,
            mirror_key: keys::PRODUCT_EVENTS.to_owned(),
            signal: PRODUCT_EVENT_SIGNAL.to_owned(),
        }
    }
}

/// How an event entered this manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delivery {
    /// Published in this tab; mirrored and broadcast.
    Local,
    /// Received from another tab; mirrored but never re-broadcast.
    Relayed,
}

struct State<E> {
    queue: EventQueue<E>,
    registry: ListenerRegistry<E>,
}

struct Inner<E> {
    context_id: Uuid,
    config: EventManagerConfig,
    clock: Arc<dyn Clock>,
    state: Mutex<State<E>>,
    last_stamp: Mutex<Option<DateTime<Utc>>>,
    mirror: Option<EventMirror>,
    channel: Option<BroadcastChannel>,
}

/// Publish-subscribe hub for one tab.
///
/// Cheap to clone; clones share the queue, listeners and context id. Each
/// tab constructs its own manager and passes it to the containers that need
/// it.
pub struct EventManager<E> {
    inner: Arc<Inner<E>>,
}

impl<E> Clone for EventManager<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E> fmt::Debug for EventManager<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventManager")
            .field("context_id", &self.inner.context_id)
            .field("config", &self.inner.config)
            .field("mirror", &self.inner.mirror)
            .field("broadcast", &self.inner.channel.is_some())
            .finish_non_exhaustive()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        *message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "non-string panic payload"
    }
}

fn invoke<E: DomainEvent>(id: ListenerId, listener: &Listener<E>, event: &E) {
    match panic::catch_unwind(AssertUnwindSafe(|| listener(event))) {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            tracing::error!(
                listener = ?id,
                event_type = event.event_type(),
                error = %e,
                "error in product event listener"
            );
        }
        Err(payload) => {
            tracing::error!(
                listener = ?id,
                event_type = event.event_type(),
                panic = panic_message(&*payload),
                "product event listener panicked"
            );
        }
    }
}

impl<E> EventManager<E>
where
    E: DomainEvent + Clone + Serialize + DeserializeOwned + 'static,
{
    /// Creates a manager for one tab.
    ///
    /// With a `store`, every published event is also appended to the
    /// persisted mirror. With a `channel`, every locally published event is
    /// posted to sibling tabs.
    #[must_use]
    pub fn new(
        config: EventManagerConfig,
        clock: Arc<dyn Clock>,
        store: Option<Arc<dyn KeyValueStore>>,
        channel: Option<BroadcastChannel>,
    ) -> Self {
        let mirror = store.map(|store| {
            EventMirror::new(store, config.mirror_key.clone(), config.mirror_capacity)
        });
        let context_id = Uuid::new_v4();
        tracing::debug!(%context_id, queue_capacity = config.queue_capacity, "event manager created");
        Self {
            inner: Arc::new(Inner {
                context_id,
                state: Mutex::new(State {
                    queue: EventQueue::new(config.queue_capacity),
                    registry: ListenerRegistry::new(),
                }),
                config,
                clock,
                last_stamp: Mutex::new(None),
                mirror,
                channel,
            }),
        }
    }

    /// Creates a manager with neither mirror nor broadcast.
    #[must_use]
    pub fn local(config: EventManagerConfig, clock: Arc<dyn Clock>) -> Self {
        Self::new(config, clock, None, None)
    }

    /// Identifier of this tab; stamped as `origin` on locally created events.
    #[must_use]
    pub fn context_id(&self) -> Uuid {
        self.inner.context_id
    }

    /// The configuration this manager was built with.
    #[must_use]
    pub fn config(&self) -> &EventManagerConfig {
        &self.inner.config
    }

    /// The persisted mirror, if this manager has one.
    #[must_use]
    pub fn mirror(&self) -> Option<&EventMirror> {
        self.inner.mirror.as_ref()
    }

    /// Creates metadata for a new event originating in this tab.
    ///
    /// Timestamps are strictly increasing: when the clock has not advanced
    /// past the previous stamp, the previous stamp plus one millisecond is
    /// used instead.
    #[must_use]
    pub fn stamp(&self) -> EventMetadata {
        let mut last = lock(&self.inner.last_stamp);
        let now = self.inner.clock.now();
        let occurred_at = match *last {
            Some(previous) if now <= previous => previous + TimeDelta::milliseconds(1),
            _ => now,
        };
        *last = Some(occurred_at);
        EventMetadata {
            event_id: Uuid::new_v4(),
            origin: self.inner.context_id,
            occurred_at,
        }
    }

    /// Publishes an event created in this tab.
    ///
    /// The event is queued (evicting the oldest beyond capacity), delivered
    /// to every listener registered when the call started, appended to the
    /// mirror, and posted to sibling tabs. A failing or panicking listener is
    /// logged and skipped; it never aborts the publish.
    pub fn publish(&self, event: E) {
        self.dispatch(&event, Delivery::Local);
    }

    /// Publishes an event received from another tab: queued, delivered and
    /// mirrored, but not posted back to the broadcast channel.
    pub(crate) fn publish_relayed(&self, event: E) {
        self.dispatch(&event, Delivery::Relayed);
    }

    fn dispatch(&self, event: &E, delivery: Delivery) {
        let listeners = {
            let mut state = lock(&self.inner.state);
            let evicted = state.queue.push(event.clone());
            if evicted > 0 {
                tracing::trace!(evicted, "event queue at capacity, evicted oldest");
            }
            state.registry.snapshot()
        };

        tracing::debug!(
            event_type = event.event_type(),
            event_id = %event.metadata().event_id,
            ?delivery,
            listeners = listeners.len(),
            "publishing event"
        );

        for (id, listener) in &listeners {
            invoke(*id, listener, event);
        }

        if let Some(mirror) = &self.inner.mirror {
            if let Err(e) = mirror.append(event) {
                tracing::error!(error = %e, "failed to persist product event");
            }
        }

        if delivery == Delivery::Local {
            self.broadcast(event);
        }
    }

    fn broadcast(&self, event: &E) {
        let Some(channel) = &self.inner.channel else {
            return;
        };
        let payload = match serde_json::to_value(event) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!(error = %e, "failed to encode product event for broadcast");
                return;
            }
        };
        channel.post(BroadcastMessage {
            origin: self.inner.context_id,
            signal: self.inner.config.signal.clone(),
            payload,
        });
    }

    /// Registers a listener and replays the queued events to it, oldest
    /// first, before returning.
    ///
    /// The returned `Subscription` deregisters the listener. Dropping it
    /// without calling `unsubscribe` leaves the listener registered.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&E) -> Result<(), DomainError> + Send + Sync + 'static,
    {
        let listener: Listener<E> = Arc::new(listener);
        let (id, backlog) = {
            let mut state = lock(&self.inner.state);
            let id = state.registry.add(Arc::clone(&listener));
            (id, state.queue.snapshot())
        };

        tracing::debug!(listener = ?id, replayed = backlog.len(), "listener subscribed");
        for event in &backlog {
            invoke(id, &listener, event);
        }

        let weak: Weak<Inner<E>> = Arc::downgrade(&self.inner);
        Subscription::new(id, move || {
            weak.upgrade()
                .is_some_and(|inner| lock(&inner.state).registry.remove(id))
        })
    }

    /// Returns a copy of the queued events, oldest first.
    #[must_use]
    pub fn queued_events(&self) -> Vec<E> {
        lock(&self.inner.state).queue.snapshot()
    }

    /// Drops every queued event. Later subscribers get no replay.
    pub fn clear_queue(&self) {
        lock(&self.inner.state).queue.clear();
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        lock(&self.inner.state).registry.len()
    }
}

/// Handle returned by `EventManager::subscribe`.
#[must_use = "dropping a Subscription keeps the listener registered; call unsubscribe to remove it"]
pub struct Subscription {
    id: ListenerId,
    detach: Mutex<Option<Box<dyn FnOnce() -> bool + Send>>>,
}

impl Subscription {
    fn new(id: ListenerId, detach: impl FnOnce() -> bool + Send + 'static) -> Self {
        Self {
            id,
            detach: Mutex::new(Some(Box::new(detach))),
        }
    }

    /// The registration this handle controls.
    #[must_use]
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Removes the listener. Returns `true` only for the call that actually
    /// removed it; later calls are no-ops.
    pub fn unsubscribe(&self) -> bool {
        let detach = lock(&self.detach).take();
        match detach {
            Some(detach) => {
                let removed = detach();
                tracing::debug!(listener = ?self.id, removed, "listener unsubscribed");
                removed
            }
            None => false,
        }
    }

    /// Returns `true` until `unsubscribe` has been called.
    #[must_use]
    pub fn is_active(&self) -> bool {
        lock(&self.detach).is_some()
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}
