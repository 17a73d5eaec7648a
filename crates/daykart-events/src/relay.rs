//! Cross-tab relay.
//!
//! Receives broadcast signals posted by sibling tabs and re-publishes the
//! carried event into the local `EventManager`. Two rules keep this free of
//! feedback loops: signals whose origin is this tab are dropped, and relayed
//! events are never posted back to the channel.

use std::fmt;
use std::sync::Mutex;

use daykart_core::event::DomainEvent;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::channel::{BroadcastMessage, SignalReceiver};
use crate::lock;
use crate::manager::EventManager;

/// Bridges a `SignalReceiver` into a local `EventManager`.
pub struct CrossTabRelay<E> {
    manager: EventManager<E>,
    receiver: Mutex<Option<Box<dyn SignalReceiver>>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl<E> CrossTabRelay<E>
where
    E: DomainEvent + Clone + Serialize + DeserializeOwned + 'static,
{
    /// Registers the relay on `receiver`. Nothing is relayed until `pump`
    /// or `start` is called.
    #[must_use]
    pub fn attach(manager: EventManager<E>, receiver: impl SignalReceiver + 'static) -> Self {
        tracing::debug!(context_id = %manager.context_id(), "cross-tab relay attached");
        Self {
            manager,
            receiver: Mutex::new(Some(Box::new(receiver))),
            task: Mutex::new(None),
        }
    }

    /// Relays every signal already waiting, without blocking. Returns the
    /// number of events re-published. Returns 0 once the relay has been
    /// started or stopped.
    pub fn pump(&self) -> usize {
        let mut guard = lock(&self.receiver);
        let Some(receiver) = guard.as_mut() else {
            return 0;
        };
        let mut relayed = 0;
        while let Some(message) = receiver.try_recv() {
            if relay_message(&self.manager, message) {
                relayed += 1;
            }
        }
        relayed
    }

    /// Spawns a task on the current tokio runtime that relays signals as
    /// they arrive. Returns `false` if already started, stopped, or called
    /// outside a runtime.
    pub fn start(&self) -> bool {
        let Ok(runtime) = Handle::try_current() else {
            tracing::warn!("cross-tab relay start requested outside a tokio runtime");
            return false;
        };
        let Some(mut receiver) = lock(&self.receiver).take() else {
            return false;
        };
        let manager = self.manager.clone();
        let task = runtime.spawn(async move {
            while let Some(message) = receiver.recv().await {
                relay_message(&manager, message);
            }
            tracing::debug!(context_id = %manager.context_id(), "cross-tab channel closed");
        });
        *lock(&self.task) = Some(task);
        true
    }

    /// Returns `true` while a spawned relay task is alive.
    #[must_use]
    pub fn is_running(&self) -> bool {
        lock(&self.task)
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    /// Deregisters the relay. Safe to call repeatedly or before `start`.
    pub fn stop(&self) {
        let receiver = lock(&self.receiver).take();
        let task = lock(&self.task).take();
        if let Some(task) = task {
            task.abort();
        }
        if receiver.is_some() {
            tracing::debug!(context_id = %self.manager.context_id(), "cross-tab relay stopped");
        }
    }
}

impl<E> Drop for CrossTabRelay<E> {
    fn drop(&mut self) {
        if let Some(task) = lock(&self.task).take() {
            task.abort();
        }
    }
}

impl<E> fmt::Debug for CrossTabRelay<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CrossTabRelay")
            .field("manager", &self.manager)
            .field("attached", &lock(&self.receiver).is_some())
            .field("spawned", &lock(&self.task).is_some())
            .finish()
    }
}

/// Re-publishes one signal locally. Returns `true` if an event was relayed.
fn relay_message<E>(manager: &EventManager<E>, message: BroadcastMessage) -> bool
where
    E: DomainEvent + Clone + Serialize + DeserializeOwned + 'static,
{
    if message.origin == manager.context_id() {
        return false;
    }
    if message.signal != manager.config().signal {
        tracing::trace!(signal = %message.signal, "ignoring unrelated cross-tab signal");
        return false;
    }
    match serde_json::from_value::<E>(message.payload) {
        Ok(event) => {
            tracing::debug!(
                origin = %message.origin,
                event_type = event.event_type(),
                "relaying event from another tab"
            );
            manager.publish_relayed(event);
            true
        }
        Err(e) => {
            tracing::warn!(origin = %message.origin, error = %e, "dropping undecodable cross-tab event");
            false
        }
    }
}
