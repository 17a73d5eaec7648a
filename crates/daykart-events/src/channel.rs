//! Named broadcast signal shared between tabs.
//!
//! Every tab of one storefront holds a clone of the same `BroadcastChannel`.
//! `tokio::sync::broadcast` delivers a post to every receiver, the sender's
//! own included, so receivers filter on `BroadcastMessage::origin`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use uuid::Uuid;

/// Default number of messages a slow receiver may fall behind by.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// One cross-tab signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BroadcastMessage {
    /// Context id of the tab that posted the signal.
    pub origin: Uuid,
    /// Signal name, e.g. `productEventUpdate`.
    pub signal: String,
    /// JSON-encoded event.
    pub payload: serde_json::Value,
}

/// Sending side of the cross-tab signal.
#[derive(Debug, Clone)]
pub struct BroadcastChannel {
    tx: broadcast::Sender<BroadcastMessage>,
}

impl BroadcastChannel {
    /// Creates a channel buffering up to `capacity` undelivered messages per
    /// receiver.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Posts a message to every current receiver and returns how many
    /// receivers there were. Posting with no receivers is not an error.
    pub fn post(&self, message: BroadcastMessage) -> usize {
        match self.tx.send(message) {
            Ok(receivers) => receivers,
            Err(_) => {
                tracing::debug!("broadcast posted with no receivers");
                0
            }
        }
    }

    /// Opens a new receiver that sees every message posted from now on.
    #[must_use]
    pub fn subscribe(&self) -> BroadcastSubscriber {
        BroadcastSubscriber {
            rx: self.tx.subscribe(),
        }
    }

    /// Number of open receivers.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for BroadcastChannel {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }
}

/// Receiving side of a cross-tab signal.
///
/// Abstracted so the relay can run over another broadcast primitive.
#[async_trait]
pub trait SignalReceiver: Send {
    /// Waits for the next message. `None` once the channel is closed.
    async fn recv(&mut self) -> Option<BroadcastMessage>;

    /// Returns the next pending message without waiting.
    fn try_recv(&mut self) -> Option<BroadcastMessage>;
}

/// `SignalReceiver` over a `tokio::sync::broadcast` receiver.
#[derive(Debug)]
pub struct BroadcastSubscriber {
    rx: broadcast::Receiver<BroadcastMessage>,
}

#[async_trait]
impl SignalReceiver for BroadcastSubscriber {
    async fn recv(&mut self) -> Option<BroadcastMessage> {
        loop {
            match self.rx.recv().await {
                Ok(message) => return Some(message),
                Err(RecvError::Lagged(n)) => {
                    tracing::warn!("cross-tab receiver lagged, skipped {n} messages");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    fn try_recv(&mut self) -> Option<BroadcastMessage> {
        loop {
            match self.rx.try_recv() {
                Ok(message) => return Some(message),
                Err(TryRecvError::Lagged(n)) => {
                    tracing::warn!("cross-tab receiver lagged, skipped {n} messages");
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => return None,
            }
        }
    }
}
