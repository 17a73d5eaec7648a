//! Toast notifications for product changes.
//!
//! Each product event becomes a short-lived notification. At most
//! `MAX_NOTIFICATIONS` are kept, newest first, and each expires after the
//! configured time-to-live unless dismissed earlier.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use daykart_catalog::{ProductEvent, ProductEventKind};
use daykart_core::clock::Clock;
use daykart_core::event::DomainEvent;
use daykart_events::{EventManager, Subscription};
use serde::Serialize;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// Maximum notifications shown at once.
pub const MAX_NOTIFICATIONS: usize = 5;

/// How long a notification stays up unless dismissed.
pub const DEFAULT_NOTIFICATION_TTL: Duration = Duration::from_secs(5);

/// One product notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// `"{TYPE}-{millis}-{event_id}"`, built from the event type, timestamp
    /// and event id.
    pub id: String,
    /// Event type, e.g. `PRODUCT_ADDED`.
    pub event_type: &'static str,
    /// The product the event is about.
    pub product_id: u64,
    /// Text shown to the user.
    pub message: String,
    /// When the event was created.
    pub occurred_at: DateTime<Utc>,
    /// When this tab received the event; expiry counts from here.
    pub received_at: DateTime<Utc>,
}

impl Notification {
    fn from_event(event: &ProductEvent, received_at: DateTime<Utc>) -> Self {
        let occurred_at = event.metadata().occurred_at;
        let message = match &event.kind {
            ProductEventKind::ProductAdded(product) => {
                format!("New product added: {}", product.name)
            }
            ProductEventKind::ProductUpdated(product) => {
                format!("Product updated: {}", product.name)
            }
            ProductEventKind::ProductDeleted(deleted) => {
                format!("Product deleted (ID: {})", deleted.id)
            }
        };
        Self {
            id: format!(
                "{}-{}-{}",
                event.event_type(),
                occurred_at.timestamp_millis(),
                event.metadata().event_id
            ),
            event_type: event.event_type(),
            product_id: event.product_id(),
            message,
            occurred_at,
            received_at,
        }
    }
}

struct CenterState {
    clock: Arc<dyn Clock>,
    ttl: TimeDelta,
    notifications: Mutex<VecDeque<Notification>>,
}

impl CenterState {
    fn notifications(&self) -> MutexGuard<'_, VecDeque<Notification>> {
        self.notifications
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn push(&self, notification: Notification) {
        let mut notifications = self.notifications();
        notifications.retain(|n| n.id != notification.id);
        notifications.push_front(notification);
        notifications.truncate(MAX_NOTIFICATIONS);
    }

    fn sweep(&self, now: DateTime<Utc>) -> usize {
        let mut notifications = self.notifications();
        let before = notifications.len();
        notifications.retain(|n| now - n.received_at < self.ttl);
        before - notifications.len()
    }
}

/// Product notifications for one tab.
pub struct NotificationCenter {
    state: Arc<CenterState>,
    subscription: Mutex<Option<Subscription>>,
}

impl NotificationCenter {
    /// Subscribes to `events`. Events already queued produce notifications
    /// before this returns.
    #[must_use]
    pub fn mount(events: &EventManager<ProductEvent>, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        let state = Arc::new(CenterState {
            clock,
            ttl: TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX),
            notifications: Mutex::new(VecDeque::with_capacity(MAX_NOTIFICATIONS)),
        });
        let listener_state = Arc::clone(&state);
        let subscription = events.subscribe(move |event: &ProductEvent| {
            let notification = Notification::from_event(event, listener_state.clock.now());
            tracing::debug!(id = %notification.id, "product notification raised");
            listener_state.push(notification);
            Ok(())
        });
        Self {
            state,
            subscription: Mutex::new(Some(subscription)),
        }
    }

    /// Current notifications, newest first.
    #[must_use]
    pub fn notifications(&self) -> Vec<Notification> {
        self.state.notifications().iter().cloned().collect()
    }

    /// Number of notifications shown.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.notifications().len()
    }

    /// Returns `true` if nothing is shown.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.notifications().is_empty()
    }

    /// Removes the notification with `id`. Returns `false` if it was already
    /// gone, whether dismissed or expired.
    pub fn dismiss(&self, id: &str) -> bool {
        let mut notifications = self.state.notifications();
        let before = notifications.len();
        notifications.retain(|n| n.id != id);
        notifications.len() != before
    }

    /// Removes notifications received at least one time-to-live before
    /// `now`. Returns how many were removed.
    pub fn sweep_expired(&self, now: DateTime<Utc>) -> usize {
        self.state.sweep(now)
    }

    /// Runs `sweep_expired` every `period` on the current tokio runtime.
    ///
    /// The task stops by itself once the center is dropped. Returns `None`
    /// when called outside a runtime.
    #[must_use]
    pub fn spawn_sweeper(&self, period: Duration) -> Option<JoinHandle<()>> {
        let runtime = Handle::try_current().ok()?;
        let state: Weak<CenterState> = Arc::downgrade(&self.state);
        let period = period.max(Duration::from_millis(1));
        Some(runtime.spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                let Some(state) = state.upgrade() else {
                    break;
                };
                let removed = state.sweep(state.clock.now());
                if removed > 0 {
                    tracing::trace!(removed, "expired product notifications");
                }
            }
        }))
    }

    /// Unsubscribes from the event stream. Returns `false` if already
    /// unmounted.
    pub fn unmount(&self) -> bool {
        let subscription = self
            .subscription
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        subscription.is_some_and(|subscription| subscription.unsubscribe())
    }
}

impl Drop for NotificationCenter {
    fn drop(&mut self) {
        self.unmount();
    }
}

impl fmt::Debug for NotificationCenter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationCenter")
            .field("shown", &self.len())
            .field("ttl", &self.state.ttl)
            .finish_non_exhaustive()
    }
}
