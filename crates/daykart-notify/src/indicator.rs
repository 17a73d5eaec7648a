//! Real-time activity indicator.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use daykart_catalog::ProductEvent;
use daykart_core::clock::Clock;
use daykart_events::{EventManager, Subscription};
use serde::Serialize;

/// How long the indicator shows activity after an event.
pub const ACTIVITY_WINDOW: Duration = Duration::from_secs(2);

/// What the indicator displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    /// Online, no event in the activity window.
    Idle,
    /// Online, an event arrived within the activity window.
    Active,
    /// Offline.
    Offline,
}

impl ConnectionStatus {
    /// Short label for display.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Idle | Self::Active => "Real-time",
            Self::Offline => "Offline",
        }
    }
}

struct IndicatorState {
    last_update: Mutex<Option<DateTime<Utc>>>,
    connected: AtomicBool,
}

/// Tracks when the last product event arrived and whether the tab is online.
pub struct ActivityIndicator {
    clock: Arc<dyn Clock>,
    state: Arc<IndicatorState>,
    subscription: Mutex<Option<Subscription>>,
}

impl ActivityIndicator {
    /// Subscribes to `events`. Starts connected.
    #[must_use]
    pub fn mount(events: &EventManager<ProductEvent>, clock: Arc<dyn Clock>) -> Self {
        let state = Arc::new(IndicatorState {
            last_update: Mutex::new(None),
            connected: AtomicBool::new(true),
        });
        let listener_state = Arc::clone(&state);
        let listener_clock = Arc::clone(&clock);
        let subscription = events.subscribe(move |_event: &ProductEvent| {
            *listener_state
                .last_update
                .lock()
                .unwrap_or_else(PoisonError::into_inner) = Some(listener_clock.now());
            Ok(())
        });
        Self {
            clock,
            state,
            subscription: Mutex::new(Some(subscription)),
        }
    }

    /// Stops tracking events. The last update stays readable. Returns
    /// `false` if already unmounted.
    pub fn unmount(&self) -> bool {
        let subscription = self
            .subscription
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        subscription.is_some_and(|subscription| subscription.unsubscribe())
    }

    /// When the last product event arrived.
    #[must_use]
    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        *self
            .state
            .last_update
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns `true` within `ACTIVITY_WINDOW` of the last event.
    #[must_use]
    pub fn has_recent_activity(&self) -> bool {
        let window = TimeDelta::from_std(ACTIVITY_WINDOW).unwrap_or(TimeDelta::MAX);
        self.last_update()
            .is_some_and(|last| self.clock.now() - last < window)
    }

    /// Records whether the tab is online.
    pub fn set_connected(&self, connected: bool) {
        let previous = self.state.connected.swap(connected, Ordering::SeqCst);
        if previous != connected {
            tracing::info!(connected, "connection status changed");
        }
    }

    /// Returns `true` while online.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.state.connected.load(Ordering::SeqCst)
    }

    /// The current display status.
    #[must_use]
    pub fn status(&self) -> ConnectionStatus {
        if !self.is_connected() {
            ConnectionStatus::Offline
        } else if self.has_recent_activity() {
            ConnectionStatus::Active
        } else {
            ConnectionStatus::Idle
        }
    }
}

impl Drop for ActivityIndicator {
    fn drop(&mut self) {
        self.unmount();
    }
}

impl fmt::Debug for ActivityIndicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActivityIndicator")
            .field("last_update", &self.last_update())
            .field("connected", &self.is_connected())
            .finish_non_exhaustive()
    }
}
