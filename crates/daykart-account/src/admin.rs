//! Admin "orders visible" toggle.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use daykart_core::storage::{KeyValueStore, keys};
use daykart_events::{BroadcastChannel, BroadcastMessage};
use uuid::Uuid;

/// Signal posted on the broadcast channel when the toggle changes.
pub const ORDERS_VISIBILITY_SIGNAL: &str = "ordersVisibilityChanged";

/// Whether the orders panel is shown, persisted as `"true"`/`"false"` under
/// `adminOrdersVisible`.
pub struct AdminSettings {
    store: Arc<dyn KeyValueStore>,
    orders_visible: AtomicBool,
    notify: Option<(BroadcastChannel, Uuid)>,
}

impl AdminSettings {
    /// Reads the stored toggle. Anything other than `"true"` means hidden.
    #[must_use]
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let visible = match store.get(keys::ADMIN_ORDERS_VISIBLE) {
            Ok(value) => value.as_deref() == Some("true"),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read orders visibility, hiding orders");
                false
            }
        };
        Self {
            store,
            orders_visible: AtomicBool::new(visible),
            notify: None,
        }
    }

    /// Also posts every change on `channel`, tagged with `origin`.
    #[must_use]
    pub fn with_channel(mut self, channel: BroadcastChannel, origin: Uuid) -> Self {
        self.notify = Some((channel, origin));
        self
    }

    /// Returns `true` if orders are shown.
    #[must_use]
    pub fn orders_visible(&self) -> bool {
        self.orders_visible.load(Ordering::SeqCst)
    }

    /// Sets and persists the toggle.
    pub fn set_orders_visible(&self, visible: bool) {
        self.orders_visible.store(visible, Ordering::SeqCst);
        if let Err(e) = self
            .store
            .set(keys::ADMIN_ORDERS_VISIBLE, visible.to_string())
        {
            tracing::warn!(error = %e, visible, "failed to persist orders visibility");
        }
        if let Some((channel, origin)) = &self.notify {
            channel.post(BroadcastMessage {
                origin: *origin,
                signal: ORDERS_VISIBILITY_SIGNAL.to_owned(),
                payload: serde_json::json!({ "visible": visible }),
            });
        }
        tracing::info!(visible, "orders visibility changed");
    }

    /// Flips the toggle and returns the new value.
    pub fn toggle_orders_visible(&self) -> bool {
        let visible = !self.orders_visible();
        self.set_orders_visible(visible);
        visible
    }
}

impl fmt::Debug for AdminSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminSettings")
            .field("orders_visible", &self.orders_visible())
            .field("broadcast", &self.notify.is_some())
            .finish_non_exhaustive()
    }
}
