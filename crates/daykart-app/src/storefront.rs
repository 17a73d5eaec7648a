//! One storefront tab and its admin console.
//!
//! A `Storefront` owns everything one tab needs: its event manager, the
//! relay that listens to sibling tabs, and every container. Tabs of the same
//! storefront share one key/value store and one broadcast channel.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use daykart_account::{AdminSettings, ThemePreference, UserSession};
use daykart_cart::CartLike;
use daykart_catalog::{CatalogStats, Product, ProductCatalog, ProductDraft, ProductEvent, ProductPatch};
use daykart_core::clock::Clock;
use daykart_core::error::DomainError;
use daykart_core::storage::KeyValueStore;
use daykart_events::{BroadcastChannel, CrossTabRelay, EventManager};
use daykart_notify::{ActivityIndicator, NotificationCenter};
use daykart_storage::{FileStore, MemoryStore};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::error::AppError;

/// How often expired notifications are swept once a tab is started.
const SWEEP_PERIOD: Duration = Duration::from_millis(500);

/// Opens the store selected by `config`: a `FileStore` when a storage path
/// is set, otherwise a fresh `MemoryStore`.
///
/// # Errors
///
/// Returns `AppError::Storage` if the storage file exists but cannot be read.
pub fn open_store(config: &AppConfig) -> Result<Arc<dyn KeyValueStore>, AppError> {
    match &config.storage_path {
        Some(path) => {
            tracing::info!(path = %path.display(), "using file store");
            Ok(Arc::new(FileStore::open(path.clone())?))
        }
        None => {
            tracing::info!("using in-memory store");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

/// One tab of the storefront.
pub struct Storefront {
    events: EventManager<ProductEvent>,
    relay: CrossTabRelay<ProductEvent>,
    catalog: ProductCatalog,
    cart: CartLike,
    theme: ThemePreference,
    session: UserSession,
    admin_settings: AdminSettings,
    notifications: NotificationCenter,
    indicator: ActivityIndicator,
    sweeper: Mutex<Option<JoinHandle<()>>>,
}

impl Storefront {
    /// Opens a tab over the shared `store` and `channel`.
    ///
    /// Nothing from sibling tabs is applied until `start` or `sync` is
    /// called.
    #[must_use]
    pub fn open(
        config: &AppConfig,
        store: Arc<dyn KeyValueStore>,
        channel: BroadcastChannel,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let events = EventManager::new(
            config.event_manager_config(),
            Arc::clone(&clock),
            Some(Arc::clone(&store)),
            Some(channel.clone()),
        );
        let relay = CrossTabRelay::attach(events.clone(), channel.subscribe());
        let catalog = ProductCatalog::mount(events.clone(), Arc::clone(&store));
        let notifications =
            NotificationCenter::mount(&events, Arc::clone(&clock), config.notification_ttl);
        let indicator = ActivityIndicator::mount(&events, Arc::clone(&clock));
        let admin_settings =
            AdminSettings::load(Arc::clone(&store)).with_channel(channel, events.context_id());

        tracing::info!(context_id = %events.context_id(), "storefront tab opened");
        Self {
            relay,
            catalog,
            cart: CartLike::load(Arc::clone(&store)),
            theme: ThemePreference::load(Arc::clone(&store)),
            session: UserSession::load(store, clock),
            admin_settings,
            notifications,
            indicator,
            events,
            sweeper: Mutex::new(None),
        }
    }

    /// Starts relaying sibling-tab events and sweeping expired notifications
    /// in the background. Returns `false` outside a tokio runtime or when
    /// already started.
    pub fn start(&self) -> bool {
        if !self.relay.start() {
            return false;
        }
        let sweeper = self.notifications.spawn_sweeper(SWEEP_PERIOD);
        *self.sweeper.lock().unwrap_or_else(PoisonError::into_inner) = sweeper;
        true
    }

    /// Applies every event sibling tabs have posted so far, without a
    /// runtime. Returns the number of events applied.
    pub fn sync(&self) -> usize {
        self.relay.pump()
    }

    /// Stops background work, detaches from sibling tabs and unmounts every
    /// event-driven container. Idempotent.
    pub fn close(&self) {
        self.relay.stop();
        if let Some(sweeper) = self
            .sweeper
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            sweeper.abort();
        }
        self.catalog.unmount();
        self.notifications.unmount();
        self.indicator.unmount();
        tracing::info!(context_id = %self.context_id(), "storefront tab closed");
    }

    /// Identifier of this tab.
    #[must_use]
    pub fn context_id(&self) -> Uuid {
        self.events.context_id()
    }

    /// The tab's event manager.
    #[must_use]
    pub fn events(&self) -> &EventManager<ProductEvent> {
        &self.events
    }

    /// The product catalog.
    #[must_use]
    pub fn catalog(&self) -> &ProductCatalog {
        &self.catalog
    }

    /// Cart and wishlist.
    #[must_use]
    pub fn cart(&self) -> &CartLike {
        &self.cart
    }

    /// Theme preference.
    #[must_use]
    pub fn theme(&self) -> &ThemePreference {
        &self.theme
    }

    /// Signed-in user.
    #[must_use]
    pub fn session(&self) -> &UserSession {
        &self.session
    }

    /// Product notifications.
    #[must_use]
    pub fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }

    /// Real-time activity indicator.
    #[must_use]
    pub fn indicator(&self) -> &ActivityIndicator {
        &self.indicator
    }

    /// The admin console, available only to an admin session.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Forbidden` if nobody is signed in or the user is
    /// not an admin.
    pub fn admin(&self) -> Result<AdminConsole<'_>, DomainError> {
        if self.session.is_admin() {
            Ok(AdminConsole { storefront: self })
        } else {
            Err(DomainError::Forbidden(
                "admin console requires an admin session".to_owned(),
            ))
        }
    }
}

impl Drop for Storefront {
    fn drop(&mut self) {
        if let Some(sweeper) = self
            .sweeper
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            sweeper.abort();
        }
    }
}

impl fmt::Debug for Storefront {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Storefront")
            .field("context_id", &self.context_id())
            .field("catalog", &self.catalog)
            .field("relay", &self.relay)
            .finish_non_exhaustive()
    }
}

/// Admin-only operations on a storefront tab.
pub struct AdminConsole<'a> {
    storefront: &'a Storefront,
}

impl AdminConsole<'_> {
    /// Adds a product and announces it to every tab.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the draft is incomplete.
    pub fn add_product(&self, draft: ProductDraft) -> Result<Product, DomainError> {
        self.storefront.catalog.add_product(draft)
    }

    /// Updates a product and announces the change to every tab.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ProductNotFound` for an unknown id, or
    /// `DomainError::Validation` for an invalid patch.
    pub fn update_product(&self, id: u64, patch: ProductPatch) -> Result<Product, DomainError> {
        self.storefront.catalog.update_product(id, patch)
    }

    /// Deletes a product and announces it to every tab.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ProductNotFound` for an unknown id.
    pub fn delete_product(&self, id: u64) -> Result<(), DomainError> {
        self.storefront.catalog.delete_product(id)
    }

    /// Dashboard figures.
    #[must_use]
    pub fn stats(&self) -> CatalogStats {
        self.storefront.catalog.stats()
    }

    /// Whether the orders panel is shown.
    #[must_use]
    pub fn orders_visible(&self) -> bool {
        self.storefront.admin_settings.orders_visible()
    }

    /// Flips the orders panel toggle and returns the new value.
    pub fn toggle_orders_visible(&self) -> bool {
        self.storefront.admin_settings.toggle_orders_visible()
    }
}

impl fmt::Debug for AdminConsole<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminConsole")
            .field("context_id", &self.storefront.context_id())
            .finish()
    }
}
