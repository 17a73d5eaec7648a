//! Derived product container.
//!
//! Holds the product list for one tab. The list is loaded from storage (or
//! the seed list) at mount, kept in step with the event stream by folding
//! every product event, and persisted after each change. Admin mutations go
//! through `add_product`, `update_product` and `delete_product`, which
//! change local state and publish the matching event in one call.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use daykart_core::error::DomainError;
use daykart_core::event::DomainEvent;
use daykart_core::storage::{self, KeyValueStore, keys};
use daykart_events::{EventManager, Subscription};

use crate::application::stats::CatalogStats;
use crate::domain::events::{ProductEvent, ProductEventKind};
use crate::domain::product::{Category, Product, ProductDraft, ProductPatch};
use crate::seed;

struct CatalogState {
    store: Arc<dyn KeyValueStore>,
    products: Mutex<Vec<Product>>,
}

impl CatalogState {
    fn products(&self) -> MutexGuard<'_, Vec<Product>> {
        self.products.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, products: &[Product]) {
        storage::persist_or_log(self.store.as_ref(), keys::PRODUCTS, products);
    }

    /// Applies one event. Returns `true` if the product list changed.
    fn fold(&self, event: &ProductEvent) -> bool {
        let mut products = self.products();
        let changed = match &event.kind {
            ProductEventKind::ProductAdded(product) => {
                if products.iter().any(|p| p.id == product.id) {
                    false
                } else {
                    products.push(product.clone());
                    true
                }
            }
            ProductEventKind::ProductUpdated(updated) => {
                match products.iter_mut().find(|p| p.id == updated.id) {
                    Some(product) if *product != *updated => {
                        product.clone_from(updated);
                        true
                    }
                    _ => false,
                }
            }
            ProductEventKind::ProductDeleted(deleted) => {
                let before = products.len();
                products.retain(|p| p.id != deleted.id);
                products.len() != before
            }
        };
        if changed {
            self.persist(&products);
        }
        tracing::debug!(
            event_type = event.event_type(),
            product_id = event.product_id(),
            changed,
            "folded product event"
        );
        changed
    }
}

/// Product list for one tab, kept current by the product event stream.
pub struct ProductCatalog {
    state: Arc<CatalogState>,
    events: EventManager<ProductEvent>,
    subscription: Mutex<Option<Subscription>>,
}

impl ProductCatalog {
    /// Loads the catalog and subscribes it to `events`.
    ///
    /// Products come from the `products` key when it holds a decodable list,
    /// otherwise from the seed list. Events already queued in the manager are
    /// folded in before this returns.
    #[must_use]
    pub fn mount(events: EventManager<ProductEvent>, store: Arc<dyn KeyValueStore>) -> Self {
        let products: Vec<Product> =
            storage::load_or_else(store.as_ref(), keys::PRODUCTS, seed::products);
        tracing::info!(products = products.len(), "product catalog mounted");

        let state = Arc::new(CatalogState {
            store,
            products: Mutex::new(products),
        });
        let listener_state = Arc::clone(&state);
        let subscription = events.subscribe(move |event: &ProductEvent| {
            listener_state.fold(event);
            Ok(())
        });

        Self {
            state,
            events,
            subscription: Mutex::new(Some(subscription)),
        }
    }

    /// Unsubscribes from the event stream. The product list stays readable
    /// but no longer follows events. Returns `false` if already unmounted.
    pub fn unmount(&self) -> bool {
        let subscription = self
            .subscription
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match subscription {
            Some(subscription) => {
                subscription.unsubscribe();
                tracing::info!("product catalog unmounted");
                true
            }
            None => false,
        }
    }

    /// Returns `true` while the catalog follows the event stream.
    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.subscription
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(Subscription::is_active)
    }

    /// Snapshot of every product, in catalog order.
    #[must_use]
    pub fn products(&self) -> Vec<Product> {
        self.state.products().clone()
    }

    /// The product with `id`, if present.
    #[must_use]
    pub fn product(&self, id: u64) -> Option<Product> {
        self.state.products().iter().find(|p| p.id == id).cloned()
    }

    /// Products in `category`.
    #[must_use]
    pub fn by_category(&self, category: Category) -> Vec<Product> {
        self.state
            .products()
            .iter()
            .filter(|p| p.category == category)
            .cloned()
            .collect()
    }

    /// Products flagged as featured.
    #[must_use]
    pub fn featured(&self) -> Vec<Product> {
        self.state
            .products()
            .iter()
            .filter(|p| p.featured)
            .cloned()
            .collect()
    }

    /// Number of products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.products().len()
    }

    /// Returns `true` if the catalog holds no product.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.products().is_empty()
    }

    /// Aggregate figures for the admin dashboard.
    #[must_use]
    pub fn stats(&self) -> CatalogStats {
        CatalogStats::from_products(&self.state.products())
    }

    /// Adds a product built from `draft` and publishes `PRODUCT_ADDED`.
    ///
    /// The new id is one more than the largest existing id, or 1 for an
    /// empty catalog.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the draft is incomplete or the
    /// largest existing id is `u64::MAX`. Nothing is published in that case.
    #[tracing::instrument(skip_all, fields(name = %draft.name))]
    pub fn add_product(&self, draft: ProductDraft) -> Result<Product, DomainError> {
        let draft = draft.normalized();
        draft.validate()?;

        let product = {
            let mut products = self.state.products();
            let id = products
                .iter()
                .map(|p| p.id)
                .max()
                .unwrap_or(0)
                .checked_add(1)
                .ok_or_else(|| DomainError::Validation("no product id left to assign".to_owned()))?;
            let product = draft.into_product(id);
            products.push(product.clone());
            self.state.persist(&products);
            product
        };

        tracing::info!(product_id = product.id, "product added");
        self.events
            .publish(ProductEvent::added(self.events.stamp(), product.clone()));
        Ok(product)
    }

    /// Merges `patch` into the product with `id` and publishes
    /// `PRODUCT_UPDATED` carrying the full merged product, so a tab that
    /// missed earlier updates still converges.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ProductNotFound` if no product has `id`, or
    /// `DomainError::Validation` if the patch sets an invalid value. Nothing
    /// is published in either case.
    #[tracing::instrument(skip(self, patch))]
    pub fn update_product(&self, id: u64, patch: ProductPatch) -> Result<Product, DomainError> {
        patch.validate()?;

        let updated = {
            let mut products = self.state.products();
            let product = products
                .iter_mut()
                .find(|p| p.id == id)
                .ok_or(DomainError::ProductNotFound(id))?;
            patch.apply_to(product);
            let updated = product.clone();
            self.state.persist(&products);
            updated
        };

        tracing::info!(product_id = id, "product updated");
        self.events
            .publish(ProductEvent::updated(self.events.stamp(), updated.clone()));
        Ok(updated)
    }

    /// Removes the product with `id` and publishes `PRODUCT_DELETED`.
    ///
    /// Cart and wishlist entries for the product are left alone.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ProductNotFound` if no product has `id`. Nothing
    /// is published in that case.
    #[tracing::instrument(skip(self))]
    pub fn delete_product(&self, id: u64) -> Result<(), DomainError> {
        {
            let mut products = self.state.products();
            let index = products
                .iter()
                .position(|p| p.id == id)
                .ok_or(DomainError::ProductNotFound(id))?;
            products.remove(index);
            self.state.persist(&products);
        }

        tracing::info!(product_id = id, "product deleted");
        self.events
            .publish(ProductEvent::deleted(self.events.stamp(), id));
        Ok(())
    }
}

impl Drop for ProductCatalog {
    fn drop(&mut self) {
        self.unmount();
    }
}

impl fmt::Debug for ProductCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProductCatalog")
            .field("products", &self.len())
            .field("mounted", &self.is_mounted())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{TimeZone, Utc};
    use daykart_core::clock::Clock;
    use daykart_events::EventManagerConfig;
    use daykart_test_support::{FailingStore, FixedClock, RecordingListener, RecordingStore};

    use super::*;

    fn manager() -> EventManager<ProductEvent> {
        let clock: Arc<dyn Clock> =
            Arc::new(FixedClock(Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap()));
        EventManager::local(EventManagerConfig::default(), clock)
    }

    fn desk_lamp() -> ProductDraft {
        ProductDraft::new(
            "Desk Lamp",
            "Adjustable LED desk lamp.",
            49.0,
            "https://example.com/lamp.jpg",
            Category::Dorm,
        )
    }

    fn product(id: u64) -> Product {
        desk_lamp().into_product(id)
    }

    #[test]
    fn test_mount_without_stored_products_uses_seed() {
        let store = Arc::new(RecordingStore::new());

        let catalog = ProductCatalog::mount(manager(), store);

        assert_eq!(catalog.len(), 5);
        assert!(catalog.product(1).is_some());
    }

    #[test]
    fn test_mount_loads_stored_products() {
        // Arrange
        let stored = serde_json::to_string(&vec![product(42)]).unwrap();
        let store = Arc::new(RecordingStore::with_entries([(keys::PRODUCTS, stored.as_str())]));

        // Act
        let catalog = ProductCatalog::mount(manager(), store);

        // Assert
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.products()[0].id, 42);
    }

    #[test]
    fn test_mount_with_corrupt_products_falls_back_to_seed() {
        let store = Arc::new(RecordingStore::with_entries([(keys::PRODUCTS, "[{\"id\": ")]));

        let catalog = ProductCatalog::mount(manager(), store);

        assert_eq!(catalog.products(), seed::products());
    }

    #[test]
    fn test_mount_folds_queued_events() {
        // Arrange
        let events = manager();
        events.publish(ProductEvent::deleted(events.stamp(), 2));

        // Act
        let catalog = ProductCatalog::mount(events, Arc::new(RecordingStore::new()));

        // Assert
        assert_eq!(catalog.len(), 4);
        assert!(catalog.product(2).is_none());
    }

    #[test]
    fn test_product_added_event_appends_once() {
        // Arrange
        let events = manager();
        let store = Arc::new(RecordingStore::new());
        let catalog = ProductCatalog::mount(events.clone(), store.clone());

        // Act
        events.publish(ProductEvent::added(events.stamp(), product(10)));
        let after_first = catalog.len();
        events.publish(ProductEvent::added(events.stamp(), product(10)));

        // Assert
        assert_eq!(after_first, 6);
        assert_eq!(catalog.len(), 6);
        assert!(catalog.product(10).is_some());
        assert_eq!(store.writes_to(keys::PRODUCTS), 1);
    }

    #[test]
    fn test_product_updated_event_replaces_matching_record() {
        // Arrange
        let events = manager();
        let store = Arc::new(RecordingStore::new());
        let catalog = ProductCatalog::mount(events.clone(), store.clone());
        let mut mattress = catalog.product(1).unwrap();
        mattress.price = 749.0;

        // Act
        events.publish(ProductEvent::updated(events.stamp(), mattress.clone()));
        events.publish(ProductEvent::updated(events.stamp(), mattress.clone()));

        // Assert
        let stored = catalog.product(1).unwrap();
        assert_eq!(stored, mattress);
        assert_eq!(stored.name, "Luxury Memory Foam Mattress");
        assert_eq!(stored.original_price, Some(1199.0));
        assert_eq!(catalog.product(2), seed::products().into_iter().find(|p| p.id == 2));
        assert_eq!(store.writes_to(keys::PRODUCTS), 1);
    }

    #[test]
    fn test_events_for_unknown_ids_are_no_ops() {
        // Arrange
        let events = manager();
        let store = Arc::new(RecordingStore::new());
        let catalog = ProductCatalog::mount(events.clone(), store.clone());

        // Act
        events.publish(ProductEvent::updated(events.stamp(), product(99)));
        events.publish(ProductEvent::deleted(events.stamp(), 99));

        // Assert
        assert_eq!(catalog.products(), seed::products());
        assert_eq!(store.writes_to(keys::PRODUCTS), 0);
    }

    #[test]
    fn test_add_product_assigns_next_id_and_publishes() {
        // Arrange
        let events = manager();
        let store = Arc::new(RecordingStore::new());
        let catalog = ProductCatalog::mount(events.clone(), store.clone());
        let recorder = RecordingListener::new();
        let _subscription = events.subscribe(recorder.callback());

        // Act
        let added = catalog.add_product(desk_lamp()).unwrap();

        // Assert
        assert_eq!(added.id, 6);
        assert_eq!(catalog.len(), 6);
        let received = recorder.received();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].kind, ProductEventKind::ProductAdded(added.clone()));
        assert_eq!(received[0].metadata.origin, events.context_id());
        assert_eq!(store.writes_to(keys::PRODUCTS), 1);
    }

    #[test]
    fn test_add_product_into_empty_catalog_starts_at_one() {
        let store = Arc::new(RecordingStore::with_entries([(keys::PRODUCTS, "[]")]));
        let catalog = ProductCatalog::mount(manager(), store);

        let added = catalog.add_product(desk_lamp()).unwrap();

        assert_eq!(added.id, 1);
    }

    #[test]
    fn test_add_product_rejects_invalid_draft_without_publishing() {
        // Arrange
        let events = manager();
        let catalog = ProductCatalog::mount(events.clone(), Arc::new(RecordingStore::new()));
        let mut draft = desk_lamp();
        draft.image = String::new();

        // Act
        let result = catalog.add_product(draft);

        // Assert
        assert!(matches!(result, Err(DomainError::Validation(_))));
        assert_eq!(catalog.len(), 5);
        assert!(events.queued_events().is_empty());
    }

    #[test]
    fn test_update_product_publishes_merged_product() {
        // Arrange
        let events = manager();
        let catalog = ProductCatalog::mount(events.clone(), Arc::new(RecordingStore::new()));
        let patch = ProductPatch {
            name: Some("Fountain Pen Deluxe".to_owned()),
            ..ProductPatch::default()
        };

        // Act
        let updated = catalog.update_product(2, patch).unwrap();

        // Assert
        assert_eq!(updated.name, "Fountain Pen Deluxe");
        assert_eq!(updated.price, 149.0);
        let queued = events.queued_events();
        assert_eq!(queued.len(), 1);
        assert_eq!(queued[0].kind, ProductEventKind::ProductUpdated(updated));
    }

    #[test]
    fn test_add_product_after_largest_id_is_rejected() {
        // Arrange
        let events = manager();
        let catalog = ProductCatalog::mount(events.clone(), Arc::new(RecordingStore::new()));
        events.publish(ProductEvent::added(events.stamp(), product(u64::MAX)));
        let queued_before = events.queued_events().len();

        // Act
        let result = catalog.add_product(desk_lamp());

        // Assert
        assert!(matches!(result, Err(DomainError::Validation(_))));
        assert_eq!(catalog.len(), 6);
        assert_eq!(events.queued_events().len(), queued_before);
    }

    #[test]
    fn test_update_unknown_product_returns_not_found_without_publishing() {
        let events = manager();
        let catalog = ProductCatalog::mount(events.clone(), Arc::new(RecordingStore::new()));

        let result = catalog.update_product(77, ProductPatch::default());

        assert!(matches!(result, Err(DomainError::ProductNotFound(77))));
        assert!(events.queued_events().is_empty());
    }

    #[test]
    fn test_delete_product_removes_and_publishes() {
        // Arrange
        let events = manager();
        let catalog = ProductCatalog::mount(events.clone(), Arc::new(RecordingStore::new()));

        // Act
        catalog.delete_product(3).unwrap();

        // Assert
        assert!(catalog.product(3).is_none());
        assert_eq!(catalog.len(), 4);
        assert_eq!(events.queued_events()[0].product_id(), 3);
    }

    #[test]
    fn test_delete_unknown_product_returns_not_found() {
        let events = manager();
        let catalog = ProductCatalog::mount(events.clone(), Arc::new(RecordingStore::new()));

        let result = catalog.delete_product(3_000);

        assert!(matches!(result, Err(DomainError::ProductNotFound(3_000))));
        assert!(events.queued_events().is_empty());
    }

    #[test]
    fn test_mutations_reach_a_second_catalog_on_the_same_manager() {
        // Arrange
        let events = manager();
        let admin = ProductCatalog::mount(events.clone(), Arc::new(RecordingStore::new()));
        let shop = ProductCatalog::mount(events.clone(), Arc::new(RecordingStore::new()));

        // Act
        let added = admin.add_product(desk_lamp()).unwrap();
        admin.delete_product(1).unwrap();

        // Assert
        assert_eq!(shop.product(added.id), Some(added));
        assert!(shop.product(1).is_none());
        assert_eq!(shop.products(), admin.products());
    }

    #[test]
    fn test_unmount_stops_following_events() {
        // Arrange
        let events = manager();
        let catalog = ProductCatalog::mount(events.clone(), Arc::new(RecordingStore::new()));

        // Act
        let first = catalog.unmount();
        let second = catalog.unmount();
        events.publish(ProductEvent::deleted(events.stamp(), 1));

        // Assert
        assert!(first);
        assert!(!second);
        assert!(!catalog.is_mounted());
        assert!(catalog.product(1).is_some());
        assert_eq!(events.listener_count(), 0);
    }

    #[test]
    fn test_drop_unsubscribes_catalog() {
        let events = manager();
        let catalog = ProductCatalog::mount(events.clone(), Arc::new(RecordingStore::new()));
        assert_eq!(events.listener_count(), 1);

        drop(catalog);

        assert_eq!(events.listener_count(), 0);
    }

    #[test]
    fn test_storage_failure_keeps_in_memory_state() {
        // Arrange
        let events = manager();
        let catalog = ProductCatalog::mount(events.clone(), Arc::new(FailingStore));

        // Act
        let added = catalog.add_product(desk_lamp()).unwrap();

        // Assert
        assert_eq!(catalog.len(), 6);
        assert_eq!(catalog.product(added.id), Some(added));
        assert_eq!(events.queued_events().len(), 1);
    }

    #[test]
    fn test_featured_and_by_category_filter_products() {
        let catalog = ProductCatalog::mount(manager(), Arc::new(RecordingStore::new()));

        let featured: Vec<u64> = catalog.featured().iter().map(|p| p.id).collect();
        let beds = catalog.by_category(Category::Beds);

        assert_eq!(featured, vec![1, 3, 5]);
        assert_eq!(beds.len(), 1);
        assert_eq!(beds[0].id, 1);
    }
}
