//! Integration tests for storefront tabs sharing one store and channel.

mod common;

use std::sync::Arc;
use std::time::Duration;

use daykart_account::{ADMIN_EMAIL, Theme};
use daykart_catalog::{ProductEvent, ProductPatch};
use daykart_core::error::DomainError;
use daykart_core::storage::{KeyValueStore, keys};
use daykart_events::BroadcastChannel;
use daykart_notify::ConnectionStatus;
use daykart_storage::{FileStore, MemoryStore};

fn shared_store() -> Arc<dyn KeyValueStore> {
    Arc::new(MemoryStore::new())
}

#[test]
fn test_admin_changes_reach_the_shopper_tab() {
    // Arrange
    let store = shared_store();
    let channel = BroadcastChannel::new(16);
    let admin_tab = common::open_tab(&store, &channel);
    let shopper_tab = common::open_tab(&store, &channel);
    admin_tab.session().sign_in(ADMIN_EMAIL).unwrap();
    let admin = admin_tab.admin().unwrap();

    // Act
    let added = admin.add_product(common::desk_lamp()).unwrap();
    let updated = admin
        .update_product(
            added.id,
            ProductPatch {
                price: Some(39.0),
                ..ProductPatch::default()
            },
        )
        .unwrap();
    admin.delete_product(2).unwrap();
    let relayed = shopper_tab.sync();

    // Assert
    assert_eq!(relayed, 3);
    assert_eq!(shopper_tab.catalog().product(added.id), Some(updated));
    assert!(shopper_tab.catalog().product(2).is_none());
    assert_eq!(shopper_tab.catalog().products(), admin_tab.catalog().products());
    assert_eq!(shopper_tab.notifications().len(), 3);
    assert_eq!(shopper_tab.indicator().status(), ConnectionStatus::Active);
}

#[test]
fn test_shopper_notifications_are_newest_first() {
    // Arrange
    let store = shared_store();
    let channel = BroadcastChannel::new(16);
    let admin_tab = common::open_tab(&store, &channel);
    let shopper_tab = common::open_tab(&store, &channel);
    admin_tab.session().sign_in(ADMIN_EMAIL).unwrap();
    let admin = admin_tab.admin().unwrap();

    // Act
    admin.add_product(common::desk_lamp()).unwrap();
    admin.delete_product(3).unwrap();
    shopper_tab.sync();

    // Assert
    let messages: Vec<String> = shopper_tab
        .notifications()
        .notifications()
        .into_iter()
        .map(|n| n.message)
        .collect();
    assert_eq!(
        messages,
        vec![
            "Product deleted (ID: 3)".to_owned(),
            "New product added: Desk Lamp".to_owned(),
        ]
    );
}

#[test]
fn test_shopper_cannot_open_admin_console() {
    let store = shared_store();
    let channel = BroadcastChannel::new(16);
    let shopper_tab = common::open_tab(&store, &channel);
    shopper_tab.session().register("Sam", "sam@example.com").unwrap();

    let result = shopper_tab.admin();

    assert!(matches!(result, Err(DomainError::Forbidden(_))));
}

#[test]
fn test_orders_toggle_is_not_a_product_event() {
    // Arrange
    let store = shared_store();
    let channel = BroadcastChannel::new(16);
    let admin_tab = common::open_tab(&store, &channel);
    let shopper_tab = common::open_tab(&store, &channel);
    admin_tab.session().sign_in(ADMIN_EMAIL).unwrap();

    // Act
    let visible = admin_tab.admin().unwrap().toggle_orders_visible();
    let relayed = shopper_tab.sync();

    // Assert
    assert!(visible);
    assert_eq!(relayed, 0);
    assert!(shopper_tab.notifications().is_empty());
    assert_eq!(
        store.get(keys::ADMIN_ORDERS_VISIBLE).unwrap().as_deref(),
        Some("true")
    );
}

#[test]
fn test_closed_tab_ignores_sibling_events() {
    // Arrange
    let store = shared_store();
    let channel = BroadcastChannel::new(16);
    let admin_tab = common::open_tab(&store, &channel);
    let shopper_tab = common::open_tab(&store, &channel);
    admin_tab.session().sign_in(ADMIN_EMAIL).unwrap();
    shopper_tab.close();

    // Act
    admin_tab.admin().unwrap().delete_product(4).unwrap();

    // Assert
    assert_eq!(shopper_tab.sync(), 0);
    assert!(shopper_tab.notifications().is_empty());
    assert!(shopper_tab.catalog().product(4).is_some());
}

#[test]
fn test_file_store_survives_reopen() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("daykart.json");
    let added = {
        let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::open(&path).unwrap());
        let tab = common::open_tab(&store, &BroadcastChannel::new(16));
        tab.session().sign_in(ADMIN_EMAIL).unwrap();
        tab.theme().set(Theme::Dark);
        tab.cart().add_to_cart(1, 2);
        let added = tab.admin().unwrap().add_product(common::desk_lamp()).unwrap();
        tab.close();
        added
    };

    // Act
    let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::open(&path).unwrap());
    let reopened = common::open_tab(&store, &BroadcastChannel::new(16));

    // Assert
    assert_eq!(reopened.catalog().product(added.id), Some(added));
    assert_eq!(reopened.theme().current(), Theme::Dark);
    assert_eq!(reopened.cart().cart_quantity(1), 2);
    assert!(reopened.session().is_admin());
    let mirrored: Vec<ProductEvent> = reopened.events().mirror().unwrap().recent().unwrap();
    assert_eq!(mirrored.len(), 1);
}

#[tokio::test]
async fn test_started_tabs_converge_in_the_background() {
    // Arrange
    let store = shared_store();
    let channel = BroadcastChannel::new(16);
    let admin_tab = common::open_tab(&store, &channel);
    let shopper_tab = common::open_tab(&store, &channel);
    assert!(admin_tab.start());
    assert!(shopper_tab.start());
    admin_tab.session().sign_in(ADMIN_EMAIL).unwrap();

    // Act
    let added = admin_tab
        .admin()
        .unwrap()
        .add_product(common::desk_lamp())
        .unwrap();
    let converged = tokio::time::timeout(Duration::from_secs(2), async {
        while shopper_tab.catalog().product(added.id).is_none() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await;

    // Assert
    assert!(converged.is_ok());
    assert_eq!(shopper_tab.notifications().len(), 1);
    assert!(!shopper_tab.start());
    admin_tab.close();
    shopper_tab.close();
}
