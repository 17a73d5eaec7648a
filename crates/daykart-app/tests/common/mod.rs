//! Shared helpers for storefront integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use daykart_app::{AppConfig, Storefront};
use daykart_catalog::{Category, ProductDraft};
use daykart_core::clock::Clock;
use daykart_core::storage::KeyValueStore;
use daykart_events::BroadcastChannel;
use daykart_test_support::FixedClock;

/// Fixed timestamp used across storefront integration tests.
pub fn fixed_clock() -> Arc<dyn Clock> {
    Arc::new(FixedClock(
        Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap(),
    ))
}

/// Opens one tab over `store` and `channel` with default settings.
pub fn open_tab(store: &Arc<dyn KeyValueStore>, channel: &BroadcastChannel) -> Storefront {
    Storefront::open(
        &AppConfig::default(),
        Arc::clone(store),
        channel.clone(),
        fixed_clock(),
    )
}

/// A valid product draft.
pub fn desk_lamp() -> ProductDraft {
    ProductDraft::new(
        "Desk Lamp",
        "Adjustable brass lamp with a warm bulb.",
        45.0,
        "https://example.com/lamp.jpg",
        Category::Dorm,
    )
}
