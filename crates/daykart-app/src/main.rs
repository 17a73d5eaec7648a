//! DayKart storefront demo entry point.
//!
//! Opens an admin tab and a shopper tab over one store and one broadcast
//! channel, runs a round of catalog changes in the admin tab, and waits for
//! the shopper tab to converge.

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use daykart_account::ADMIN_EMAIL;
use daykart_app::{AppConfig, Storefront, init_tracing, open_store};
use daykart_catalog::{Category, ProductDraft, ProductPatch};
use daykart_core::clock::{Clock, SystemClock};
use daykart_events::BroadcastChannel;

const CONVERGE_TIMEOUT: Duration = Duration::from_secs(2);
const POLL_INTERVAL: Duration = Duration::from_millis(10);

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = AppConfig::from_env()?;
    init_tracing(config.log_format)?;

    tracing::info!("Starting DayKart storefront");

    let store = open_store(&config)?;
    let channel = BroadcastChannel::new(config.broadcast_capacity);
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let admin_tab = Storefront::open(&config, Arc::clone(&store), channel.clone(), Arc::clone(&clock));
    let shopper_tab = Storefront::open(&config, store, channel, clock);
    admin_tab.start();
    shopper_tab.start();

    admin_tab.session().sign_in(ADMIN_EMAIL)?;
    let admin = admin_tab.admin()?;

    let added = admin.add_product(ProductDraft::new(
        "Linen Duvet Cover",
        "Stonewashed linen, breathable and soft.",
        149.0,
        "https://images.unsplash.com/photo-1505693416388-ac5ce068fe85",
        Category::Beds,
    ))?;
    let updated = admin.update_product(
        added.id,
        ProductPatch {
            price: Some(129.0),
            original_price: Some(Some(149.0)),
            ..ProductPatch::default()
        },
    )?;
    let retired = admin_tab
        .catalog()
        .products()
        .into_iter()
        .map(|product| product.id)
        .find(|&id| id != added.id);
    if let Some(id) = retired {
        admin.delete_product(id)?;
    }

    let converged = tokio::time::timeout(CONVERGE_TIMEOUT, async {
        loop {
            let catalog = shopper_tab.catalog();
            let retired_gone = retired.is_none_or(|id| catalog.product(id).is_none());
            if catalog.product(added.id).as_ref() == Some(&updated) && retired_gone {
                break;
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    })
    .await
    .is_ok();

    let stats = shopper_tab.catalog().stats();
    tracing::info!(
        converged,
        products = stats.total_products,
        total_value = stats.total_value,
        notifications = shopper_tab.notifications().len(),
        status = shopper_tab.indicator().status().label(),
        "shopper tab state"
    );
    for notification in shopper_tab.notifications().notifications() {
        tracing::info!(id = %notification.id, message = %notification.message, "notification");
    }

    admin_tab.close();
    shopper_tab.close();

    if !converged {
        return Err("shopper tab did not converge in time".into());
    }
    Ok(())
}
