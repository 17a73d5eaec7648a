//! DayKart storefront core: product notifications and activity indicator.
//!
//! Both components subscribe to the product event stream and keep a small
//! amount of display state; neither persists anything.

pub mod indicator;
pub mod notifications;

pub use indicator::{ACTIVITY_WINDOW, ActivityIndicator, ConnectionStatus};
pub use notifications::{
    DEFAULT_NOTIFICATION_TTL, MAX_NOTIFICATIONS, Notification, NotificationCenter,
};
