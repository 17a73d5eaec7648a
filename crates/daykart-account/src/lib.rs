//! DayKart storefront core: account preferences.
//!
//! Theme, signed-in user and the admin "orders visible" toggle. Each is a
//! small persisted value owned by one tab.

pub mod admin;
pub mod theme;
pub mod user;

pub use admin::{AdminSettings, ORDERS_VISIBILITY_SIGNAL};
pub use theme::{Theme, ThemePreference};
pub use user::{ADMIN_EMAIL, Role, User, UserSession};
