//! DayKart storefront core: composition root.
//!
//! Wires the storefront containers of one tab around a shared key/value
//! store and broadcast channel, and provides configuration, logging setup
//! and the admin console.

pub mod config;
pub mod error;
pub mod storefront;
pub mod telemetry;

pub use config::{AppConfig, LogFormat};
pub use error::AppError;
pub use storefront::{AdminConsole, Storefront, open_store};
pub use telemetry::{DEFAULT_LOG_FILTER, init_tracing};
