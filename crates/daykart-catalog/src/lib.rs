//! DayKart storefront core: product catalog.
//!
//! Owns the product model, the typed product events published through the
//! event manager, and the derived catalog container that folds those events
//! into a persisted product list.

pub mod application;
pub mod domain;
pub mod seed;

pub use application::catalog::ProductCatalog;
pub use application::stats::{CatalogStats, CategoryCount};
pub use domain::events::{ProductDeleted, ProductEvent, ProductEventKind};
pub use domain::product::{Category, Product, ProductDraft, ProductPatch};
