//! Catalog container and read models.

pub mod catalog;
pub mod stats;
