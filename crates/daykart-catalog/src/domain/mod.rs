//! Product domain model and events.

pub mod events;
pub mod product;
