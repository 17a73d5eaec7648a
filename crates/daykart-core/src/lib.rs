//! DayKart Core: shared domain abstractions.
//!
//! This crate defines the traits and types every storefront container
//! depends on: time, errors, domain event metadata and the string-keyed
//! key/value storage seam. It contains no concrete storage backend.

pub mod clock;
pub mod error;
pub mod event;
pub mod storage;
