//! DayKart storefront core: shopping cart and wishlist.
//!
//! Local to one tab: cart and liked state are persisted under their own
//! keys but never published as events.

pub mod application;
pub mod domain;

pub use application::cart_like::CartLike;
pub use domain::cart::{CartEntry, CartLine, CartSummary};
