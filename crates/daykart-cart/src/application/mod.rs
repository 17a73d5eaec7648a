//! Cart and wishlist container.

pub mod cart_like;
