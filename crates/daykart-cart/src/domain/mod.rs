//! Cart value types.

pub mod cart;
