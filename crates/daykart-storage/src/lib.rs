//! DayKart Storage: concrete `KeyValueStore` backends.
//!
//! `MemoryStore` lives for the process; `FileStore` keeps the same map in
//! memory and writes it through to a single JSON document on every change.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;
