//! Shared test mocks and utilities for the DayKart storefront core.

mod clock;
mod event;
mod listener;
mod store;

pub use clock::{FixedClock, ManualClock};
pub use event::TestEvent;
pub use listener::RecordingListener;
pub use store::{FailingStore, RecordingStore};
