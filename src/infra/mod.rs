//! Infrastructure adapters: in-memory event sources and timers.

mod observers;
pub mod pressure;
pub mod timer;
pub mod tracker;

pub use pressure::InMemoryPressureMonitor;
pub use timer::ManualTimer;
pub use tracker::InMemoryLoadTracker;
