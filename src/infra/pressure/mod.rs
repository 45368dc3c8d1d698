//! Memory pressure sources.

pub mod memory;

pub use memory::InMemoryPressureMonitor;
