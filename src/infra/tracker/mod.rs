//! Load tracker backends.

pub mod memory;

pub use memory::InMemoryLoadTracker;
