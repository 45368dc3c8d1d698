//! Hand-driven timer for tests and embedders with their own event loop.

pub mod manual;

pub use manual::ManualTimer;
