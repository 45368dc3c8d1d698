//! Configuration models for the scheduler, admission policy and timeouts.

pub mod loader;

pub use loader::{AdmissionConfig, LoaderConfig, TimeoutConfig, ENV_PREFIX};
