//! Runtime adapters and API surface.

pub mod api;
pub mod executor_launcher;
#[cfg(feature = "tokio-runtime")]
pub mod tokio_spawner;
#[cfg(feature = "tokio-runtime")]
pub mod tokio_timer;

pub use api::{health, submit_batch, BatchSubmission, Health, ItemRequest, SchedulerSnapshot};
pub use executor_launcher::ExecutorLauncher;
#[cfg(feature = "tokio-runtime")]
pub use tokio_spawner::TokioSpawner;
#[cfg(feature = "tokio-runtime")]
pub use tokio_timer::{TokioClock, TokioTimer};
