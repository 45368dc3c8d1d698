//! Error types for scheduler operations.

use thiserror::Error;

use crate::core::item::ItemId;

/// Errors produced by scheduler components.
///
/// Policy rejections, cancellations and stale tracker events are not errors;
/// they are normal scheduling outcomes and never surface here.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SchedulerError {
    /// Configuration or builder input is unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// A batch with no items was submitted.
    #[error("batch is empty")]
    EmptyBatch,
    /// The item is already tracked by this scheduler or repeated in the batch.
    #[error("item {0} is already tracked")]
    DuplicateItem(ItemId),
    /// The scheduler already drained and signalled disposal.
    #[error("scheduler has been disposed")]
    Disposed,
    /// Concurrency configuration was changed from inside a scheduler call.
    #[error("concurrency cap cannot change while a scheduler call is executing")]
    ReentrantReconfiguration,
    /// Internal bookkeeping no longer satisfies its invariants.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
