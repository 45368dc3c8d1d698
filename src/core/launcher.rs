//! Starting the external work behind an admitted item.

use std::future::Future;

use async_trait::async_trait;

use crate::core::item::WorkItem;

/// Begins the work for a dispatched item.
///
/// Fire-and-forget: the call must return promptly and report progress later
/// through the load tracker. It may also report synchronously, in which case
/// the scheduler is re-entered from inside `launch`.
pub trait WorkLauncher: Send + Sync {
    /// Start the item's work.
    fn launch(&self, item: &WorkItem);
}

impl<F> WorkLauncher for F
where
    F: Fn(&WorkItem) + Send + Sync,
{
    fn launch(&self, item: &WorkItem) {
        self(item);
    }
}

/// How a piece of work ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkOutcome {
    /// The work finished; the item is loaded.
    Completed,
    /// The work was abandoned; the item is back to unloaded.
    Aborted,
}

/// Async body of the work for one item, run by the runtime launcher.
///
/// # Example
///
/// ```rust,ignore
/// use async_trait::async_trait;
/// use load_stagger::core::{ItemExecutor, WorkItem, WorkOutcome};
///
/// #[derive(Clone)]
/// struct Fetcher;
///
/// #[async_trait]
/// impl ItemExecutor for Fetcher {
///     async fn execute(&self, item: WorkItem) -> WorkOutcome {
///         fetch(item.id).await;
///         WorkOutcome::Completed
///     }
/// }
/// ```
#[async_trait]
pub trait ItemExecutor: Send + Sync + Clone + 'static {
    /// Perform the work for `item`.
    async fn execute(&self, item: WorkItem) -> WorkOutcome;
}

/// Spawner abstraction so launchers stay runtime-agnostic.
pub trait Spawn {
    /// Spawn a detached task.
    fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static;
}
