//! Launcher running item work through an [`ItemExecutor`].

use std::sync::Arc;

use tracing::debug;

use crate::core::{ItemExecutor, LoadState, Spawn, WorkItem, WorkLauncher, WorkOutcome};
use crate::infra::InMemoryLoadTracker;

/// Spawns one task per dispatched item and reports its progress to the
/// tracker: `loading` when the task starts, then `loaded` or `unloaded`
/// depending on the outcome.
pub struct ExecutorLauncher<E, S> {
    executor: E,
    spawner: S,
    tracker: Arc<InMemoryLoadTracker>,
}

impl<E, S> ExecutorLauncher<E, S> {
    /// Launcher reporting to `tracker`.
    pub const fn new(executor: E, spawner: S, tracker: Arc<InMemoryLoadTracker>) -> Self {
        Self {
            executor,
            spawner,
            tracker,
        }
    }
}

impl<E, S> WorkLauncher for ExecutorLauncher<E, S>
where
    E: ItemExecutor,
    S: Spawn + Send + Sync,
{
    fn launch(&self, item: &WorkItem) {
        let executor = self.executor.clone();
        let tracker = Arc::clone(&self.tracker);
        let item = item.clone();
        self.spawner.spawn(async move {
            let id = item.id;
            tracker.transition(id, LoadState::Loading);
            let outcome = executor.execute(item).await;
            debug!(item = %id, ?outcome, "item work finished");
            let state = match outcome {
                WorkOutcome::Completed => LoadState::Loaded,
                WorkOutcome::Aborted => LoadState::Unloaded,
            };
            tracker.transition(id, state);
        });
    }
}
