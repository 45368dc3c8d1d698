//! Attaching batches to a live scheduler.
//!
//! At most one scheduler is active per coordinator. A batch arriving while
//! one is active joins it; otherwise the factory builds a fresh one.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::core::error::SchedulerError;
use crate::core::item::{Disposition, WorkItem};
use crate::core::scheduler::WorkScheduler;

type SchedulerFactory = Box<dyn Fn() -> Result<Arc<WorkScheduler>, SchedulerError> + Send + Sync>;

/// Owns the currently active scheduler, if any.
pub struct BatchCoordinator {
    factory: SchedulerFactory,
    current: Mutex<Option<Arc<WorkScheduler>>>,
}

impl BatchCoordinator {
    /// Coordinator that builds schedulers with `factory`.
    pub fn new(
        factory: impl Fn() -> Result<Arc<WorkScheduler>, SchedulerError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            factory: Box::new(factory),
            current: Mutex::new(None),
        }
    }

    /// The active scheduler, if one exists and has not finished.
    pub fn current(&self) -> Option<Arc<WorkScheduler>> {
        self.current
            .lock()
            .as_ref()
            .filter(|s| !s.is_finished())
            .cloned()
    }

    /// Submit `items` to the active scheduler, creating one if needed.
    pub fn submit(&self, items: Vec<WorkItem>) -> Result<Arc<WorkScheduler>, SchedulerError> {
        if items.is_empty() {
            return Err(SchedulerError::EmptyBatch);
        }

        if let Some(active) = self.current() {
            match attach_batch(&active, items.clone()) {
                Ok(_) => return Ok(active),
                // Drained between the check and the attach.
                Err(SchedulerError::Disposed) => {}
                Err(err) => return Err(err),
            }
        }

        let scheduler = (self.factory)()?;
        debug!("starting a new scheduler");
        *self.current.lock() = Some(Arc::clone(&scheduler));
        scheduler.submit_batch(items)?;
        Ok(scheduler)
    }
}

impl std::fmt::Debug for BatchCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchCoordinator")
            .field("current", &self.current())
            .finish_non_exhaustive()
    }
}

/// Add a batch to a live scheduler.
pub fn attach_batch(
    scheduler: &WorkScheduler,
    items: Vec<WorkItem>,
) -> Result<Disposition, SchedulerError> {
    if scheduler.is_finished() {
        return Err(SchedulerError::Disposed);
    }
    scheduler.submit_batch(items)
}
