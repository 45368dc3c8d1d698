//! Platform delegate consulted by the scheduler.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::config::LoaderConfig;
use crate::core::item::WorkItem;
use crate::core::policy::{AdmissionPolicy, SystemSignals};
use crate::util::clock::Clock;

/// Platform-specific capabilities supplied to the scheduler.
pub trait Delegate: Send + Sync {
    /// Caller-side pre-filter, consulted before submission. The scheduler
    /// itself never calls this.
    fn should_load(&self, item: &WorkItem) -> bool {
        let _ = item;
        true
    }

    /// Invoked each time the scheduler counts an item as started.
    fn notify_load_started(&self);

    /// Platform concurrency cap. `0` means the delegate has no opinion.
    fn max_simultaneous_loads(&self) -> usize;

    /// Base liveness period once an item has completed.
    fn timeout_period(&self) -> Duration;

    /// Liveness period for the first item.
    fn first_item_timeout(&self) -> Duration;
}

/// Delegate driven entirely by [`LoaderConfig`].
pub struct ConfiguredDelegate {
    max_simultaneous_loads: usize,
    timeout: Duration,
    first_item_timeout: Duration,
    policy: Mutex<AdmissionPolicy>,
    clock: Arc<dyn Clock>,
    loads_started: AtomicUsize,
}

impl ConfiguredDelegate {
    /// Build from configuration. `should_load` runs a private copy of the
    /// admission policy so caller-side filtering matches scheduler admission.
    pub fn new(
        config: &LoaderConfig,
        signals: Arc<dyn SystemSignals>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            max_simultaneous_loads: config.max_simultaneous_loads as usize,
            timeout: config.timeouts.timeout(),
            first_item_timeout: config.timeouts.first_item_timeout(),
            policy: Mutex::new(AdmissionPolicy::new(config.admission.clone(), signals)),
            clock,
            loads_started: AtomicUsize::new(0),
        }
    }

    /// Loads reported through [`Delegate::notify_load_started`].
    pub fn loads_started(&self) -> usize {
        self.loads_started.load(Ordering::Acquire)
    }
}

impl Delegate for ConfiguredDelegate {
    fn should_load(&self, item: &WorkItem) -> bool {
        self.policy.lock().should_admit(item, self.clock.now())
    }

    fn notify_load_started(&self) {
        self.loads_started.fetch_add(1, Ordering::AcqRel);
        self.policy.lock().notify_admitted();
    }

    fn max_simultaneous_loads(&self) -> usize {
        self.max_simultaneous_loads
    }

    fn timeout_period(&self) -> Duration {
        self.timeout
    }

    fn first_item_timeout(&self) -> Duration {
        self.first_item_timeout
    }
}
