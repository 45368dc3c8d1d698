//! Shared fixtures for scheduler integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use load_stagger::builders::SchedulerBuilder;
use load_stagger::config::{AdmissionConfig, LoaderConfig, TimeoutConfig};
use load_stagger::core::{
    Delegate, InMemoryStatsSink, ItemId, LoadState, WorkItem, WorkLauncher, WorkScheduler,
};
use load_stagger::infra::{InMemoryLoadTracker, InMemoryPressureMonitor, ManualTimer};
use load_stagger::util::clock::ManualClock;

pub const TIMEOUT: Duration = Duration::from_secs(5);
pub const FIRST_ITEM_TIMEOUT: Duration = Duration::from_secs(60);

/// Delegate with a fixed cap and fixed periods.
pub struct FixedDelegate {
    pub cap: usize,
    pub started: AtomicUsize,
}

impl FixedDelegate {
    pub fn new(cap: usize) -> Self {
        Self {
            cap,
            started: AtomicUsize::new(0),
        }
    }

    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }
}

impl Delegate for FixedDelegate {
    fn notify_load_started(&self) {
        self.started.fetch_add(1, Ordering::SeqCst);
    }

    fn max_simultaneous_loads(&self) -> usize {
        self.cap
    }

    fn timeout_period(&self) -> Duration {
        TIMEOUT
    }

    fn first_item_timeout(&self) -> Duration {
        FIRST_ITEM_TIMEOUT
    }
}

/// Launcher that only records what it was asked to start.
#[derive(Default)]
pub struct RecordingLauncher {
    pub launched: Mutex<Vec<ItemId>>,
}

impl RecordingLauncher {
    pub fn launched(&self) -> Vec<ItemId> {
        self.launched.lock().clone()
    }
}

impl WorkLauncher for RecordingLauncher {
    fn launch(&self, item: &WorkItem) {
        self.launched.lock().push(item.id);
    }
}

pub fn test_config() -> LoaderConfig {
    LoaderConfig {
        max_simultaneous_loads: 0,
        scheduled_load_limit: 0,
        timeouts: TimeoutConfig {
            timeout_ms: 5_000,
            first_item_timeout_ms: 60_000,
        },
        admission: AdmissionConfig::permissive(),
    }
}

/// Everything a scheduler test needs, wired to hand-driven collaborators.
pub struct Harness {
    pub tracker: Arc<InMemoryLoadTracker>,
    pub timer: Arc<ManualTimer>,
    pub clock: Arc<ManualClock>,
    pub stats: Arc<InMemoryStatsSink>,
    pub memory: Arc<InMemoryPressureMonitor>,
    pub delegate: Arc<FixedDelegate>,
    pub launcher: Arc<RecordingLauncher>,
    pub scheduler: Arc<WorkScheduler>,
}

impl Harness {
    /// Recording launcher, permissive policy, platform cap `cap`.
    pub fn new(cap: usize) -> Self {
        Self::with_config(cap, test_config())
    }

    pub fn with_config(cap: usize, config: LoaderConfig) -> Self {
        let tracker = Arc::new(InMemoryLoadTracker::new());
        let timer = Arc::new(ManualTimer::new());
        let clock = Arc::new(ManualClock::new());
        let stats = Arc::new(InMemoryStatsSink::new(1024));
        let memory = Arc::new(InMemoryPressureMonitor::new());
        let delegate = Arc::new(FixedDelegate::new(cap));
        let launcher = Arc::new(RecordingLauncher::default());

        let scheduler = SchedulerBuilder::new(config)
            .tracker(tracker.clone())
            .launcher(launcher.clone())
            .timer(timer.clone())
            .clock(clock.clone())
            .stats(stats.clone())
            .memory_monitor(memory.clone())
            .delegate(delegate.clone())
            .build()
            .expect("valid test configuration");

        Self {
            tracker,
            timer,
            clock,
            stats,
            memory,
            delegate,
            launcher,
            scheduler,
        }
    }

    pub fn launched(&self) -> Vec<ItemId> {
        self.launcher.launched()
    }

    /// Report `id` as loading through the tracker.
    pub fn start(&self, id: u64) {
        self.tracker.transition(id, LoadState::Loading);
    }

    /// Report `id` as loaded through the tracker.
    pub fn finish(&self, id: u64) {
        self.tracker.transition(id, LoadState::Loaded);
    }

    /// Move the clock to the armed deadline and deliver the expiry.
    pub fn expire_timer(&self) {
        let deadline = self
            .scheduler
            .timer_deadline()
            .expect("timer should be armed");
        self.clock.set(deadline);
        assert!(self.timer.fire(), "timer target should run");
    }

    pub fn assert_invariants(&self) {
        self.scheduler
            .verify_invariants()
            .expect("scheduler invariants hold");
    }
}

pub fn ids(raw: &[u64]) -> Vec<ItemId> {
    raw.iter().copied().map(ItemId).collect()
}
