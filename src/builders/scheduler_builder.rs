//! Builder to construct schedulers from configuration.

use std::sync::Arc;

use crate::config::LoaderConfig;
use crate::core::{
    AdmissionPolicy, BatchCoordinator, Collaborators, ConfiguredDelegate, Delegate, HostSignals,
    LivenessTimer, LoadTracker, MemoryMonitor, SchedulerError, StatsSink, SystemSignals,
    TracingStatsSink, WorkLauncher, WorkScheduler,
};
use crate::util::clock::{Clock, SystemClock};

/// Assembles a [`WorkScheduler`] from a [`LoaderConfig`] and its
/// collaborators.
///
/// The tracker, launcher and timer are required. Everything else falls back
/// to a config-driven default.
#[derive(Clone)]
pub struct SchedulerBuilder {
    config: LoaderConfig,
    tracker: Option<Arc<dyn LoadTracker>>,
    launcher: Option<Arc<dyn WorkLauncher>>,
    timer: Option<Arc<dyn LivenessTimer>>,
    delegate: Option<Arc<dyn Delegate>>,
    stats: Option<Arc<dyn StatsSink>>,
    clock: Option<Arc<dyn Clock>>,
    signals: Option<Arc<dyn SystemSignals>>,
    memory: Option<Arc<dyn MemoryMonitor>>,
}

impl SchedulerBuilder {
    /// Start from a configuration.
    pub fn new(config: LoaderConfig) -> Self {
        Self {
            config,
            tracker: None,
            launcher: None,
            timer: None,
            delegate: None,
            stats: None,
            clock: None,
            signals: None,
            memory: None,
        }
    }

    /// Configuration the scheduler will use.
    pub const fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Load-state tracker (required).
    #[must_use]
    pub fn tracker(mut self, tracker: Arc<dyn LoadTracker>) -> Self {
        self.tracker = Some(tracker);
        self
    }

    /// Work launcher (required).
    #[must_use]
    pub fn launcher(mut self, launcher: Arc<dyn WorkLauncher>) -> Self {
        self.launcher = Some(launcher);
        self
    }

    /// Liveness timer (required).
    #[must_use]
    pub fn timer(mut self, timer: Arc<dyn LivenessTimer>) -> Self {
        self.timer = Some(timer);
        self
    }

    /// Custom delegate. Defaults to a [`ConfiguredDelegate`].
    #[must_use]
    pub fn delegate(mut self, delegate: Arc<dyn Delegate>) -> Self {
        self.delegate = Some(delegate);
        self
    }

    /// Stats sink. Defaults to [`TracingStatsSink`].
    #[must_use]
    pub fn stats(mut self, stats: Arc<dyn StatsSink>) -> Self {
        self.stats = Some(stats);
        self
    }

    /// Time source. Defaults to [`SystemClock`].
    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Host signals for the admission policy. Defaults to [`HostSignals`].
    #[must_use]
    pub fn signals(mut self, signals: Arc<dyn SystemSignals>) -> Self {
        self.signals = Some(signals);
        self
    }

    /// Memory pressure source. Without one, only explicit signals apply.
    #[must_use]
    pub fn memory_monitor(mut self, monitor: Arc<dyn MemoryMonitor>) -> Self {
        self.memory = Some(monitor);
        self
    }

    /// Validate the configuration and build a subscribed scheduler.
    pub fn build(&self) -> Result<Arc<WorkScheduler>, SchedulerError> {
        self.config
            .validate()
            .map_err(SchedulerError::InvalidConfig)?;

        let tracker = required(self.tracker.as_ref(), "load tracker")?;
        let launcher = required(self.launcher.as_ref(), "work launcher")?;
        let timer = required(self.timer.as_ref(), "liveness timer")?;

        let clock: Arc<dyn Clock> = self
            .clock
            .clone()
            .unwrap_or_else(|| Arc::new(SystemClock));
        let signals: Arc<dyn SystemSignals> = self
            .signals
            .clone()
            .unwrap_or_else(|| Arc::new(HostSignals::new()));
        let delegate: Arc<dyn Delegate> = self.delegate.clone().unwrap_or_else(|| {
            Arc::new(ConfiguredDelegate::new(
                &self.config,
                Arc::clone(&signals),
                Arc::clone(&clock),
            ))
        });
        let stats: Arc<dyn StatsSink> = self
            .stats
            .clone()
            .unwrap_or_else(|| Arc::new(TracingStatsSink));

        let policy = AdmissionPolicy::new(self.config.admission.clone(), signals);
        let deps = Collaborators {
            delegate,
            tracker,
            launcher,
            stats,
            timer,
            clock,
            memory: self.memory.clone(),
        };
        Ok(WorkScheduler::new(
            policy,
            deps,
            self.config.scheduled_load_limit as usize,
        ))
    }

    /// Coordinator that builds a fresh scheduler from this builder whenever
    /// no scheduler is active.
    pub fn into_coordinator(self) -> BatchCoordinator {
        BatchCoordinator::new(move || self.build())
    }
}

fn required<T: ?Sized>(slot: Option<&Arc<T>>, what: &str) -> Result<Arc<T>, SchedulerError> {
    slot.cloned()
        .ok_or_else(|| SchedulerError::InvalidConfig(format!("{what} is required")))
}

impl std::fmt::Debug for SchedulerBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchedulerBuilder")
            .field("config", &self.config)
            .field("memory_monitor", &self.memory.is_some())
            .finish_non_exhaustive()
    }
}
