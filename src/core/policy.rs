//! Admission policy.
//!
//! Two questions are answered here: how many items may load at once (the
//! concurrency cap) and whether one particular item may load at all. The cap
//! blends the configured bounds with the number of cores; per-item admission
//! runs an ordered list of rules where the first match wins.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::config::AdmissionConfig;
use crate::core::item::WorkItem;

/// Sentinel for "no concurrency limit".
pub const UNBOUNDED: usize = usize::MAX;

/// Resource signals read by the policy at decision time.
pub trait SystemSignals: Send + Sync {
    /// Number of logical cores available to the host.
    fn cpu_cores(&self) -> usize;
    /// Free system memory in MiB.
    fn free_memory_mib(&self) -> u64;
}

/// Signals for the current host.
///
/// Core count comes from `num_cpus`. Free memory is pushed in by the owner via
/// [`HostSignals::set_free_memory_mib`]; until then it reads as unlimited so
/// the memory rule never rejects on missing data.
#[derive(Debug)]
pub struct HostSignals {
    cores: usize,
    free_memory_mib: AtomicU64,
}

impl HostSignals {
    /// Signals for this machine.
    pub fn new() -> Self {
        Self {
            cores: num_cpus::get(),
            free_memory_mib: AtomicU64::new(u64::MAX),
        }
    }

    /// Signals with a fixed core count, for hosts that partition CPUs.
    pub fn with_cores(cores: usize) -> Self {
        Self {
            cores,
            free_memory_mib: AtomicU64::new(u64::MAX),
        }
    }

    /// Publish a fresh free-memory reading.
    pub fn set_free_memory_mib(&self, mib: u64) {
        self.free_memory_mib.store(mib, Ordering::Release);
    }
}

impl Default for HostSignals {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemSignals for HostSignals {
    fn cpu_cores(&self) -> usize {
        self.cores
    }

    fn free_memory_mib(&self) -> u64 {
        self.free_memory_mib.load(Ordering::Acquire)
    }
}

/// Why an item was turned away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// The batch already started its maximum number of items.
    MaxItemsReached,
    /// Not enough free memory for another item.
    InsufficientMemory,
    /// The item has been idle for longer than allowed.
    IdleTooLong,
    /// The item's score is below the threshold.
    ScoreTooLow,
}

/// Outcome of evaluating one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmissionDecision {
    /// Admitted because the minimum batch size is not met yet.
    AdmitGuaranteed,
    /// Admitted after every configured threshold passed (or policy disabled).
    Admit,
    /// Rejected by the named rule.
    Reject(RejectReason),
}

impl AdmissionDecision {
    /// True for either admit variant.
    pub const fn is_admit(self) -> bool {
        !matches!(self, Self::Reject(_))
    }
}

/// Decision logic gating whether and how many items may load.
///
/// Stateless apart from the number of items started so far.
pub struct AdmissionPolicy {
    params: AdmissionConfig,
    signals: Arc<dyn SystemSignals>,
    items_started: usize,
}

impl AdmissionPolicy {
    /// Create a policy over the given parameters and signal source.
    pub fn new(params: AdmissionConfig, signals: Arc<dyn SystemSignals>) -> Self {
        Self {
            params,
            signals,
            items_started: 0,
        }
    }

    /// Cap derived from resource units.
    ///
    /// `units_per_slot == 0` yields [`UNBOUNDED`] before the bounds apply. A
    /// non-zero `max_concurrent` caps the raw value and `min_concurrent` floors
    /// it. Callers guarantee `min_concurrent <= max_concurrent` when max is set.
    pub fn compute_concurrency_cap(
        min_concurrent: usize,
        max_concurrent: usize,
        units_per_slot: usize,
        available_units: usize,
    ) -> usize {
        let mut cap = if units_per_slot == 0 {
            UNBOUNDED
        } else {
            available_units / units_per_slot
        };
        if max_concurrent != 0 {
            cap = cap.min(max_concurrent);
        }
        cap.max(min_concurrent)
    }

    /// Whether the policy is switched on.
    pub const fn is_enabled(&self) -> bool {
        self.params.enabled
    }

    /// Parameters in force.
    pub const fn params(&self) -> &AdmissionConfig {
        &self.params
    }

    /// Global concurrency cap for the current host.
    pub fn concurrency_cap(&self) -> usize {
        if !self.params.enabled {
            return UNBOUNDED;
        }
        Self::compute_concurrency_cap(
            self.params.min_simultaneous_loads as usize,
            self.params.max_simultaneous_loads as usize,
            self.params.cores_per_simultaneous_load as usize,
            self.signals.cpu_cores(),
        )
    }

    /// Evaluate the ordered admission rules for `item` at `now`.
    pub fn evaluate(&self, item: &WorkItem, now: Instant) -> AdmissionDecision {
        if !self.params.enabled {
            return AdmissionDecision::Admit;
        }

        let params = &self.params;
        if self.items_started < params.min_items_to_load as usize {
            return AdmissionDecision::AdmitGuaranteed;
        }
        if params.max_items_to_load != 0 && self.items_started >= params.max_items_to_load as usize
        {
            return AdmissionDecision::Reject(RejectReason::MaxItemsReached);
        }
        if params.free_memory_mib_per_item != 0
            && self.signals.free_memory_mib() < u64::from(params.free_memory_mib_per_item)
        {
            return AdmissionDecision::Reject(RejectReason::InsufficientMemory);
        }
        if let (Some(max_idle), Some(last_active)) = (params.max_idle(), item.last_active) {
            if now.saturating_duration_since(last_active) > max_idle {
                return AdmissionDecision::Reject(RejectReason::IdleTooLong);
            }
        }
        if params.min_priority_score != 0 && item.priority_score < params.min_priority_score {
            return AdmissionDecision::Reject(RejectReason::ScoreTooLow);
        }
        AdmissionDecision::Admit
    }

    /// Whether `item` may be admitted at `now`.
    pub fn should_admit(&self, item: &WorkItem, now: Instant) -> bool {
        self.evaluate(item, now).is_admit()
    }

    /// Record that one more item started.
    pub fn notify_admitted(&mut self) {
        self.items_started += 1;
    }

    /// Items started so far.
    pub const fn items_started(&self) -> usize {
        self.items_started
    }
}

impl std::fmt::Debug for AdmissionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdmissionPolicy")
            .field("params", &self.params)
            .field("items_started", &self.items_started)
            .finish_non_exhaustive()
    }
}
