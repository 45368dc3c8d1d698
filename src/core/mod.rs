//! Core scheduling abstractions, admission policy and the scheduler itself.

pub mod coordinator;
pub mod delegate;
pub mod error;
pub mod item;
pub mod launcher;
pub mod memory;
pub mod policy;
pub mod scheduler;
pub mod stats;
pub mod timer;
pub mod tracker;

pub use coordinator::{attach_batch, BatchCoordinator};
pub use delegate::{ConfiguredDelegate, Delegate};
pub use error::{AppResult, SchedulerError};
pub use item::{Disposition, ItemId, ItemPhase, LoadState, PressureLevel, WorkItem};
pub use launcher::{ItemExecutor, Spawn, WorkLauncher, WorkOutcome};
pub use memory::{MemoryMonitor, MemoryPressureObserver};
pub use policy::{
    AdmissionDecision, AdmissionPolicy, HostSignals, RejectReason, SystemSignals, UNBOUNDED,
};
pub use scheduler::{Collaborators, SchedulerSnapshot, WorkScheduler};
pub use stats::{InMemoryStatsSink, StatsAction, StatsEvent, StatsSink, TracingStatsSink};
pub use timer::{LivenessTimer, TimerTarget};
pub use tracker::{LoadObserver, LoadTracker, SubscriptionId};
