//! # Load Stagger
//!
//! A bounded-concurrency admission scheduler for batches of deferred work.
//!
//! When a large batch of expensive work arrives at once (restoring many
//! documents, warming many caches, reconnecting many sessions), starting it
//! all immediately starves the host. This crate staggers it: items start in
//! submission order, a small number at a time, and each one is gated by a
//! configurable admission policy.
//!
//! ## Key Features
//!
//! - **Bounded concurrency**: the cap is derived from the platform delegate
//!   and from CPU cores, clamped to configured bounds
//! - **Exclusive phase**: only foreground items load until the first item
//!   completes
//! - **Liveness timer with backoff**: a stuck item never blocks the batch; each
//!   forced timeout doubles the next period
//! - **Admission policy**: item-count, free-memory, idle-age and priority-score
//!   thresholds decide which items are worth loading at all
//! - **Memory pressure**: any pressure signal stops loading and defers the rest
//! - **Reentrancy-safe**: collaborators may call back into the scheduler
//!   synchronously; it disposes itself only once the outermost call returns
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use load_stagger::builders::SchedulerBuilder;
//! use load_stagger::config::LoaderConfig;
//! use load_stagger::core::WorkItem;
//! use load_stagger::infra::InMemoryLoadTracker;
//! use load_stagger::runtime::{ExecutorLauncher, TokioClock, TokioSpawner, TokioTimer};
//!
//! let tracker = Arc::new(InMemoryLoadTracker::new());
//! let launcher = ExecutorLauncher::new(my_executor, TokioSpawner::current(), tracker.clone());
//! let coordinator = SchedulerBuilder::new(LoaderConfig::from_env()?)
//!     .tracker(tracker)
//!     .launcher(Arc::new(launcher))
//!     .timer(Arc::new(TokioTimer::current()))
//!     .clock(Arc::new(TokioClock))
//!     .into_coordinator();
//!
//! coordinator.submit(vec![WorkItem::priority(1), WorkItem::new(2), WorkItem::new(3)])?;
//! ```
//!
//! For complete scenarios, see `tests/scheduler_test.rs` and
//! `tests/runtime_test.rs`.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Core scheduling abstractions, admission policy and the scheduler.
pub mod core;
/// Configuration models for caps, timeouts and admission thresholds.
pub mod config;
/// Builders to construct schedulers from configuration.
pub mod builders;
/// Infrastructure adapters: in-memory trackers, pressure sources, timers.
pub mod infra;
/// Runtime adapters (tokio) and API surface.
pub mod runtime;
/// Shared utilities.
pub mod util;
