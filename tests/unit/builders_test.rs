//! Tests for builder modules

use std::sync::Arc;

use load_stagger::builders::SchedulerBuilder;
use load_stagger::config::{LoaderConfig, TimeoutConfig};
use load_stagger::core::{SchedulerError, WorkItem};
use load_stagger::infra::{InMemoryLoadTracker, ManualTimer};

fn noop_launcher(_: &WorkItem) {}

#[test]
fn test_builder_keeps_config() {
    let config = LoaderConfig {
        max_simultaneous_loads: 3,
        ..LoaderConfig::default()
    };
    let builder = SchedulerBuilder::new(config.clone());
    assert_eq!(builder.config(), &config);
}

#[test]
fn test_builder_requires_collaborators() {
    let err = SchedulerBuilder::new(LoaderConfig::default())
        .tracker(Arc::new(InMemoryLoadTracker::new()))
        .timer(Arc::new(ManualTimer::new()))
        .build()
        .unwrap_err();
    assert_eq!(
        err,
        SchedulerError::InvalidConfig("work launcher is required".into())
    );
}

#[test]
fn test_builder_rejects_invalid_config() {
    let config = LoaderConfig {
        timeouts: TimeoutConfig {
            timeout_ms: 0,
            first_item_timeout_ms: 1,
        },
        ..LoaderConfig::default()
    };
    let err = SchedulerBuilder::new(config)
        .tracker(Arc::new(InMemoryLoadTracker::new()))
        .launcher(Arc::new(noop_launcher))
        .timer(Arc::new(ManualTimer::new()))
        .build()
        .unwrap_err();
    assert!(matches!(err, SchedulerError::InvalidConfig(_)));
}

#[test]
fn test_builder_defaults_resolve_cap_from_config() {
    let tracker = Arc::new(InMemoryLoadTracker::new());
    let config = LoaderConfig {
        max_simultaneous_loads: 1,
        ..LoaderConfig::default()
    };
    let scheduler = SchedulerBuilder::new(config)
        .tracker(tracker.clone())
        .launcher(Arc::new(noop_launcher))
        .timer(Arc::new(ManualTimer::new()))
        .build()
        .unwrap();

    assert_eq!(tracker.observer_count(), 1);
    scheduler.submit_batch(vec![WorkItem::priority(1)]).unwrap();
    assert_eq!(scheduler.concurrency_cap(), Some(1));
}

#[test]
fn test_cloned_builder_builds_independent_schedulers() {
    let tracker = Arc::new(InMemoryLoadTracker::new());
    let builder = SchedulerBuilder::new(LoaderConfig::default())
        .tracker(tracker.clone())
        .launcher(Arc::new(noop_launcher))
        .timer(Arc::new(ManualTimer::new()));

    let a = builder.clone().build().unwrap();
    let b = builder.build().unwrap();

    assert!(!Arc::ptr_eq(&a, &b));
    assert_eq!(tracker.observer_count(), 2);
}
