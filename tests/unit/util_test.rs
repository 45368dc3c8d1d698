//! Tests for utility functions

use std::time::Duration;

use load_stagger::util::clock::{now_ms, Clock, ManualClock, SystemClock};

#[test]
fn test_manual_clock_advances() {
    let clock = ManualClock::new();
    let start = clock.now();
    clock.advance(Duration::from_secs(3));
    assert_eq!(clock.now() - start, Duration::from_secs(3));
}

#[test]
fn test_manual_clock_never_goes_back() {
    let clock = ManualClock::new();
    let start = clock.now();
    clock.advance(Duration::from_secs(1));
    clock.set(start);
    assert_eq!(clock.now() - start, Duration::from_secs(1));
}

#[test]
fn test_system_clock_is_monotonic() {
    let a = SystemClock.now();
    let b = SystemClock.now();
    assert!(b >= a);
}

#[test]
fn test_now_ms_is_after_epoch() {
    assert!(now_ms() > 0);
}

#[test]
fn test_init_tracing_is_idempotent() {
    load_stagger::util::init_tracing();
    load_stagger::util::init_tracing();
    tracing::info!("tracing initialised twice without panicking");
}
