//! Tests for error types

use load_stagger::core::{ItemId, SchedulerError};

#[test]
fn test_invalid_config_error() {
    let err = SchedulerError::InvalidConfig("timeout_ms must be greater than 0".to_string());
    assert_eq!(
        format!("{}", err),
        "invalid configuration: timeout_ms must be greater than 0"
    );
}

#[test]
fn test_empty_batch_error() {
    assert_eq!(format!("{}", SchedulerError::EmptyBatch), "batch is empty");
}

#[test]
fn test_duplicate_item_error() {
    let err = SchedulerError::DuplicateItem(ItemId(42));
    assert_eq!(format!("{}", err), "item item-42 is already tracked");
}

#[test]
fn test_disposed_error() {
    assert_eq!(
        format!("{}", SchedulerError::Disposed),
        "scheduler has been disposed"
    );
}

#[test]
fn test_reentrant_reconfiguration_error() {
    assert_eq!(
        format!("{}", SchedulerError::ReentrantReconfiguration),
        "concurrency cap cannot change while a scheduler call is executing"
    );
}

#[test]
fn test_errors_convert_into_app_result() {
    fn fails() -> load_stagger::core::AppResult<()> {
        Err::<(), _>(SchedulerError::EmptyBatch)?;
        Ok(())
    }
    let err = fails().unwrap_err();
    assert_eq!(err.to_string(), "batch is empty");
}
