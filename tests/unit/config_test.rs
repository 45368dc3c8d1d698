//! Tests for configuration parsing and validation

use std::collections::HashMap;
use std::time::Duration;

use load_stagger::config::{AdmissionConfig, LoaderConfig};

#[test]
fn test_default_config_is_valid() {
    let config = LoaderConfig::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.timeouts.timeout(), Duration::from_secs(5));
    assert_eq!(config.timeouts.first_item_timeout(), Duration::from_secs(60));
    assert_eq!(config.admission.min_items_to_load, 4);
    assert_eq!(config.admission.max_items_to_load, 20);
}

#[test]
fn test_from_json_fills_missing_fields() {
    let config = LoaderConfig::from_json_str(
        r#"{ "max_simultaneous_loads": 3, "admission": { "min_priority_score": 0 } }"#,
    )
    .unwrap();

    assert_eq!(config.max_simultaneous_loads, 3);
    assert_eq!(config.admission.min_priority_score, 0);
    assert_eq!(config.admission.max_simultaneous_loads, 4);
    assert_eq!(config.timeouts.timeout_ms, 5_000);
}

#[test]
fn test_from_json_rejects_invalid_values() {
    let err = LoaderConfig::from_json_str(r#"{ "timeouts": { "timeout_ms": 0 } }"#).unwrap_err();
    assert!(err.contains("timeout_ms"));

    let err = LoaderConfig::from_json_str("{ not json").unwrap_err();
    assert!(err.starts_with("parse error"));
}

#[test]
fn test_admission_bounds_validation() {
    let inverted = AdmissionConfig {
        min_simultaneous_loads: 5,
        max_simultaneous_loads: 2,
        ..AdmissionConfig::default()
    };
    assert!(inverted.validate().is_err());

    // Thresholds are not checked while the policy is off.
    let disabled = AdmissionConfig {
        min_simultaneous_loads: 0,
        ..AdmissionConfig::disabled()
    };
    assert!(disabled.validate().is_ok());
}

#[test]
fn test_env_overrides() {
    let vars: HashMap<&str, &str> = HashMap::from([
        ("LOAD_STAGGER_MAX_SIMULTANEOUS_LOADS", "6"),
        ("LOAD_STAGGER_TIMEOUT_MS", "250"),
    ]);
    let mut config = LoaderConfig::default();
    config
        .apply_env(|key| vars.get(key).map(|v| (*v).to_string()))
        .unwrap();

    assert_eq!(config.max_simultaneous_loads, 6);
    assert_eq!(config.timeouts.timeout_ms, 250);
    assert_eq!(config.timeouts.first_item_timeout_ms, 60_000);
}

#[test]
fn test_env_override_parse_failure_names_key() {
    let mut config = LoaderConfig::default();
    let err = config
        .apply_env(|key| (key == "LOAD_STAGGER_SCHEDULED_LOAD_LIMIT").then(|| "lots".to_string()))
        .unwrap_err();
    assert!(format!("{err:#}").contains("SCHEDULED_LOAD_LIMIT"));
}

#[test]
fn test_config_round_trips_through_json() {
    let config = LoaderConfig {
        scheduled_load_limit: 12,
        admission: AdmissionConfig::permissive(),
        ..LoaderConfig::default()
    };
    let json = serde_json::to_string(&config).unwrap();
    assert_eq!(LoaderConfig::from_json_str(&json).unwrap(), config);
}
