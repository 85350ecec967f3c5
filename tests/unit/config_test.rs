//! Tests for configuration validation

use std::time::Duration;

use triage_dispatch::config::DispatchConfig;

#[test]
fn test_dispatch_config_validation() {
    let valid = DispatchConfig {
        pool_capacity: 4,
        loiter_secs: 60,
        max_retries: 100,
        max_explore_steps: 16,
    };
    assert!(valid.validate().is_ok());
    assert_eq!(valid.idle_interval(), Duration::from_millis(600));
}

#[test]
fn test_dispatch_config_invalid_capacity() {
    let invalid = DispatchConfig {
        pool_capacity: 0,
        ..DispatchConfig::default()
    };
    assert!(invalid.validate().is_err());
}

#[test]
fn test_dispatch_config_invalid_loiter() {
    let invalid = DispatchConfig {
        loiter_secs: 0,
        ..DispatchConfig::default()
    };
    assert!(invalid.validate().is_err());
}

#[test]
fn test_dispatch_config_invalid_retries() {
    let invalid = DispatchConfig {
        max_retries: 0,
        ..DispatchConfig::default()
    };
    assert!(invalid.validate().is_err());
}

#[test]
fn test_dispatch_config_invalid_explore_steps() {
    let invalid = DispatchConfig {
        max_explore_steps: 0,
        ..DispatchConfig::default()
    };
    assert!(invalid.validate().is_err());
}

#[test]
fn test_dispatch_config_json_partial() {
    let cfg = DispatchConfig::from_json_str(r#"{"pool_capacity": 8}"#).unwrap();
    assert_eq!(cfg.pool_capacity, 8);
    assert_eq!(cfg.loiter_secs, 300);
    assert_eq!(cfg.max_retries, 10_000);
    assert_eq!(cfg.max_explore_steps, 64);
}

#[test]
fn test_dispatch_config_json_rejects_invalid() {
    let err = DispatchConfig::from_json_str(r#"{"max_retries": 0}"#).unwrap_err();
    assert!(err.contains("max_retries"));
}

#[test]
fn test_dispatch_config_json_parse_error() {
    let err = DispatchConfig::from_json_str("{not json").unwrap_err();
    assert!(err.starts_with("parse error"));
}
