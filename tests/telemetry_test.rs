//! Telemetry module tests.

use memres::telemetry::{init_logging, LogConfig, LogError, LogFormat};
use std::path::PathBuf;

// =============================================================================
// LogConfig Tests
// =============================================================================

#[test]
fn log_config_default_is_json() {
    let config = LogConfig::default();
    assert_eq!(config.format, LogFormat::Json);
    assert_eq!(config.level, "info");
    assert!(config.output_path.is_none());
}

#[test]
fn log_config_with_output_path() {
    let config = LogConfig {
        format: LogFormat::Pretty,
        level: "memres=trace".to_string(),
        output_path: Some(PathBuf::from("/tmp/memres.log")),
    };
    assert_eq!(config.format, LogFormat::Pretty);
    assert_eq!(config.output_path, Some(PathBuf::from("/tmp/memres.log")));
}

// =============================================================================
// init_logging Tests
// =============================================================================

#[test]
fn init_logging_rejects_invalid_filter() {
    let config = LogConfig {
        level: "memres=notalevel".to_string(),
        ..LogConfig::default()
    };
    assert!(matches!(init_logging(&config), Err(LogError::InvalidFilter(_))));
}

#[test]
fn init_logging_reports_unopenable_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = LogConfig {
        output_path: Some(dir.path().join("missing").join("out.log")),
        ..LogConfig::default()
    };
    assert!(matches!(init_logging(&config), Err(LogError::FileOpen(_))));
}

#[test]
fn log_error_display() {
    assert!(LogError::InvalidFilter("bad".into()).to_string().contains("Invalid log filter"));
    assert!(LogError::FileOpen("denied".into()).to_string().contains("denied"));
    assert!(LogError::AlreadyInitialized.to_string().contains("already initialized"));
}
