//! Tests for config file loading.

use std::time::Duration;

use reasonflow::config::ReconcileConfig;
use reasonflow::error::FlowError;
use tempfile::TempDir;

#[test]
fn loads_config_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("reasonflow.toml");
    std::fs::write(
        &path,
        concat!(
            "initial_timeout_secs = 600\n",
            "inter_fragment_timeout_secs = 45\n",
            "reasoning_enabled = false\n",
            "model = \"qwq-32b\"\n",
        ),
    )
    .unwrap();

    let config = ReconcileConfig::from_toml_file(&path).unwrap();

    assert_eq!(config.initial_timeout, Duration::from_secs(600));
    assert_eq!(config.inter_fragment_timeout, Duration::from_secs(45));
    assert!(!config.reasoning_enabled);
    assert_eq!(config.model, "qwq-32b");
}

#[test]
fn missing_config_file_is_an_io_error() {
    let dir = TempDir::new().unwrap();
    let err = ReconcileConfig::from_toml_file(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, FlowError::Io(_)));
}

#[test]
fn zero_timeout_in_file_is_rejected() {
    let err = ReconcileConfig::from_toml_str("initial_timeout_secs = 0").unwrap_err();
    assert!(matches!(err, FlowError::Configuration(_)));
}

#[test]
fn negative_timeout_in_file_is_rejected() {
    let err = ReconcileConfig::from_toml_str("inter_fragment_timeout_secs = -1.0").unwrap_err();
    assert!(err.to_string().contains("inter_fragment_timeout_secs"), "{err}");
}
