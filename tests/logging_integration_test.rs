//! Integration tests for logging functionality

use frontdesk::config::LoggingConfig;
use frontdesk::logging::parse_log_level;
use tempfile::TempDir;
use test_case::test_case;
use tracing::Level;

#[test]
fn test_logging_config_default() {
    let config = LoggingConfig::default();
    assert!(config.local_enabled);
    assert_eq!(config.local_rotation, "daily");
}

#[test]
fn test_logging_directory_not_created_before_init() {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("logs");

    let config = LoggingConfig {
        local_enabled: true,
        local_path: log_path.to_string_lossy().to_string(),
        local_rotation: "never".to_string(),
    };

    assert!(config.local_enabled);
    assert!(!log_path.exists());
}

#[test_case("trace", Level::TRACE)]
#[test_case("DEBUG", Level::DEBUG)]
#[test_case("Info", Level::INFO)]
#[test_case("warn", Level::WARN)]
#[test_case("error", Level::ERROR)]
fn test_parse_log_level(input: &str, expected: Level) {
    assert_eq!(parse_log_level(input).unwrap(), expected);
}

#[test]
fn test_parse_log_level_rejects_unknown() {
    let err = parse_log_level("verbose").unwrap_err();
    assert!(err.to_string().contains("Invalid log level"));
}
