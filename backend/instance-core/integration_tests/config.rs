use instance_core::config::{AppConfig, CONFIG_FILE_NAME, ENV_OPEN_BROWSER, ENV_PORT_END, ENV_PORT_START};
use instance_core::error::config::ConfigError;

use std::collections::HashMap;

use tempfile::TempDir;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect();
    move |key| vars.get(key).cloned()
}

/// **VALUE**: Running without a config file behaves exactly like the documented defaults.
///
/// **WHY THIS MATTERS**: Most installs never create `rollcall.json`. Defaults must
/// match the port range and file names every other launcher uses.
#[test]
fn given_no_config_file_when_loaded_then_returns_defaults() {
    // GIVEN: An empty data directory
    let dir = TempDir::new().expect("tempdir");

    // WHEN: Loading config
    let config = AppConfig::load(dir.path()).expect("load defaults");

    // THEN: Defaults are used
    assert_eq!(config, AppConfig::default());
    assert_eq!(config.ports.range.start(), 5000);
    assert_eq!(config.ports.range.end(), 5050);
    assert_eq!(config.storage.marker_file, "rollcall.port");
    assert_eq!(config.storage.roster_file, "students.json");
}

#[test]
fn given_saved_config_when_loaded_then_round_trips() {
    let dir = TempDir::new().expect("tempdir");
    let mut config = AppConfig::default();
    config.browser.open_on_start = false;
    config.ports.marker_timeout_ms = 1_234;

    config.save(dir.path()).expect("save");
    let loaded = AppConfig::load(dir.path()).expect("load");

    assert_eq!(loaded, config);
    assert!(!dir.path().join(format!("{CONFIG_FILE_NAME}.tmp")).exists());
}

/// **VALUE**: Partial config files fill the gaps with defaults.
///
/// **BUG THIS CATCHES**: Would catch a missing `#[serde(default)]` making a config that
/// only sets the port range unparsable.
#[test]
fn given_partial_config_when_loaded_then_missing_fields_use_defaults() {
    let dir = TempDir::new().expect("tempdir");
    std::fs::write(
        dir.path().join(CONFIG_FILE_NAME),
        r#"{"ports": {"range": {"start": 6000, "end": 6010}}}"#,
    )
    .expect("write config");

    let config = AppConfig::load(dir.path()).expect("load");

    assert_eq!(config.ports.range.start(), 6000);
    assert_eq!(config.ports.range.end(), 6010);
    assert_eq!(config.ports.handshake_timeout_ms, 500);
    assert!(config.browser.open_on_start);
}

#[test]
fn given_malformed_config_when_loaded_then_returns_parse_error() {
    let dir = TempDir::new().expect("tempdir");
    std::fs::write(dir.path().join(CONFIG_FILE_NAME), "{ not json").expect("write config");

    let result = AppConfig::load(dir.path());

    assert!(matches!(result, Err(ConfigError::ParseError { .. })));
}

/// **VALUE**: A config whose range cannot be scanned is rejected up front.
#[test]
fn given_inverted_range_in_file_when_loaded_then_returns_validation_error() {
    let dir = TempDir::new().expect("tempdir");
    std::fs::write(
        dir.path().join(CONFIG_FILE_NAME),
        r#"{"ports": {"range": {"start": 6010, "end": 6000}}}"#,
    )
    .expect("write config");

    let result = AppConfig::load(dir.path());

    assert!(matches!(result, Err(ConfigError::ValidationError { .. })));
}

#[test]
fn given_zero_timeout_when_validated_then_returns_validation_error() {
    let mut config = AppConfig::default();
    config.ports.scan_probe_timeout_ms = 0;

    assert!(matches!(
        config.validate(),
        Err(ConfigError::ValidationError { .. })
    ));
}

/// **VALUE**: Environment variables override the port range and browser switch.
#[test]
fn given_env_overrides_when_applied_then_config_updated() {
    // GIVEN: Overrides for every supported variable
    let mut config = AppConfig::default();
    let lookup = lookup_from(&[
        (ENV_PORT_START, "7000"),
        (ENV_PORT_END, " 7005 "),
        (ENV_OPEN_BROWSER, "off"),
    ]);

    // WHEN: Applying them
    config.apply_env_overrides(lookup).expect("apply overrides");

    // THEN: The config reflects them
    assert_eq!(config.ports.range.start(), 7000);
    assert_eq!(config.ports.range.end(), 7005);
    assert!(!config.browser.open_on_start);
}

#[test]
fn given_no_env_overrides_when_applied_then_config_unchanged() {
    let mut config = AppConfig::default();

    config.apply_env_overrides(|_| None).expect("apply overrides");

    assert_eq!(config, AppConfig::default());
}

/// **VALUE**: Bad environment values are reported with the variable name.
///
/// **BUG THIS CATCHES**: Would catch a typo like `ROLLCALL_PORT_START=50O0` being
/// silently ignored and the launcher scanning a range the user did not ask for.
#[test]
fn given_invalid_env_values_when_applied_then_returns_environment_error() {
    let mut config = AppConfig::default();
    let result = config.apply_env_overrides(lookup_from(&[(ENV_PORT_START, "50O0")]));
    match result {
        Err(ConfigError::EnvironmentError { variable, .. }) => {
            assert_eq!(variable, ENV_PORT_START)
        }
        other => panic!("Expected EnvironmentError, got {other:?}"),
    }

    let mut config = AppConfig::default();
    let result = config.apply_env_overrides(lookup_from(&[(ENV_OPEN_BROWSER, "maybe")]));
    assert!(matches!(result, Err(ConfigError::EnvironmentError { .. })));
}

#[test]
fn given_env_range_that_inverts_when_applied_then_returns_validation_error() {
    let mut config = AppConfig::default();

    let result = config.apply_env_overrides(lookup_from(&[(ENV_PORT_START, "6000")]));

    assert!(matches!(result, Err(ConfigError::ValidationError { .. })));
}

#[test]
fn given_data_dir_when_paths_resolved_then_joined_with_storage_names() {
    let dir = TempDir::new().expect("tempdir");
    let config = AppConfig::default();

    assert_eq!(config.marker_path(dir.path()), dir.path().join("rollcall.port"));
    assert_eq!(config.roster_path(dir.path()), dir.path().join("students.json"));
    assert_eq!(config.static_dir(dir.path()), dir.path().join("static"));
}
