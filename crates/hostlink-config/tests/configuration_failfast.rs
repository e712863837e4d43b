use std::ffi::OsString;
use std::fs;

use ortho_config::OrthoConfig;
use tempfile::TempDir;

use hostlink_config::{Config, ConfigError, Framing};

#[test]
fn malformed_config_file_fails_to_load() {
    let temp_dir = TempDir::new().expect("create temp dir");
    let path = temp_dir.path().join("hostlink.toml");
    fs::write(&path, "port = not_a_number\n").expect("write malformed config");

    let args = vec![
        OsString::from("hostlinkd"),
        OsString::from("--config-path"),
        path.into_os_string(),
    ];
    let result = Config::load_from_iter(args);
    assert!(result.is_err(), "malformed configuration should be rejected");
}

#[test]
fn config_file_sets_transport_fields() {
    let temp_dir = TempDir::new().expect("create temp dir");
    let path = temp_dir.path().join("hostlink.toml");
    fs::write(
        &path,
        "framing = \"speculative\"\nmax_attempts = 5\nretry_delay_ms = 250\n",
    )
    .expect("write config");

    let args = vec![
        OsString::from("hostlinkd"),
        OsString::from("--config-path"),
        path.into_os_string(),
    ];
    let config = Config::load_from_iter(args).expect("config should load");
    assert_eq!(config.framing(), Framing::Speculative);
    assert_eq!(config.max_attempts(), 5);
    assert_eq!(config.retry_delay().as_millis(), 250);
}

#[test]
fn zero_attempts_fail_validation() {
    let config = Config {
        max_attempts: 0,
        ..Config::default()
    };
    assert!(matches!(
        config.validate(),
        Err(ConfigError::Invalid { .. })
    ));
}
