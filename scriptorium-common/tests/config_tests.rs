//! Configuration loading and graceful degradation
//!
//! Tests touching `VITE_API_URL` are marked `#[serial]` so they do not race
//! on the process environment.

use scriptorium_common::config::{
    ConfigOverrides, DashboardConfig, TomlConfig, DEFAULT_PORT, LEGACY_API_URL_ENV,
};
use scriptorium_common::Error;
use serial_test::serial;
use std::env;
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_missing_file_is_none() {
    let dir = TempDir::new().unwrap();
    let loaded = TomlConfig::load(&dir.path().join("absent.toml")).unwrap();
    assert!(loaded.is_none());
}

#[test]
fn test_load_partial_file() {
    let file = write_config("api_url = \"http://pipeline:9000/api\"\nport = 6100\n");
    let loaded = TomlConfig::load(file.path()).unwrap().unwrap();
    assert_eq!(loaded.api_url.as_deref(), Some("http://pipeline:9000/api"));
    assert_eq!(loaded.port, Some(6100));
    assert!(loaded.bind_addr.is_none());
}

#[test]
fn test_load_malformed_file_is_config_error() {
    let file = write_config("port = \"not a number\"\n[[[");
    let err = TomlConfig::load(file.path()).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[test]
#[serial]
fn test_resolve_missing_file_uses_defaults() {
    env::remove_var(LEGACY_API_URL_ENV);
    let dir = TempDir::new().unwrap();

    let overrides = ConfigOverrides {
        config_path: Some(dir.path().join("config.toml")),
        ..Default::default()
    };
    let config = DashboardConfig::resolve(&overrides).unwrap();
    assert_eq!(config, DashboardConfig::default());
    assert_eq!(config.port, DEFAULT_PORT);
}

#[test]
#[serial]
fn test_resolve_file_then_cli_priority() {
    env::remove_var(LEGACY_API_URL_ENV);
    let file = write_config(
        "api_url = \"http://from-file/api\"\nbind_addr = \"0.0.0.0\"\nrequest_timeout_secs = 5\n",
    );

    let overrides = ConfigOverrides {
        config_path: Some(file.path().to_path_buf()),
        port: Some(8123),
        ..Default::default()
    };
    let config = DashboardConfig::resolve(&overrides).unwrap();
    assert_eq!(config.api_url, "http://from-file/api");
    assert_eq!(config.bind_addr, "0.0.0.0");
    assert_eq!(config.port, 8123);
    assert_eq!(config.request_timeout_secs, 5);

    let overrides = ConfigOverrides {
        config_path: Some(file.path().to_path_buf()),
        api_url: Some("http://from-cli/api".to_string()),
        ..Default::default()
    };
    let config = DashboardConfig::resolve(&overrides).unwrap();
    assert_eq!(config.api_url, "http://from-cli/api");
}

#[test]
#[serial]
fn test_resolve_file_beats_legacy_env() {
    env::set_var(LEGACY_API_URL_ENV, "http://legacy:8000/api");
    let file = write_config("api_url = \"http://from-file/api\"\n");

    let overrides = ConfigOverrides {
        config_path: Some(file.path().to_path_buf()),
        ..Default::default()
    };
    let config = DashboardConfig::resolve(&overrides).unwrap();
    assert_eq!(config.api_url, "http://from-file/api");

    // Without a file URL the legacy variable applies
    let file = write_config("port = 6100\n");
    let overrides = ConfigOverrides {
        config_path: Some(file.path().to_path_buf()),
        ..Default::default()
    };
    let config = DashboardConfig::resolve(&overrides).unwrap();
    assert_eq!(config.api_url, "http://legacy:8000/api");
    assert_eq!(config.port, 6100);

    env::remove_var(LEGACY_API_URL_ENV);
}

#[test]
#[serial]
fn test_resolve_rejects_invalid_values() {
    env::remove_var(LEGACY_API_URL_ENV);
    let file = write_config("request_timeout_secs = 0\n");

    let overrides = ConfigOverrides {
        config_path: Some(file.path().to_path_buf()),
        ..Default::default()
    };
    assert!(matches!(
        DashboardConfig::resolve(&overrides),
        Err(Error::Config(_))
    ));
}
