//! File and environment layering for `NetConfig`
//!
//! Each test uses its own environment prefix so tests running in parallel do
//! not see each other's overrides.

use std::fs;

use steam_codec::messages::MsgClientChatEnter;
use steam_codec::{ClientMessage, ClientMsg};
use steam_config::NetConfig;
use tempfile::tempdir;

#[test]
fn test_load_from_file() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("steam.toml");
    fs::write(
        &config_path,
        r#"
[logging]
level = "debug"
json = true

[codec]
max_message_size = 65536
payload_reserve = 256

[jobs]
default_timeout_secs = 15
poll_interval_ms = 250
"#,
    )
    .unwrap();

    let config = NetConfig::load_with_prefix(Some(&config_path), "STEAMTEST_FILE").unwrap();

    assert_eq!(config.logging.level, "debug");
    assert!(config.logging.json);
    assert_eq!(config.codec.max_message_size, 65536);
    assert_eq!(config.codec.payload_reserve, 256);
    assert!(!config.codec.validate_header_constants);
    assert_eq!(config.jobs.default_timeout_secs, 15);
    assert_eq!(config.jobs.poll_interval().as_millis(), 250);

    let msg = ClientMsg::<MsgClientChatEnter>::with_options(&config.codec);
    assert!(msg.payload().capacity() >= 256);
}

#[test]
fn test_missing_file_is_an_error() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("absent.toml");
    assert!(NetConfig::load_with_prefix(Some(&missing), "STEAMTEST_MISSING").is_err());
}

#[test]
fn test_no_file_uses_defaults() {
    let config = NetConfig::load_with_prefix(None, "STEAMTEST_NONE").unwrap();
    assert_eq!(config, NetConfig::default());
}

#[test]
fn test_environment_overrides_file() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("steam.toml");
    fs::write(&config_path, "[codec]\nmax_message_size = 1024\n").unwrap();

    std::env::set_var("STEAMTEST_ENV_CODEC__MAX_MESSAGE_SIZE", "2048");
    std::env::set_var("STEAMTEST_ENV_CODEC__VALIDATE_HEADER_CONSTANTS", "true");
    let config = NetConfig::load_with_prefix(Some(&config_path), "STEAMTEST_ENV");
    std::env::remove_var("STEAMTEST_ENV_CODEC__MAX_MESSAGE_SIZE");
    std::env::remove_var("STEAMTEST_ENV_CODEC__VALIDATE_HEADER_CONSTANTS");

    let config = config.unwrap();
    assert_eq!(config.codec.max_message_size, 2048);
    assert!(config.codec.validate_header_constants);
}

#[test]
fn test_invalid_value_is_reported() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("steam.toml");
    fs::write(&config_path, "[jobs]\ndefault_timeout_secs = \"soon\"\n").unwrap();

    let err = NetConfig::load_with_prefix(Some(&config_path), "STEAMTEST_INVALID").unwrap_err();
    assert!(format!("{err:#}").contains("Failed to deserialize configuration"));
}
