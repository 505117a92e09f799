use std::fs;

use telnet_client::config::{ClientConfig, OptionOverride};
use telnet_client::errors::ConfigError;
use tempfile::TempDir;

#[test]
fn test_missing_file_is_created_with_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("telnet-client.toml");

    let config = ClientConfig::load_from_file(&path).unwrap();
    assert_eq!(config, ClientConfig::default());
    assert!(path.exists());

    let reloaded = ClientConfig::load_from_file(&path).unwrap();
    assert_eq!(reloaded, config);
}

#[test]
fn test_existing_file_is_loaded() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("client.toml");
    fs::write(
        &path,
        r#"
[server]
host = "towel.blinkenlights.nl"
port = 2323
connect_timeout_secs = 3

[terminal]
terminal_speed = "38400,38400"
width = 100
height = 30
detect_size = false

[negotiation]
disable_remote_echo = true

[[negotiation.options]]
code = 0
will = true
allow = true
"#,
    )
    .unwrap();

    let config = ClientConfig::load_from_file(&path).unwrap();
    assert_eq!(config.address(), "towel.blinkenlights.nl:2323");
    assert_eq!(config.terminal.terminal_speed, "38400,38400");
    assert_eq!((config.terminal.width, config.terminal.height), (100, 30));
    assert!(config.negotiation.disable_remote_echo);
    assert_eq!(
        config.negotiation.options,
        vec![OptionOverride {
            code: 0,
            will: true,
            allow: true
        }]
    );
}

#[test]
fn test_invalid_file_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("broken.toml");
    fs::write(&path, "[server\nhost = ").unwrap();

    assert!(matches!(
        ClientConfig::load_from_file(&path),
        Err(ConfigError::Parse(_))
    ));
}

#[test]
fn test_unreadable_path_is_an_error() {
    let temp_dir = TempDir::new().unwrap();

    // A directory exists but cannot be read as a file
    assert!(matches!(
        ClientConfig::load_from_file(temp_dir.path()),
        Err(ConfigError::Read { .. })
    ));
}
