//! Tests for configuration file loading and graceful degradation
//!
//! - Missing config files SHALL NOT cause termination
//! - Unparseable config files fall back to defaults
//! - Root folder preparation creates the directory and names the database

use chemvis_common::config::{prepare_root_folder, resolve_root_folder, TomlConfig, DATABASE_FILE};
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn test_load_from_reads_all_keys() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
root_folder = "/srv/chemvis"
bind_address = "0.0.0.0"
port = 9000
retained_sessions = 3
server_url = "http://plant-gw:9000"
request_timeout_ms = 1500
"#,
    )
    .unwrap();

    let config = TomlConfig::load_from(&path).unwrap();
    assert_eq!(config.root_folder, Some(PathBuf::from("/srv/chemvis")));
    assert_eq!(config.bind_address.as_deref(), Some("0.0.0.0"));
    assert_eq!(config.port, Some(9000));
    assert_eq!(config.retained_sessions, Some(3));
    assert_eq!(config.server_url.as_deref(), Some("http://plant-gw:9000"));
    assert_eq!(config.request_timeout_ms, Some(1500));
}

#[test]
fn test_partial_file_leaves_other_keys_unset() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    std::fs::write(&path, "port = 8100\n").unwrap();

    let config = TomlConfig::load_from(&path).unwrap();
    assert_eq!(config.port, Some(8100));
    assert!(config.root_folder.is_none());
    assert!(config.retained_sessions.is_none());
}

#[test]
fn test_missing_file_falls_back_to_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("does-not-exist.toml");

    assert!(TomlConfig::load_from(&path).is_err());
    assert_eq!(TomlConfig::load(Some(&path)), TomlConfig::default());
}

#[test]
fn test_invalid_file_falls_back_to_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    std::fs::write(&path, "port = \"not a number\"\n").unwrap();

    assert!(TomlConfig::load_from(&path).is_err());
    assert_eq!(TomlConfig::load(Some(&path)), TomlConfig::default());
}

#[test]
fn test_prepare_root_folder_creates_directory() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("nested").join("chemvis");

    let db_path = prepare_root_folder(&root).unwrap();
    assert!(root.is_dir());
    assert_eq!(db_path, root.join(DATABASE_FILE));
}

#[test]
fn test_file_root_folder_used_when_no_override() {
    let config = TomlConfig {
        root_folder: Some(PathBuf::from("/opt/plant")),
        ..Default::default()
    };
    assert_eq!(resolve_root_folder(None, &config), PathBuf::from("/opt/plant"));
}
