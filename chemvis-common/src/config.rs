//! Configuration loading and root folder resolution
//!
//! Priority order for every setting:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. OS-dependent compiled default (fallback)
//!
//! Levels 1 and 2 are handled by each binary's `clap` parser; this module
//! supplies levels 3 and 4. A missing or unreadable config file is never fatal.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::{Error, Result};

/// Database file name inside the root folder
pub const DATABASE_FILE: &str = "chemvis.db";

/// Settings read from `config.toml`
///
/// Every key is optional; absent keys fall through to compiled defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Folder holding the server database
    pub root_folder: Option<PathBuf>,
    /// Server listen address (e.g. "127.0.0.1")
    pub bind_address: Option<String>,
    /// Server listen port
    pub port: Option<u16>,
    /// How many upload sessions the server keeps
    pub retained_sessions: Option<usize>,
    /// Base URL the desktop viewer talks to
    pub server_url: Option<String>,
    /// Per-request timeout for desktop data fetches
    pub request_timeout_ms: Option<u64>,
}

impl TomlConfig {
    /// Parse a specific config file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Invalid config file {}: {}", path.display(), e)))
    }

    /// Load the config file from `explicit` or the platform location
    ///
    /// Falls back to an empty config (all defaults) when no file exists or
    /// the file cannot be parsed.
    pub fn load(explicit: Option<&Path>) -> Self {
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => config_file_path(),
        };

        let Some(path) = path else {
            debug!("No config file found, using defaults");
            return Self::default();
        };

        match Self::load_from(&path) {
            Ok(config) => {
                debug!("Loaded config file {}", path.display());
                config
            }
            Err(e) => {
                warn!("Ignoring config file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }
}

/// Locate the config file for the platform, if one exists
pub fn config_file_path() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("chemvis").join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/chemvis/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// Get OS-dependent default root folder path
pub fn default_root_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        // ~/.local/share/chemvis (or /var/lib/chemvis for system-wide)
        dirs::data_local_dir()
            .map(|d| d.join("chemvis"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/chemvis"))
    } else if cfg!(target_os = "macos") {
        // ~/Library/Application Support/chemvis
        dirs::data_dir()
            .map(|d| d.join("chemvis"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/chemvis"))
    } else if cfg!(target_os = "windows") {
        // %LOCALAPPDATA%\chemvis
        dirs::data_local_dir()
            .map(|d| d.join("chemvis"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\chemvis"))
    } else {
        PathBuf::from("./chemvis_data")
    }
}

/// Resolve the root folder: CLI/env value, then config file, then default
pub fn resolve_root_folder(cli_or_env: Option<PathBuf>, file: &TomlConfig) -> PathBuf {
    cli_or_env
        .or_else(|| file.root_folder.clone())
        .unwrap_or_else(default_root_folder)
}

/// Create the root folder if missing and return the database path inside it
pub fn prepare_root_folder(root_folder: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(root_folder)?;
    Ok(root_folder.join(DATABASE_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_value_wins() {
        let file = TomlConfig {
            root_folder: Some(PathBuf::from("/from/file")),
            ..Default::default()
        };
        let resolved = resolve_root_folder(Some(PathBuf::from("/from/cli")), &file);
        assert_eq!(resolved, PathBuf::from("/from/cli"));
    }

    #[test]
    fn test_file_value_used_without_cli() {
        let file = TomlConfig {
            root_folder: Some(PathBuf::from("/from/file")),
            ..Default::default()
        };
        assert_eq!(resolve_root_folder(None, &file), PathBuf::from("/from/file"));
    }

    #[test]
    fn test_default_used_when_nothing_set() {
        let resolved = resolve_root_folder(None, &TomlConfig::default());
        assert_eq!(resolved, default_root_folder());
        assert!(!resolved.as_os_str().is_empty());
    }
}
