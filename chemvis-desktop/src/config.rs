//! Desktop viewer configuration

use std::path::PathBuf;
use std::time::Duration;

use chemvis_common::config::TomlConfig;
use clap::Parser;

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 2000;

/// Uploads get longer than ordinary fetches
pub const UPLOAD_TIMEOUT: Duration = Duration::from_secs(8);

/// Command-line arguments for chemvis-desktop
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "chemvis-desktop")]
#[command(about = "Terminal dashboard for a ChemVis server")]
#[command(version)]
pub struct DesktopArgs {
    /// Base URL of the ChemVis server
    #[arg(short, long, env = "CHEMVIS_SERVER_URL")]
    pub server_url: Option<String>,

    /// Timeout for each data request, in milliseconds
    #[arg(short = 't', long, env = "CHEMVIS_REQUEST_TIMEOUT_MS")]
    pub request_timeout_ms: Option<u64>,

    /// Folder where reports are written
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Explicit config file (otherwise the platform location is used)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Fully resolved viewer settings
#[derive(Debug, Clone, PartialEq)]
pub struct DesktopConfig {
    pub server_url: String,
    pub request_timeout: Duration,
    pub upload_timeout: Duration,
    pub output_dir: PathBuf,
}

impl DesktopConfig {
    pub fn resolve(args: DesktopArgs, file: &TomlConfig) -> Self {
        let server_url = args
            .server_url
            .or_else(|| file.server_url.clone())
            .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string());
        let timeout_ms = args
            .request_timeout_ms
            .or(file.request_timeout_ms)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_MS);

        Self {
            server_url: server_url.trim_end_matches('/').to_string(),
            request_timeout: Duration::from_millis(timeout_ms),
            upload_timeout: UPLOAD_TIMEOUT,
            output_dir: args.output_dir,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_defaults() {
        let config = DesktopConfig::resolve(DesktopArgs::default(), &TomlConfig::default());
        assert_eq!(config.server_url, DEFAULT_SERVER_URL);
        assert_eq!(config.request_timeout, Duration::from_secs(2));
        assert_eq!(config.upload_timeout, Duration::from_secs(8));
    }

    #[test]
    fn test_file_then_args() {
        let file = TomlConfig {
            server_url: Some("http://plant-gw:9000/".to_string()),
            request_timeout_ms: Some(1500),
            ..Default::default()
        };

        let config = DesktopConfig::resolve(DesktopArgs::default(), &file);
        assert_eq!(config.server_url, "http://plant-gw:9000");
        assert_eq!(config.request_timeout, Duration::from_millis(1500));

        let args = DesktopArgs::try_parse_from(["chemvis-desktop", "-t", "500"]).unwrap();
        let config = DesktopConfig::resolve(args, &file);
        assert_eq!(config.request_timeout, Duration::from_millis(500));
        assert_eq!(config.output_dir, PathBuf::from("."));
    }

    #[test]
    #[serial]
    fn test_env_var_sets_server_url() {
        std::env::set_var("CHEMVIS_SERVER_URL", "http://10.0.0.5:8000");
        let args = DesktopArgs::try_parse_from(["chemvis-desktop"]).unwrap();
        std::env::remove_var("CHEMVIS_SERVER_URL");

        assert_eq!(args.server_url.as_deref(), Some("http://10.0.0.5:8000"));
    }
}
