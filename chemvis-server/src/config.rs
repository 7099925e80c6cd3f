//! Server configuration
//!
//! Command-line arguments and environment variables are parsed by clap;
//! anything left unset falls through to `config.toml` and then to compiled
//! defaults.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chemvis_common::config::{resolve_root_folder, TomlConfig};
use clap::Parser;

use crate::db::RetentionPolicy;

pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8000;

/// Command-line arguments for chemvis-server
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "chemvis-server")]
#[command(about = "Equipment monitoring backend for ChemVis")]
#[command(version)]
pub struct ServerArgs {
    /// Folder holding chemvis.db
    #[arg(short, long, env = "CHEMVIS_ROOT_FOLDER")]
    pub root_folder: Option<PathBuf>,

    /// Address to listen on
    #[arg(short, long, env = "CHEMVIS_BIND_ADDRESS")]
    pub bind_address: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "CHEMVIS_PORT")]
    pub port: Option<u16>,

    /// Number of upload sessions to keep
    #[arg(long, env = "CHEMVIS_RETAINED_SESSIONS")]
    pub retained_sessions: Option<usize>,

    /// Explicit config file (otherwise the platform location is used)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Fully resolved server settings
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub root_folder: PathBuf,
    pub bind_address: String,
    pub port: u16,
    pub retention: RetentionPolicy,
}

impl ServerConfig {
    /// Merge CLI/env arguments over file settings over defaults
    pub fn resolve(args: ServerArgs, file: &TomlConfig) -> Self {
        let retention = args
            .retained_sessions
            .or(file.retained_sessions)
            .map(RetentionPolicy::new)
            .unwrap_or_default();

        Self {
            root_folder: resolve_root_folder(args.root_folder, file),
            bind_address: args
                .bind_address
                .or_else(|| file.bind_address.clone())
                .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string()),
            port: args.port.or(file.port).unwrap_or(DEFAULT_PORT),
            retention,
        }
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.bind_address, self.port)
            .parse()
            .with_context(|| format!("Invalid bind address {}:{}", self.bind_address, self.port))
    }
}
