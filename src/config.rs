//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.osintscan.toml` files.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".osintscan.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Scan execution settings.
    #[serde(default)]
    pub scanner: ScannerConfig,

    /// External tool locations.
    #[serde(default)]
    pub tools: ToolsConfig,

    /// Scan storage settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to listen on.
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:8000".to_string()
}

/// Scan execution settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// Per-tool timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Maximum number of scans running at once.
    #[serde(default = "default_max_concurrent_scans")]
    pub max_concurrent_scans: usize,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            max_concurrent_scans: default_max_concurrent_scans(),
        }
    }
}

fn default_timeout() -> u64 {
    300 // passive enumeration can take minutes
}

fn default_max_concurrent_scans() -> usize {
    4
}

/// Executable paths for the external tools.
///
/// Only the executables are configurable; their arguments are fixed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    #[serde(default = "default_harvester")]
    pub harvester: String,

    #[serde(default = "default_amass")]
    pub amass: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            harvester: default_harvester(),
            amass: default_amass(),
        }
    }
}

fn default_harvester() -> String {
    "theHarvester".to_string()
}

fn default_amass() -> String {
    "amass".to_string()
}

/// Scan storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding one JSON file per scan.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("scans")
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per line (default)
    #[default]
    Json,
    /// Compact human-readable lines
    Compact,
}

/// Log output settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,

    /// Enable debug logging by default.
    #[serde(default)]
    pub verbose: bool,
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(DEFAULT_CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// Only values explicitly given on the command line override the file.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref bind) = args.bind {
            self.server.bind = bind.clone();
        }

        if let Some(timeout) = args.timeout {
            self.scanner.timeout_seconds = timeout;
        }
        if let Some(max) = args.max_concurrent_scans {
            self.scanner.max_concurrent_scans = max;
        }

        if let Some(ref dir) = args.data_dir {
            self.storage.data_dir = dir.clone();
        }

        if let Some(format) = args.log_format {
            self.logging.format = format;
        }

        // Flags always override
        if args.verbose {
            self.logging.verbose = true;
        }
    }

    /// Check settings that a config file can set but the CLI never saw.
    pub fn validate(&self) -> Result<()> {
        if self.scanner.timeout_seconds == 0 {
            bail!("scanner.timeout_seconds must be at least 1 second");
        }
        if self.scanner.max_concurrent_scans == 0 {
            bail!("scanner.max_concurrent_scans must be at least 1");
        }
        self.server
            .bind
            .parse::<std::net::SocketAddr>()
            .with_context(|| format!("Invalid server.bind address: {}", self.server.bind))?;
        Ok(())
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
