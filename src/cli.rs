//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::config::LogFormat;
use clap::Parser;
use std::path::PathBuf;

/// OSINTScan - subdomain and email discovery API
///
/// Serves an HTTP API that runs theHarvester and amass against a domain,
/// extracts subdomains and email addresses from their output, stores each
/// scan and exports it as a spreadsheet.
///
/// Examples:
///   osintscan
///   osintscan --bind 0.0.0.0:8000 --data-dir /var/lib/osintscan
///   osintscan --config ./osintscan.toml --log-format compact -v
///   osintscan --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Path to configuration file
    ///
    /// If not specified, looks for .osintscan.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Address to listen on (e.g. 127.0.0.1:8000)
    #[arg(short, long, value_name = "ADDR", env = "OSINTSCAN_BIND")]
    pub bind: Option<String>,

    /// Directory where scan records are stored
    #[arg(long, value_name = "DIR", env = "OSINTSCAN_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Per-tool timeout in seconds
    ///
    /// Tools still running after this long are killed. Default: 300s.
    #[arg(long, value_name = "SECS", env = "OSINTSCAN_TIMEOUT")]
    pub timeout: Option<u64>,

    /// Maximum number of scans running at the same time
    #[arg(long, value_name = "NUM", env = "OSINTSCAN_MAX_CONCURRENT_SCANS")]
    pub max_concurrent_scans: Option<usize>,

    /// Log output format (json, compact)
    #[arg(long, value_name = "FORMAT", env = "OSINTSCAN_LOG_FORMAT")]
    pub log_format: Option<LogFormat>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (errors only)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .osintscan.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        if let Some(max) = self.max_concurrent_scans {
            if max == 0 {
                return Err("Max concurrent scans must be at least 1".to_string());
            }
        }

        if let Some(ref bind) = self.bind {
            if bind.parse::<std::net::SocketAddr>().is_err() {
                return Err(format!("Invalid bind address: {}", bind));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self, verbose_by_default: bool) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose || verbose_by_default {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            config: None,
            bind: None,
            data_dir: None,
            timeout: None,
            max_concurrent_scans: None,
            log_format: None,
            verbose: false,
            quiet: false,
            init_config: false,
        }
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(make_args().validate().is_ok());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_zero_limits() {
        let mut args = make_args();
        args.timeout = Some(0);
        assert!(args.validate().is_err());

        let mut args = make_args();
        args.max_concurrent_scans = Some(0);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_bind_address() {
        let mut args = make_args();
        args.bind = Some("not-an-address".to_string());
        assert!(args.validate().is_err());

        args.bind = Some("0.0.0.0:8000".to_string());
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(false), tracing::Level::INFO);
        assert_eq!(args.log_level(true), tracing::Level::DEBUG);

        args.verbose = true;
        assert_eq!(args.log_level(false), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(true), tracing::Level::ERROR);
    }
}
