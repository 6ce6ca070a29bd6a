//! Command-line flags.
//!
//! Every flag is optional: a flag that is present overrides the value from
//! the config file (or the built-in default when no file is given).

use clap::Parser;
use std::path::PathBuf;

use crate::config::loader::{read_config, ConfigError};
use crate::config::schema::{LogFormat, WatchdogConfig};
use crate::config::validation::validate_config;

#[derive(Debug, Default, Parser)]
#[command(name = "watchdog")]
#[command(about = "Monitors internet connectivity and serves the connection log over HTTP", long_about = None)]
pub struct CliArgs {
    /// Optional TOML configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Target to ping
    #[arg(long)]
    pub ping_target: Option<String>,

    /// Interval between checks in seconds
    #[arg(long)]
    pub check_interval: Option<u64>,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Number of ping packets to send
    #[arg(long)]
    pub ping_count: Option<u32>,

    /// Ping timeout in seconds
    #[arg(long)]
    pub ping_timeout: Option<u64>,

    /// Port for the HTTP API server
    #[arg(long)]
    pub api_port: Option<u16>,

    /// Log output format
    #[arg(long, value_parser = parse_log_format)]
    pub log_format: Option<LogFormat>,

    /// Enable the Prometheus endpoint on this address
    #[arg(long)]
    pub metrics_address: Option<String>,
}

impl CliArgs {
    /// Build the effective configuration: file (or defaults), then flags, then validation.
    pub fn resolve(self) -> Result<WatchdogConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => read_config(path)?,
            None => WatchdogConfig::default(),
        };
        self.apply(&mut config);
        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }

    /// Overlay the flags that were given onto `config`.
    pub fn apply(self, config: &mut WatchdogConfig) {
        let monitor = &mut config.monitor;
        if let Some(target) = self.ping_target {
            monitor.ping_target = target;
        }
        if let Some(interval) = self.check_interval {
            monitor.check_interval_secs = interval;
        }
        if let Some(path) = self.log_file {
            monitor.log_file = path;
        }
        if let Some(count) = self.ping_count {
            monitor.ping_count = count;
        }
        if let Some(timeout) = self.ping_timeout {
            monitor.ping_timeout_secs = timeout;
        }
        if let Some(port) = self.api_port {
            config.api.port = port;
        }
        if let Some(format) = self.log_format {
            config.observability.log_format = format;
        }
        if let Some(address) = self.metrics_address {
            config.observability.metrics_enabled = true;
            config.observability.metrics_address = address;
        }
    }
}

fn parse_log_format(value: &str) -> Result<LogFormat, String> {
    match value {
        "pretty" => Ok(LogFormat::Pretty),
        "json" => Ok(LogFormat::Json),
        other => Err(format!("unknown log format {other:?} (expected pretty or json)")),
    }
}
