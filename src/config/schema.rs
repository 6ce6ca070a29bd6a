//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the watchdog.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration for the watchdog.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct WatchdogConfig {
    /// Probe target and check cadence.
    pub monitor: MonitorConfig,

    /// HTTP API settings.
    pub api: ApiConfig,

    /// Logging and metrics settings.
    pub observability: ObservabilityConfig,
}

/// Reachability check configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct MonitorConfig {
    /// Host or address handed to the prober.
    pub ping_target: String,

    /// Seconds between two check cycles.
    pub check_interval_secs: u64,

    /// Path of the append-only connection log.
    pub log_file: PathBuf,

    /// Echo requests sent per probe.
    pub ping_count: u32,

    /// Upper bound for a single probe, in seconds.
    pub ping_timeout_secs: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            ping_target: "8.8.8.8".to_string(),
            check_interval_secs: 30,
            log_file: PathBuf::from("connection_log.csv"),
            ping_count: 3,
            ping_timeout_secs: 5,
        }
    }
}

impl MonitorConfig {
    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_secs)
    }

    pub fn ping_timeout(&self) -> Duration {
        Duration::from_secs(self.ping_timeout_secs)
    }
}

/// HTTP API configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ApiConfig {
    /// Interface to bind (e.g., "0.0.0.0").
    pub bind_host: String,

    /// Listen port. `0` picks an ephemeral port.
    pub port: u16,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Deadline for draining in-flight requests on shutdown, in seconds.
    pub shutdown_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_host: "0.0.0.0".to_string(),
            port: 8080,
            request_timeout_secs: 30,
            shutdown_timeout_secs: 5,
        }
    }
}

impl ApiConfig {
    /// Address string suitable for `TcpListener::bind`.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.bind_host, self.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Compact human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` takes precedence.
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable the Prometheus scrape endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
