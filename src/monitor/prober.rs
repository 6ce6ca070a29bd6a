//! Reachability probing.
//!
//! # Responsibilities
//! - Define the [`Prober`] capability the check executor depends on
//! - Provide [`PingProber`], backed by the platform `ping` utility
//! - Extract average latency from the utility's summary output
//!
//! # Design Decisions
//! - A failed probe is data (the DOWN signal), never an error
//! - Every probe is bounded by the configured timeout; the child process is
//!   killed when the bound is hit
//! - Command-line flags and output grammar are the only platform-specific parts

use std::future::Future;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

use crate::config::MonitorConfig;

/// What to probe and how hard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeTarget {
    pub host: String,
    pub count: u32,
    pub timeout: Duration,
}

impl From<&MonitorConfig> for ProbeTarget {
    fn from(config: &MonitorConfig) -> Self {
        Self {
            host: config.ping_target.clone(),
            count: config.ping_count,
            timeout: config.ping_timeout(),
        }
    }
}

/// Result of a single probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// Target answered; average latency in whole milliseconds (0 if unknown).
    Reachable { latency_ms: i64 },
    /// Target did not answer; human-readable cause.
    Unreachable { cause: String },
}

impl ProbeOutcome {
    pub fn is_reachable(&self) -> bool {
        matches!(self, ProbeOutcome::Reachable { .. })
    }
}

/// Capability performing one reachability probe.
pub trait Prober: Send + Sync {
    fn probe(&self, target: &ProbeTarget) -> impl Future<Output = ProbeOutcome> + Send;
}

/// Prober that runs the system `ping` command.
#[derive(Debug, Clone, Copy, Default)]
pub struct PingProber;

impl PingProber {
    pub fn new() -> Self {
        Self
    }

    fn command(target: &ProbeTarget) -> Command {
        let mut cmd = Command::new("ping");
        if cfg!(windows) {
            cmd.arg("-n")
                .arg(target.count.to_string())
                .arg("-w")
                .arg(target.timeout.as_millis().to_string());
        } else {
            cmd.arg("-c")
                .arg(target.count.to_string())
                .arg("-W")
                .arg(target.timeout.as_secs().max(1).to_string());
        }
        cmd.arg(&target.host)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

impl Prober for PingProber {
    async fn probe(&self, target: &ProbeTarget) -> ProbeOutcome {
        let output = match tokio::time::timeout(target.timeout, Self::command(target).output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return ProbeOutcome::Unreachable {
                    cause: format!("failed to execute ping: {}", e),
                }
            }
            Err(_) => {
                return ProbeOutcome::Unreachable {
                    cause: format!("ping timed out after {}s", target.timeout.as_secs()),
                }
            }
        };

        if !output.status.success() {
            tracing::debug!(
                host = %target.host,
                stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                "ping reported failure"
            );
            return ProbeOutcome::Unreachable {
                cause: format!("ping exited with {}", output.status),
            };
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let latency = if cfg!(windows) {
            parse_windows_latency(&stdout)
        } else {
            parse_unix_latency(&stdout)
        };

        ProbeOutcome::Reachable {
            latency_ms: latency.unwrap_or(0),
        }
    }
}

/// Average from a `rtt min/avg/max/mdev = 9.1/10.7/12.3/1.2 ms` summary line
/// (Linux, macOS and the BSDs all print this shape).
pub fn parse_unix_latency(output: &str) -> Option<i64> {
    output.lines().find_map(|line| {
        let idx = line.find("min/avg/max")?;
        let values = line[idx..].split_once('=')?.1.trim();
        let avg = values.split('/').nth(1)?;
        integer_part(avg)
    })
}

/// Average from a `Minimum = 9ms, Maximum = 12ms, Average = 10ms` summary line.
pub fn parse_windows_latency(output: &str) -> Option<i64> {
    output.lines().find_map(|line| {
        let idx = line.find("Average")?;
        let rest = line[idx + "Average".len()..].trim_start().strip_prefix('=')?;
        let value = rest.trim_start();
        let end = value.find("ms")?;
        integer_part(value[..end].trim())
    })
}

fn integer_part(value: &str) -> Option<i64> {
    value.split('.').next()?.trim().parse().ok()
}
