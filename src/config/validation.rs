//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde and clap handle syntactic)
//! - Validate value ranges (intervals, counts and timeouts > 0)
//! - Validate addresses that are only parsed later (metrics listener)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: WatchdogConfig → Result<(), Vec<ValidationError>>
//! - Runs before any worker or listener is started

use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::WatchdogConfig;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("ping-target cannot be empty")]
    EmptyPingTarget,

    #[error("check-interval must be greater than 0")]
    ZeroCheckInterval,

    #[error("log-file cannot be empty")]
    EmptyLogFile,

    #[error("ping-count must be greater than 0")]
    ZeroPingCount,

    #[error("ping-timeout must be greater than 0")]
    ZeroPingTimeout,

    #[error("api request timeout must be greater than 0")]
    ZeroRequestTimeout,

    #[error("api shutdown timeout must be greater than 0")]
    ZeroShutdownTimeout,

    #[error("invalid metrics address {0:?}")]
    InvalidMetricsAddress(String),
}

/// Validate a configuration, collecting every violation.
pub fn validate_config(config: &WatchdogConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let monitor = &config.monitor;

    if monitor.ping_target.trim().is_empty() {
        errors.push(ValidationError::EmptyPingTarget);
    }
    if monitor.check_interval_secs == 0 {
        errors.push(ValidationError::ZeroCheckInterval);
    }
    if monitor.log_file.as_os_str().is_empty() {
        errors.push(ValidationError::EmptyLogFile);
    }
    if monitor.ping_count == 0 {
        errors.push(ValidationError::ZeroPingCount);
    }
    if monitor.ping_timeout_secs == 0 {
        errors.push(ValidationError::ZeroPingTimeout);
    }

    if config.api.request_timeout_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }
    if config.api.shutdown_timeout_secs == 0 {
        errors.push(ValidationError::ZeroShutdownTimeout);
    }

    let observability = &config.observability;
    if observability.metrics_enabled
        && observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
