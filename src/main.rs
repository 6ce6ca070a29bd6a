//! Connection watchdog.
//!
//! Pings a target on a fixed interval, records every observation in an
//! append-only CSV log and serves that log as JSON over HTTP.
//!
//! # Architecture Overview
//!
//! ```text
//!   ┌────────────────────────── check worker (single owner) ──────────────────────────┐
//!   │  ticker ──▶ CheckExecutor ──▶ Prober (ping) ──▶ ConnectionState ──▶ LogAppender │──┐
//!   └─────────────────────────────────────────────────────────────────────────────────┘  │
//!                                                                                        ▼
//!                                                                          connection_log.csv
//!                                                                                        │
//!   ┌─────────────────────────────── API server ──────────────────────────────────────┐  │
//!   │  GET /api/connection-data ──▶ LogReader ──▶ JSON                                │◀─┘
//!   └─────────────────────────────────────────────────────────────────────────────────┘
//! ```

use clap::Parser;

use watchdog::config::CliArgs;
use watchdog::lifecycle::{signals, Watchdog};
use watchdog::observability;

#[tokio::main]
async fn main() {
    let config = match CliArgs::parse().resolve() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    observability::logging::init(&config.observability);

    tracing::info!("watchdog v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        ping_target = %config.monitor.ping_target,
        check_interval_secs = config.monitor.check_interval_secs,
        ping_count = config.monitor.ping_count,
        ping_timeout_secs = config.monitor.ping_timeout_secs,
        api_port = config.api.port,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            observability::metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let watchdog = match Watchdog::start(config).await {
        Ok(watchdog) => watchdog,
        Err(e) => {
            tracing::error!(error = %e, "Startup failed");
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    signals::wait_for_shutdown_signal().await;
    tracing::info!("Shutdown signal received");

    if let Err(e) = watchdog.stop().await {
        tracing::error!(error = %e, "Shutdown failed");
        eprintln!("{}", e);
        std::process::exit(1);
    }

    tracing::info!("Shutdown complete");
}
