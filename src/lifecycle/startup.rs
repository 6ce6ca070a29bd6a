//! Startup orchestration and ordered stop.
//!
//! # Responsibilities
//! - Initialize the log file before anything reads or writes it
//! - Bind the API listener, then spawn the API server and the check worker
//! - Stop in order: ticking first, then a bounded HTTP drain
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal and nothing is left running
//! - Listeners are bound before tasks spawn, so a port clash aborts startup

use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;
use tokio::task::{JoinError, JoinHandle};

use crate::config::WatchdogConfig;
use crate::http::{ApiServer, ServeError};
use crate::lifecycle::Shutdown;
use crate::monitor::{CheckExecutor, CheckWorker, ConnectionState, PingProber, ProbeTarget, Prober};
use crate::store::{LogAppender, StoreError};

/// Errors that abort startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to initialize log file {path}: {source}")]
    LogFile {
        path: PathBuf,
        #[source]
        source: StoreError,
    },

    #[error(transparent)]
    Serve(#[from] ServeError),
}

/// Errors reported while stopping.
#[derive(Debug, Error)]
pub enum StopError {
    #[error("check worker failed: {0}")]
    Worker(#[source] JoinError),

    #[error("API server task failed: {0}")]
    ApiTask(#[source] JoinError),

    #[error(transparent)]
    Serve(#[from] ServeError),
}

/// Handle to a running watchdog: the check worker plus the API server.
pub struct Watchdog {
    shutdown: Shutdown,
    worker: JoinHandle<ConnectionState>,
    api: JoinHandle<Result<(), ServeError>>,
    local_addr: SocketAddr,
}

impl Watchdog {
    /// Start with the platform ping prober.
    pub async fn start(config: WatchdogConfig) -> Result<Self, StartupError> {
        Self::start_with_prober(config, PingProber::new()).await
    }

    /// Start with a caller-supplied prober.
    pub async fn start_with_prober<P>(config: WatchdogConfig, prober: P) -> Result<Self, StartupError>
    where
        P: Prober + 'static,
    {
        let monitor = &config.monitor;
        let appender = LogAppender::new(&monitor.log_file);
        appender
            .ensure_initialized()
            .await
            .map_err(|source| StartupError::LogFile {
                path: monitor.log_file.clone(),
                source,
            })?;

        let listener = ApiServer::bind(&config.api).await?;
        let local_addr = listener.local_addr().map_err(ServeError::Io)?;

        let shutdown = Shutdown::new();

        let server = ApiServer::new(&config.api, &monitor.log_file);
        let api = tokio::spawn(server.run(listener, shutdown.subscribe_api()));

        let executor = CheckExecutor::new(prober, ProbeTarget::from(monitor));
        let worker = CheckWorker::new(executor, appender, monitor.check_interval());
        let worker = tokio::spawn(worker.run(shutdown.subscribe_checks()));

        tracing::info!(
            api_address = %local_addr,
            ping_target = %monitor.ping_target,
            ping_count = monitor.ping_count,
            check_interval_secs = monitor.check_interval_secs,
            log_file = %monitor.log_file.display(),
            "Watchdog started"
        );

        Ok(Self {
            shutdown,
            worker,
            api,
            local_addr,
        })
    }

    /// Address the API server is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stop ticking, wait for the current cycle, then drain the API.
    ///
    /// The API is always stopped, even if the worker failed. Returns the
    /// final connection state.
    pub async fn stop(self) -> Result<ConnectionState, StopError> {
        tracing::info!("Stopping check worker");
        self.shutdown.stop_checks();
        let worker = self.worker.await;

        tracing::info!("Stopping API server");
        self.shutdown.stop_api();
        let api = self.api.await;

        let state = worker.map_err(StopError::Worker)?;
        api.map_err(StopError::ApiTask)??;

        tracing::info!(
            changes = state.connection_changes(),
            status = %state.status(),
            "Watchdog stopped"
        );
        Ok(state)
    }
}
