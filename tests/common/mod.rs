//! Shared utilities for integration tests.

use chrono::Local;
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use watchdog::config::{ApiConfig, WatchdogConfig};
use watchdog::http::{ApiServer, ServeError};
use watchdog::lifecycle::Shutdown;
use watchdog::monitor::{CheckResult, ProbeOutcome, ProbeTarget, Prober, Status};

/// Prober replaying scripted outcomes, then repeating a fallback.
pub struct ScriptedProber {
    outcomes: Mutex<VecDeque<ProbeOutcome>>,
    fallback: ProbeOutcome,
    delay: Duration,
    calls: Arc<AtomicUsize>,
}

#[allow(dead_code)]
impl ScriptedProber {
    pub fn new(outcomes: Vec<ProbeOutcome>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into()),
            fallback: ProbeOutcome::Reachable { latency_ms: 1 },
            delay: Duration::ZERO,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Make every probe take `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Counter of probes started so far.
    pub fn calls(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }
}

impl Prober for ScriptedProber {
    async fn probe(&self, _target: &ProbeTarget) -> ProbeOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let next = self.outcomes.lock().unwrap().pop_front();
        next.unwrap_or_else(|| self.fallback.clone())
    }
}

#[allow(dead_code)]
pub fn up(latency_ms: i64) -> ProbeOutcome {
    ProbeOutcome::Reachable { latency_ms }
}

#[allow(dead_code)]
pub fn down(cause: &str) -> ProbeOutcome {
    ProbeOutcome::Unreachable {
        cause: cause.to_string(),
    }
}

/// Loopback API on an ephemeral port, one-second checks, log inside `dir`.
#[allow(dead_code)]
pub fn test_config(dir: &Path) -> WatchdogConfig {
    let mut config = WatchdogConfig::default();
    config.monitor.ping_target = "192.0.2.1".into();
    config.monitor.check_interval_secs = 1;
    config.monitor.log_file = dir.join("connection_log.csv");
    config.api = ApiConfig {
        bind_host: "127.0.0.1".into(),
        port: 0,
        request_timeout_secs: 5,
        shutdown_timeout_secs: 2,
    };
    config
}

/// Start a bare API server over `log_file`.
#[allow(dead_code)]
pub async fn start_api(
    log_file: PathBuf,
) -> (SocketAddr, Shutdown, JoinHandle<Result<(), ServeError>>) {
    start_api_with(log_file, ApiConfig::default()).await
}

/// Start a bare API server on a loopback ephemeral port with `config`'s timeouts.
#[allow(dead_code)]
pub async fn start_api_with(
    log_file: PathBuf,
    config: ApiConfig,
) -> (SocketAddr, Shutdown, JoinHandle<Result<(), ServeError>>) {
    let config = ApiConfig {
        bind_host: "127.0.0.1".into(),
        port: 0,
        ..config
    };
    let listener = TcpListener::bind(config.bind_address()).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = ApiServer::new(&config, log_file);
    let handle = tokio::spawn(server.run(listener, shutdown.subscribe_api()));
    (addr, shutdown, handle)
}

/// A synthetic result whose change counter is `changes`.
#[allow(dead_code)]
pub fn sample_result(changes: u64) -> CheckResult {
    let status = if changes % 2 == 0 { Status::Down } else { Status::Up };
    CheckResult {
        timestamp: Local::now(),
        status,
        latency_ms: if status == Status::Up { 10 } else { -1 },
        uptime: "0s".into(),
        downtime: "0s".into(),
        message: format!("check number {}, \"\"quoted\"\"", changes),
        changes,
    }
}

/// Poll the log at `path` until it holds `n` data rows or the deadline passes.
#[allow(dead_code)]
pub async fn wait_for_rows(path: &Path, n: usize, deadline: Duration) -> usize {
    let start = tokio::time::Instant::now();
    loop {
        let rows = std::fs::read_to_string(path)
            .map(|s| s.lines().count().saturating_sub(1))
            .unwrap_or(0);
        if rows >= n || start.elapsed() >= deadline {
            return rows;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}

#[allow(dead_code)]
pub fn data_url(addr: SocketAddr) -> String {
    format!("http://{}/api/connection-data", addr)
}

/// HTTP client that ignores proxy settings from the environment.
#[allow(dead_code)]
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
