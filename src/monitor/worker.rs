//! Periodic check worker.
//!
//! # Responsibilities
//! - Own the [`ConnectionState`] and the append side of the connection log
//! - Run one check cycle per tick, strictly one after another
//! - Stop ticking when shutdown is signalled
//!
//! # Design Decisions
//! - Single owner: the state never leaves this task, so no lock is needed
//! - A cycle runs to completion (probe, evaluate, append) before the next tick
//!   is even polled; ticks that fall due meanwhile are delayed, not queued up
//! - Append failures drop that cycle's row; the next tick proceeds normally

use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::{self, MissedTickBehavior};

use crate::monitor::check::{CheckExecutor, CheckResult};
use crate::monitor::prober::Prober;
use crate::monitor::state::ConnectionState;
use crate::observability::metrics;
use crate::store::LogAppender;

pub struct CheckWorker<P> {
    executor: CheckExecutor<P>,
    appender: LogAppender,
    interval: Duration,
    state: ConnectionState,
}

impl<P: Prober> CheckWorker<P> {
    pub fn new(executor: CheckExecutor<P>, appender: LogAppender, interval: Duration) -> Self {
        Self {
            executor,
            appender,
            interval,
            state: ConnectionState::new(),
        }
    }

    /// Tick until shutdown; the first cycle runs immediately.
    ///
    /// Returns the final connection state once the loop has exited.
    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) -> ConnectionState {
        tracing::info!(
            target_host = %self.executor.target().host,
            packets = self.executor.target().count,
            interval_secs = self.interval.as_secs(),
            log_file = %self.appender.path().display(),
            "Check worker starting"
        );

        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = shutdown.recv() => {
                    tracing::info!("Check worker received shutdown signal, exiting loop");
                    break;
                }
                _ = ticker.tick() => {
                    self.run_cycle().await;
                }
            }
        }

        self.state
    }

    /// One probe → evaluate → append cycle.
    pub async fn run_cycle(&mut self) -> CheckResult {
        let result = self.executor.run(&mut self.state).await;

        if let Err(e) = self.appender.append(&result).await {
            metrics::record_append_failure();
            tracing::error!(
                error = %e,
                log_file = %self.appender.path().display(),
                "Failed to append check result, dropping this cycle"
            );
        }

        result
    }

    pub fn state(&self) -> &ConnectionState {
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::prober::{ProbeOutcome, ProbeTarget};
    use crate::monitor::Status;
    use std::sync::Mutex;

    struct FixedLatency {
        latencies: Mutex<Vec<i64>>,
    }

    impl Prober for FixedLatency {
        async fn probe(&self, _target: &ProbeTarget) -> ProbeOutcome {
            let latency_ms = self.latencies.lock().unwrap().remove(0);
            ProbeOutcome::Reachable { latency_ms }
        }
    }

    fn worker(appender: LogAppender, latencies: Vec<i64>) -> CheckWorker<FixedLatency> {
        let target = ProbeTarget {
            host: "192.0.2.1".into(),
            count: 1,
            timeout: Duration::from_secs(1),
        };
        let prober = FixedLatency {
            latencies: Mutex::new(latencies),
        };
        CheckWorker::new(
            CheckExecutor::new(prober, target),
            appender,
            Duration::from_secs(30),
        )
    }

    #[tokio::test]
    async fn test_append_failure_drops_only_that_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.csv");
        let appender = LogAppender::new(&path);
        let mut worker = worker(appender.clone(), vec![5, 7]);

        let first = worker.run_cycle().await;
        assert_eq!(first.status, Status::Up);
        assert_eq!(first.changes, 1);
        assert!(!path.exists());

        appender.ensure_initialized().await.unwrap();
        let second = worker.run_cycle().await;
        assert_eq!(second.status, Status::Up);
        assert_eq!(second.changes, 1);
        assert_eq!(second.message, "Connection stable");
        assert_eq!(worker.state().connection_changes(), 1);

        let content = std::fs::read_to_string(&path).unwrap();
        let rows: Vec<&str> = content.lines().skip(1).collect();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].contains(",UP,7,"), "unexpected row {}", rows[0]);
    }
}
