//! One check cycle: probe, evaluate, produce a [`CheckResult`].

use chrono::{DateTime, Local};

use crate::monitor::prober::{ProbeOutcome, ProbeTarget, Prober};
use crate::monitor::state::{ConnectionState, Status};
use crate::observability::metrics;

/// Latency recorded for a failed probe.
pub const FAILED_LATENCY_MS: i64 = -1;

/// Immutable record of a single check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    pub timestamp: DateTime<Local>,
    pub status: Status,
    /// Average latency in milliseconds, [`FAILED_LATENCY_MS`] when down.
    pub latency_ms: i64,
    pub uptime: String,
    pub downtime: String,
    /// Human message with embedded quotes already doubled for the CSV log.
    pub message: String,
    /// Connection changes seen so far, including this check.
    pub changes: u64,
}

/// Runs check cycles against a fixed target.
///
/// Takes the state by `&mut`, so two cycles can never touch the same
/// [`ConnectionState`] at once.
pub struct CheckExecutor<P> {
    prober: P,
    target: ProbeTarget,
}

impl<P: Prober> CheckExecutor<P> {
    pub fn new(prober: P, target: ProbeTarget) -> Self {
        Self { prober, target }
    }

    pub fn target(&self) -> &ProbeTarget {
        &self.target
    }

    /// Probe once and fold the outcome into `state`.
    pub async fn run(&self, state: &mut ConnectionState) -> CheckResult {
        let outcome = self.prober.probe(&self.target).await;
        self.record(state, outcome, Local::now())
    }

    /// Fold an already observed outcome into `state`.
    pub fn record(
        &self,
        state: &mut ConnectionState,
        outcome: ProbeOutcome,
        now: DateTime<Local>,
    ) -> CheckResult {
        let evaluation = state.evaluate(outcome.is_reachable(), now);

        let (latency_ms, message) = match outcome {
            ProbeOutcome::Reachable { latency_ms } => {
                tracing::info!(
                    target_host = %self.target.host,
                    uptime = %evaluation.uptime,
                    latency_ms,
                    "Connection UP"
                );
                (latency_ms, evaluation.message)
            }
            ProbeOutcome::Unreachable { cause } => {
                tracing::warn!(
                    target_host = %self.target.host,
                    downtime = %evaluation.downtime,
                    cause = %cause,
                    "Connection DOWN"
                );
                (FAILED_LATENCY_MS, format!("{}. Error: {}", evaluation.message, cause))
            }
        };

        if evaluation.changed {
            tracing::warn!(
                status = %evaluation.status,
                changes = state.connection_changes(),
                "Connection status changed"
            );
        }
        metrics::record_check(evaluation.status, latency_ms, state.connection_changes());

        CheckResult {
            timestamp: now,
            status: evaluation.status,
            latency_ms,
            uptime: evaluation.uptime,
            downtime: evaluation.downtime,
            message: escape_quotes(&message),
            changes: state.connection_changes(),
        }
    }
}

/// Double every `"` so the message can sit inside a quoted CSV field.
pub fn escape_quotes(message: &str) -> String {
    message.replace('"', "\"\"")
}
