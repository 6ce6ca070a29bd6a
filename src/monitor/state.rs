//! Connection state machine.
//!
//! # States
//! - Unknown: nothing observed yet (process start only)
//! - Up: last probe succeeded
//! - Down: last probe failed
//!
//! # State Transitions
//! ```text
//! Unknown/Down → Up:   probe succeeded, change counted, "restored after …"
//! Unknown/Up   → Down: probe failed, change counted, "lost after …"
//! Up → Up, Down → Down: no change counted, "stable" / "still down"
//! ```
//!
//! Unknown behaves as the opposite of whatever the first probe reports, so the
//! first observation always counts as a transition.

use chrono::{DateTime, Local};
use std::fmt;
use std::time::Duration;

use crate::monitor::duration::format_duration;

/// Reachability status of the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Unknown,
    Up,
    Down,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Unknown => "UNKNOWN",
            Status::Up => "UP",
            Status::Down => "DOWN",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of feeding one probe result into the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    pub status: Status,
    /// Whether this evaluation changed the status.
    pub changed: bool,
    pub message: String,
    pub uptime: String,
    pub downtime: String,
}

/// Last known status plus the timing bookkeeping around it.
///
/// Owned by exactly one worker; every mutation goes through [`evaluate`](Self::evaluate).
#[derive(Debug, Clone, Default)]
pub struct ConnectionState {
    status: Status,
    last_status_time: Option<DateTime<Local>>,
    last_up_time: Option<DateTime<Local>>,
    last_down_time: Option<DateTime<Local>>,
    current_uptime: Duration,
    previous_uptime: Duration,
    previous_downtime: Duration,
    connection_changes: u64,
}

impl ConnectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one probe outcome observed at `now`.
    pub fn evaluate(&mut self, probe_succeeded: bool, now: DateTime<Local>) -> Evaluation {
        let evaluation = if probe_succeeded {
            self.on_success(now)
        } else {
            self.on_failure(now)
        };

        self.status = evaluation.status;
        self.last_status_time = Some(now);
        evaluation
    }

    fn on_failure(&mut self, now: DateTime<Local>) -> Evaluation {
        let changed = self.status != Status::Down;
        let message = if changed {
            self.last_down_time = Some(now);
            self.previous_uptime = elapsed_since(self.last_up_time, now);
            self.connection_changes += 1;
            format!(
                "Connection lost after {} uptime",
                format_duration(self.previous_uptime)
            )
        } else {
            self.current_uptime = Duration::ZERO;
            "Connection still down".to_string()
        };

        Evaluation {
            status: Status::Down,
            changed,
            message,
            uptime: format_duration(self.previous_uptime),
            downtime: format_duration(elapsed_since(self.last_down_time, now)),
        }
    }

    fn on_success(&mut self, now: DateTime<Local>) -> Evaluation {
        let changed = self.status != Status::Up;
        let message = if changed {
            self.last_up_time = Some(now);
            self.previous_downtime = elapsed_since(self.last_down_time, now);
            self.connection_changes += 1;
            format!(
                "Connection restored after {} downtime",
                format_duration(self.previous_downtime)
            )
        } else {
            self.current_uptime = elapsed_since(self.last_up_time, now);
            "Connection stable".to_string()
        };

        Evaluation {
            status: Status::Up,
            changed,
            message,
            uptime: format_duration(elapsed_since(self.last_up_time, now)),
            downtime: format_duration(self.previous_downtime),
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn last_status_time(&self) -> Option<DateTime<Local>> {
        self.last_status_time
    }

    pub fn last_up_time(&self) -> Option<DateTime<Local>> {
        self.last_up_time
    }

    pub fn last_down_time(&self) -> Option<DateTime<Local>> {
        self.last_down_time
    }

    /// Length of the ongoing up interval as of the last stable check.
    pub fn current_uptime(&self) -> Duration {
        self.current_uptime
    }

    pub fn previous_uptime(&self) -> Duration {
        self.previous_uptime
    }

    pub fn previous_downtime(&self) -> Duration {
        self.previous_downtime
    }

    pub fn connection_changes(&self) -> u64 {
        self.connection_changes
    }
}

/// Time elapsed from `since` to `now`; zero when `since` was never set or lies
/// after `now` (wall clock stepped backwards).
fn elapsed_since(since: Option<DateTime<Local>>, now: DateTime<Local>) -> Duration {
    since
        .and_then(|t| now.signed_duration_since(t).to_std().ok())
        .unwrap_or(Duration::ZERO)
}
