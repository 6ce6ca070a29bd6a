//! Connection monitoring subsystem.
//!
//! # Data Flow
//! ```text
//! worker.rs (periodic timer, single owner)
//!     → check.rs (one cycle)
//!         → prober.rs (ping the target, bounded by timeout)
//!         → state.rs (UP/DOWN transitions, duration bookkeeping)
//!         → CheckResult
//!     → store::LogAppender (one CSV row)
//! ```
//!
//! # Design Decisions
//! - Cycles are strictly sequential; the state is never shared
//! - Probe failures are the DOWN signal, not errors
//! - The first observation always counts as a transition

pub mod check;
pub mod duration;
pub mod prober;
pub mod state;
pub mod worker;

pub use check::{CheckExecutor, CheckResult, FAILED_LATENCY_MS};
pub use duration::format_duration;
pub use prober::{PingProber, ProbeOutcome, ProbeTarget, Prober};
pub use state::{ConnectionState, Evaluation, Status};
pub use worker::CheckWorker;
