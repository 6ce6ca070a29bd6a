//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Validated config → Initialize log file → Bind API → Spawn API + worker
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop ticking → Await current check → Drain API (bounded) → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then storage, then listeners
//! - Ordered shutdown: no new checks, then no new requests, then drain
//! - Shutdown has timeout: a missed drain deadline is reported, not retried

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{StartupError, StopError, Watchdog};
