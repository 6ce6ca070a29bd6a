//! Connection watchdog library.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod monitor;
pub mod observability;
pub mod store;

pub use config::WatchdogConfig;
pub use http::ApiServer;
pub use lifecycle::{Shutdown, Watchdog};
pub use monitor::{CheckExecutor, CheckResult, ConnectionState, Status};
