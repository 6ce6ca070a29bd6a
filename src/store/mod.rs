//! Connection log subsystem.
//!
//! # Data Flow
//! ```text
//! Write path (check worker):
//!     CheckResult → appender.rs → one CSV row appended (file reopened per row)
//!
//! Read path (HTTP API):
//!     reader.rs → whole file parsed → Vec<LogRecord> (column → value)
//! ```
//!
//! # Design Decisions
//! - The file is the only history; nothing is cached in memory
//! - No lock between writer and reader: a reader may see the file one row
//!   behind, header-only, or empty, and must cope
//! - Rows whose field count differs from the header are kept as-is: extra
//!   fields are dropped, missing ones are simply absent

use thiserror::Error;

pub mod appender;
pub mod reader;

pub use appender::LogAppender;
pub use reader::{LogReader, LogRecord};

/// Column names, in file order.
pub const COLUMNS: [&str; 7] = [
    "timestamp",
    "status",
    "latency",
    "uptime",
    "downtime",
    "total_changes",
    "message",
];

/// First line of every log file.
pub const HEADER: &str = "timestamp,status,latency,uptime,downtime,total_changes,message\n";

/// Errors raised by the connection log.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("log file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("log file could not be parsed: {0}")]
    Parse(#[from] csv::Error),
}
