//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! optional TOML file
//!     → loader.rs (parse & deserialize, defaults for missing fields)
//!     → cli.rs (command-line flags override file values)
//!     → validation.rs (semantic checks)
//!     → WatchdogConfig (validated, immutable)
//!     → handed by value to the worker and the API server
//! ```
//!
//! # Design Decisions
//! - Config is immutable once validated; there is no process-wide mutable copy
//! - All fields have defaults so an empty file (or no file) is valid
//! - Validation separates syntactic (serde/clap) from semantic checks

pub mod cli;
pub mod loader;
pub mod schema;
pub mod validation;

pub use cli::CliArgs;
pub use loader::{load_config, ConfigError};
pub use schema::{ApiConfig, LogFormat, MonitorConfig, ObservabilityConfig, WatchdogConfig};
pub use validation::{validate_config, ValidationError};
