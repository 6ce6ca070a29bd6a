//! HTTP API subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, graceful shutdown)
//!     → request.rs (request ID)
//!     → handlers.rs (read the log, render JSON)
//!     → Send to client
//! ```
//!
//! # Design Decisions
//! - Read-only: the API never touches the write path
//! - Every request re-reads the log file; there is no cache to invalidate

pub mod handlers;
pub mod request;
pub mod server;

pub use request::{MakeRequestUuid, X_REQUEST_ID};
pub use server::{ApiServer, AppState, ServeError, CONNECTION_DATA_PATH};
