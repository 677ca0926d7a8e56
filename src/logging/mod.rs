//! Logging and observability
//!
//! Structured logging via `tracing`: console output always, plus an
//! optional JSON-formatted rolling file.

pub mod structured;

pub use structured::{init_logging, LoggingGuard};
