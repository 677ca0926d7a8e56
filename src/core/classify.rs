//! Error classification
//!
//! Maps a raw failure message to a coarse [`ErrorCategory`] by
//! case-insensitive keyword matching. Matching is order-sensitive: the
//! keyword groups are checked in a fixed priority (session > timeout >
//! memory > data) and the first matching group wins, even if a message
//! could match several.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse cause of a processing failure, drives the retry strategy
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    SessionExpired,
    ConnectionTimeout,
    MemoryError,
    DataError,
    #[default]
    Unknown,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorCategory::SessionExpired => "session_expired",
            ErrorCategory::ConnectionTimeout => "connection_timeout",
            ErrorCategory::MemoryError => "memory_error",
            ErrorCategory::DataError => "data_error",
            ErrorCategory::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

const SESSION_KEYWORDS: [&str; 4] = [
    "session",
    "expired",
    "session id cannot be found",
    "session does not exist",
];

const TIMEOUT_KEYWORDS: [&str; 4] = [
    "timeout",
    "timed out",
    "connection lost",
    "connection either timed out",
];

const MEMORY_KEYWORDS: [&str; 4] = [
    "memory",
    "out of memory",
    "memoryerror",
    "insufficient memory",
];

const DATA_KEYWORDS: [&str; 3] = ["data", "dataset", "query execution"];

/// Classify a failure message into an [`ErrorCategory`]
///
/// Pure function of the message: deterministic and total, defaulting to
/// [`ErrorCategory::Unknown`] when nothing matches.
pub fn classify(message: &str) -> ErrorCategory {
    let lowered = message.to_lowercase();
    let matches_any = |keywords: &[&str]| keywords.iter().any(|k| lowered.contains(k));

    if matches_any(&SESSION_KEYWORDS) {
        ErrorCategory::SessionExpired
    } else if matches_any(&TIMEOUT_KEYWORDS) {
        ErrorCategory::ConnectionTimeout
    } else if matches_any(&MEMORY_KEYWORDS) {
        ErrorCategory::MemoryError
    } else if matches_any(&DATA_KEYWORDS) {
        ErrorCategory::DataError
    } else {
        ErrorCategory::Unknown
    }
}
