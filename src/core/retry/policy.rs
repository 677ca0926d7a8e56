//! Differentiated retry strategy
//!
//! Each error category gets its own delay curve and per-attempt connection
//! settings. Session errors retry fast because a fresh connection is
//! expected to clear them; timeout and memory errors back off harder with
//! every attempt so an already-stressed source is not hammered.

use crate::core::classify::ErrorCategory;
use crate::core::retry::ledger::FailedPeriod;
use std::time::Duration;

/// Cap for the quick-retry delay applied to session errors, in seconds
const SESSION_RETRY_CAP_SECS: u64 = 10;

/// Per-attempt connect timeout step for timeout errors, in seconds
const TIMEOUT_CONNECT_STEP_SECS: u64 = 60;

/// Per-attempt command timeout step for timeout errors, in seconds
const TIMEOUT_COMMAND_STEP_SECS: u64 = 1800;

/// Shortened command timeout for memory errors, to fail fast rather
/// than hang
const MEMORY_COMMAND_TIMEOUT_SECS: u64 = 300;

/// Immutable per-attempt retry parameters
///
/// Built fresh for every retry so no timeout tweak leaks across attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryStrategy {
    pub connect_timeout: Duration,
    pub command_timeout: Duration,
    pub wait_before_retry: bool,
    pub clear_memory: bool,
}

/// Retry decision engine
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
    default_connect_timeout: Duration,
    default_command_timeout: Duration,
}

impl RetryPolicy {
    pub fn new(
        max_attempts: u32,
        base_delay: Duration,
        default_connect_timeout: Duration,
        default_command_timeout: Duration,
    ) -> Self {
        Self {
            max_attempts,
            base_delay,
            default_connect_timeout,
            default_command_timeout,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    /// Delay to wait before retrying this failure
    ///
    /// Session errors retry quickly (capped at 10s); timeout and memory
    /// delays grow with the attempt count; everything else waits the flat
    /// base delay.
    pub fn retry_delay(&self, entry: &FailedPeriod) -> Duration {
        let base = self.base_delay.as_secs();
        let attempts = u64::from(entry.attempt_count);

        let secs = match entry.category {
            ErrorCategory::SessionExpired => base.min(SESSION_RETRY_CAP_SECS),
            ErrorCategory::ConnectionTimeout => base * attempts,
            ErrorCategory::MemoryError => 2 * base * attempts,
            _ => base,
        };
        Duration::from_secs(secs)
    }

    /// Build the per-attempt strategy for this failure
    pub fn strategy(&self, entry: &FailedPeriod) -> RetryStrategy {
        let mut strategy = RetryStrategy {
            connect_timeout: self.default_connect_timeout,
            command_timeout: self.default_command_timeout,
            wait_before_retry: true,
            clear_memory: false,
        };

        let scale = u64::from(entry.attempt_count) + 1;
        match entry.category {
            ErrorCategory::SessionExpired => {
                // A fresh connection is enough; no point waiting.
                strategy.wait_before_retry = false;
            }
            ErrorCategory::ConnectionTimeout => {
                strategy.connect_timeout = Duration::from_secs(TIMEOUT_CONNECT_STEP_SECS * scale);
                strategy.command_timeout = Duration::from_secs(TIMEOUT_COMMAND_STEP_SECS * scale);
            }
            ErrorCategory::MemoryError => {
                strategy.clear_memory = true;
                strategy.command_timeout = Duration::from_secs(MEMORY_COMMAND_TIMEOUT_SECS);
            }
            _ => {}
        }
        strategy
    }

    /// Whether this failure is still eligible for another attempt
    pub fn eligible(&self, entry: &FailedPeriod) -> bool {
        entry.attempt_count < self.max_attempts
    }
}
