//! Retry policy and failure tracking
//!
//! The [`RetryPolicy`] decides whether, when, and how a failed period is
//! retried; the [`FailureLedger`](ledger::FailureLedger) tracks which
//! periods are currently failing and how far each one got.

pub mod ledger;
pub mod policy;

pub use ledger::{FailedPeriod, FailureLedger, LedgerSummary};
pub use policy::{RetryPolicy, RetryStrategy};
