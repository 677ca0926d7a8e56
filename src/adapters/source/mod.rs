//! Analytical source abstraction
//!
//! The pipeline talks to its remote source through a pair of object-safe
//! traits: [`AnalyticsSource`] opens a session with per-attempt timeouts,
//! and [`SourceSession`] executes rendered queries against it. A session
//! lives for exactly one processing attempt, so a retry always starts from
//! a fresh connection.

pub mod fixture;
pub mod query;

use crate::domain::{DataTable, SourceError};
use async_trait::async_trait;
use std::time::Duration;

pub use fixture::FixtureSource;
pub use query::QueryTemplate;

/// Per-attempt connection settings
///
/// Retry strategies tune these between attempts; the defaults come from
/// configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectOptions {
    pub connect_timeout: Duration,
    pub command_timeout: Duration,
}

impl ConnectOptions {
    pub fn new(connect_timeout: Duration, command_timeout: Duration) -> Self {
        Self {
            connect_timeout,
            command_timeout,
        }
    }
}

/// A connectable analytical source
#[async_trait]
pub trait AnalyticsSource: Send + Sync {
    /// Open a fresh session honoring the given timeouts
    async fn connect(
        &self,
        options: &ConnectOptions,
    ) -> Result<Box<dyn SourceSession>, SourceError>;
}

/// An open session against the source
#[async_trait]
pub trait SourceSession: Send {
    /// Execute a rendered query and materialize the result set
    async fn execute(&mut self, query: &str) -> Result<DataTable, SourceError>;
}
