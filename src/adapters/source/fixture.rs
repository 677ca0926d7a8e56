//! Filesystem-backed source
//!
//! Resolves each rendered query as a JSON table document under a fixture
//! directory. This is the built-in provider: it makes the pipeline fully
//! runnable against local data and is also what the integration tests
//! drive. A missing document maps to [`SourceError::NotFound`].

use super::{AnalyticsSource, ConnectOptions, SourceSession};
use crate::domain::{DataTable, SourceError};
use async_trait::async_trait;
use std::path::PathBuf;

/// Source that serves JSON table documents from a directory
#[derive(Debug, Clone)]
pub struct FixtureSource {
    root: PathBuf,
}

impl FixtureSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl AnalyticsSource for FixtureSource {
    async fn connect(
        &self,
        _options: &ConnectOptions,
    ) -> Result<Box<dyn SourceSession>, SourceError> {
        if !self.root.is_dir() {
            return Err(SourceError::ConnectionFailed(format!(
                "fixture directory not found: {}",
                self.root.display()
            )));
        }
        Ok(Box::new(FixtureSession {
            root: self.root.clone(),
        }))
    }
}

struct FixtureSession {
    root: PathBuf,
}

#[async_trait]
impl SourceSession for FixtureSession {
    async fn execute(&mut self, query: &str) -> Result<DataTable, SourceError> {
        let path = self.root.join(query.trim());
        let contents = tokio::fs::read_to_string(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SourceError::NotFound(path.display().to_string())
            } else {
                SourceError::QueryFailed(format!("{}: {e}", path.display()))
            }
        })?;

        serde_json::from_str(&contents)
            .map_err(|e| SourceError::InvalidFormat(format!("{}: {e}", path.display())))
    }
}
