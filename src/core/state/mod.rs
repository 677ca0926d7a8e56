//! Durable retry state
//!
//! Serializes the failure ledger to a JSON document so retries survive a
//! process restart, and maintains a small append-only execution log. Both
//! operations are best-effort on the read side: a corrupt or missing file
//! is logged and ignored, never fatal.

use crate::core::classify::ErrorCategory;
use crate::core::retry::{FailedPeriod, FailureLedger};
use crate::domain::{Period, Result, StrataError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Maximum number of entries kept in the execution log
const EXECUTION_LOG_CAP: usize = 100;

/// On-disk retry state document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedState {
    pub last_saved: DateTime<Utc>,
    pub failed_months: Vec<PersistedFailure>,
    pub settings: PersistedSettings,
}

/// One persisted ledger entry
///
/// Only the base failure fields are written; stage information is
/// re-derived on the next run, so a restored entry re-enters the pool as
/// a full retry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedFailure {
    pub year: i32,
    pub month: u32,
    pub error_message: String,
    pub error_type: ErrorCategory,
    pub attempt_count: u32,
    pub last_attempt_time: DateTime<Utc>,
    pub first_error_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedSettings {
    pub max_retry_attempts: u32,
    pub retry_delay_seconds: u64,
}

impl From<&FailedPeriod> for PersistedFailure {
    fn from(entry: &FailedPeriod) -> Self {
        Self {
            year: entry.period.year,
            month: entry.period.month,
            error_message: entry.error_message.clone(),
            error_type: entry.category,
            attempt_count: entry.attempt_count,
            last_attempt_time: entry.last_attempt_time,
            first_error_time: entry.first_error_time,
        }
    }
}

impl PersistedFailure {
    fn into_entry(self) -> FailedPeriod {
        let mut entry = FailedPeriod::new(
            Period::new(self.year, self.month),
            self.error_message,
            self.error_type,
            Default::default(),
            false,
            false,
            None,
        );
        entry.attempt_count = self.attempt_count;
        entry.last_attempt_time = self.last_attempt_time;
        entry.first_error_time = self.first_error_time;
        entry
    }
}

/// Persists the failure ledger and the execution log
#[derive(Debug, Clone)]
pub struct StateStore {
    state_path: PathBuf,
    log_path: PathBuf,
    retry_delay_seconds: u64,
}

impl StateStore {
    pub fn new(
        state_path: impl Into<PathBuf>,
        log_path: impl Into<PathBuf>,
        retry_delay_seconds: u64,
    ) -> Self {
        Self {
            state_path: state_path.into(),
            log_path: log_path.into(),
            retry_delay_seconds,
        }
    }

    pub fn state_path(&self) -> &Path {
        &self.state_path
    }

    /// Save the current ledger to disk
    pub fn save(&self, ledger: &FailureLedger) -> Result<()> {
        let state = PersistedState {
            last_saved: Utc::now(),
            failed_months: ledger.entries().map(PersistedFailure::from).collect(),
            settings: PersistedSettings {
                max_retry_attempts: ledger.max_attempts(),
                retry_delay_seconds: self.retry_delay_seconds,
            },
        };

        self.ensure_parent(&self.state_path)?;
        let json = serde_json::to_string_pretty(&state)?;
        fs::write(&self.state_path, json)
            .map_err(|e| StrataError::State(format!("could not save retry state: {e}")))?;

        tracing::debug!(
            path = %self.state_path.display(),
            entries = state.failed_months.len(),
            "Saved retry state"
        );
        Ok(())
    }

    /// Load persisted state into the ledger, replacing its contents
    ///
    /// Returns `true` when a state file was found and loaded. Read or
    /// parse failures are logged and treated as "no state".
    pub fn load(&self, ledger: &mut FailureLedger) -> bool {
        let state = match self.read() {
            Ok(Some(state)) => state,
            Ok(None) => return false,
            Err(e) => {
                tracing::warn!(
                    path = %self.state_path.display(),
                    error = %e,
                    "Could not load retry state, starting fresh"
                );
                return false;
            }
        };

        ledger.clear();
        let mut restored = 0;
        for failure in state.failed_months {
            // The state file is plain JSON and may have been hand-edited;
            // an out-of-range month would poison every later attempt.
            if !(1..=12).contains(&failure.month) {
                tracing::warn!(
                    year = failure.year,
                    month = failure.month,
                    "Skipping persisted failure with invalid month"
                );
                continue;
            }
            ledger.restore(failure.into_entry());
            restored += 1;
        }

        tracing::info!(
            entries = restored,
            last_saved = %state.last_saved,
            "Restored retry state from previous run"
        );
        true
    }

    /// Read the raw persisted document, if present
    pub fn read(&self) -> Result<Option<PersistedState>> {
        if !self.state_path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&self.state_path)
            .map_err(|e| StrataError::State(format!("could not read retry state: {e}")))?;
        let state = serde_json::from_str(&contents)
            .map_err(|e| StrataError::State(format!("could not parse retry state: {e}")))?;
        Ok(Some(state))
    }

    /// Remove the state file; stale once everything succeeded
    pub fn clear(&self) -> Result<()> {
        if self.state_path.exists() {
            fs::remove_file(&self.state_path)
                .map_err(|e| StrataError::State(format!("could not clear retry state: {e}")))?;
        }
        Ok(())
    }

    /// Append an entry to the execution log, capped to the last 100
    ///
    /// The entry is timestamped at write time. An unreadable existing log
    /// is replaced rather than propagated as an error.
    pub fn append_execution_log(&self, mut entry: serde_json::Value) -> Result<()> {
        let mut log: Vec<serde_json::Value> = if self.log_path.exists() {
            fs::read_to_string(&self.log_path)
                .ok()
                .and_then(|contents| serde_json::from_str(&contents).ok())
                .unwrap_or_default()
        } else {
            Vec::new()
        };

        if let Some(object) = entry.as_object_mut() {
            object.insert(
                "timestamp".to_string(),
                serde_json::json!(Utc::now().to_rfc3339()),
            );
        }
        log.push(entry);

        if log.len() > EXECUTION_LOG_CAP {
            log = log.split_off(log.len() - EXECUTION_LOG_CAP);
        }

        self.ensure_parent(&self.log_path)?;
        fs::write(&self.log_path, serde_json::to_string_pretty(&log)?)
            .map_err(|e| StrataError::State(format!("could not save execution log: {e}")))?;
        Ok(())
    }

    fn ensure_parent(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)
                    .map_err(|e| StrataError::State(format!("could not create state dir: {e}")))?;
            }
        }
        Ok(())
    }
}
