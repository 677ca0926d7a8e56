//! Failure ledger
//!
//! In-memory registry of currently-failing periods. Each period has at
//! most one live entry; the entry is created on first failure, updated in
//! place on every re-failure, and removed on success. Entries carry enough
//! stage information to tell a cheap validation-only retry apart from a
//! full re-extraction.

use crate::core::classify::{classify, ErrorCategory};
use crate::domain::{Period, PeriodResult, ProcessingStage};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// One currently-failing period
#[derive(Debug, Clone, PartialEq)]
pub struct FailedPeriod {
    pub period: Period,
    pub error_message: String,
    pub category: ErrorCategory,
    pub failed_stage: ProcessingStage,
    pub attempt_count: u32,
    pub first_error_time: DateTime<Utc>,
    pub last_attempt_time: DateTime<Utc>,
    pub export_success: bool,
    pub validation_success: bool,
    /// Path to an already-exported artifact, when one survived the failure
    pub artifact_path: Option<PathBuf>,
}

impl FailedPeriod {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        period: Period,
        error_message: String,
        category: ErrorCategory,
        failed_stage: ProcessingStage,
        export_success: bool,
        validation_success: bool,
        artifact_path: Option<PathBuf>,
    ) -> Self {
        let now = Utc::now();
        Self {
            period,
            error_message,
            category,
            failed_stage,
            attempt_count: 1,
            first_error_time: now,
            last_attempt_time: now,
            export_success,
            validation_success,
            artifact_path,
        }
    }

    /// A full retry is needed when export never finished
    pub fn needs_full_retry(&self) -> bool {
        self.failed_stage == ProcessingStage::Export || !self.export_success
    }

    /// Only validation failed and the exported artifact is still known,
    /// so the expensive extraction can be skipped
    pub fn validation_only_eligible(&self) -> bool {
        self.failed_stage == ProcessingStage::Validation
            && self.export_success
            && self.artifact_path.is_some()
    }
}

/// Aggregated view of the ledger for reporting
#[derive(Debug, Clone, Serialize)]
pub struct LedgerSummary {
    pub total_failures: usize,
    pub permanent_failures: usize,
    pub retry_eligible: usize,
    pub validation_only_failures: usize,
    pub full_retry_needed: usize,
    pub error_breakdown: BTreeMap<ErrorCategory, usize>,
    pub stage_breakdown: BTreeMap<String, usize>,
    pub max_attempts_reached: Vec<Period>,
}

/// Registry of failing periods keyed by period
///
/// Iteration order is chronological (BTreeMap), which keeps retry rounds
/// and reports deterministic.
#[derive(Debug)]
pub struct FailureLedger {
    max_attempts: u32,
    entries: BTreeMap<Period, FailedPeriod>,
}

impl FailureLedger {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            entries: BTreeMap::new(),
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Record a failed attempt
    ///
    /// Inserts a new entry on first failure; on re-failure increments the
    /// attempt count and refreshes message, category, stage, and success
    /// flags. `first_error_time` is set exactly once. An artifact path in
    /// the result replaces the stored one; an absent path leaves any
    /// earlier artifact in place.
    pub fn record_failure(&mut self, result: &PeriodResult) {
        let message = result
            .error_message
            .clone()
            .unwrap_or_else(|| "unknown error".to_string());
        let category = classify(&message);

        match self.entries.get_mut(&result.period) {
            Some(entry) => {
                entry.attempt_count += 1;
                entry.last_attempt_time = Utc::now();
                entry.error_message = message;
                entry.category = category;
                entry.failed_stage = result.last_stage;
                entry.export_success = result.export_success;
                entry.validation_success = result.validation_success;
                if result.artifact_path.is_some() {
                    entry.artifact_path = result.artifact_path.clone();
                }
            }
            None => {
                self.entries.insert(
                    result.period,
                    FailedPeriod::new(
                        result.period,
                        message,
                        category,
                        result.last_stage,
                        result.export_success,
                        result.validation_success,
                        result.artifact_path.clone(),
                    ),
                );
            }
        }
    }

    /// Restore an entry loaded from persisted state
    pub fn restore(&mut self, entry: FailedPeriod) {
        self.entries.insert(entry.period, entry);
    }

    /// Remove a period after it finally succeeded
    pub fn remove(&mut self, period: Period) {
        self.entries.remove(&period);
    }

    pub fn get(&self, period: Period) -> Option<&FailedPeriod> {
        self.entries.get(&period)
    }

    pub fn entries(&self) -> impl Iterator<Item = &FailedPeriod> {
        self.entries.values()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Periods that only need their validation re-run, excluding
    /// exhausted entries
    pub fn validation_only_candidates(&self) -> Vec<FailedPeriod> {
        self.entries
            .values()
            .filter(|e| e.validation_only_eligible() && e.attempt_count < self.max_attempts)
            .cloned()
            .collect()
    }

    /// Periods that need full re-processing, excluding exhausted entries
    pub fn full_retry_candidates(&self) -> Vec<FailedPeriod> {
        self.entries
            .values()
            .filter(|e| e.needs_full_retry() && e.attempt_count < self.max_attempts)
            .cloned()
            .collect()
    }

    /// Demote a validation-only entry to a full retry
    ///
    /// Used when the recorded artifact no longer exists on disk; the entry
    /// forgets the artifact and its export success so it re-enters the
    /// full-retry pool.
    pub fn demote_to_full(&mut self, period: Period) {
        if let Some(entry) = self.entries.get_mut(&period) {
            entry.artifact_path = None;
            entry.export_success = false;
        }
    }

    /// Entries that exhausted their attempts
    pub fn permanent_failures(&self) -> Vec<&FailedPeriod> {
        self.entries
            .values()
            .filter(|e| e.attempt_count >= self.max_attempts)
            .collect()
    }

    pub fn summary(&self) -> LedgerSummary {
        let mut error_breakdown: BTreeMap<ErrorCategory, usize> = BTreeMap::new();
        let mut stage_breakdown: BTreeMap<String, usize> = BTreeMap::new();
        for entry in self.entries.values() {
            *error_breakdown.entry(entry.category).or_insert(0) += 1;
            *stage_breakdown
                .entry(entry.failed_stage.to_string())
                .or_insert(0) += 1;
        }

        LedgerSummary {
            total_failures: self.entries.len(),
            permanent_failures: self.permanent_failures().len(),
            retry_eligible: self
                .entries
                .values()
                .filter(|e| e.attempt_count < self.max_attempts)
                .count(),
            validation_only_failures: self.validation_only_candidates().len(),
            full_retry_needed: self.full_retry_candidates().len(),
            error_breakdown,
            stage_breakdown,
            max_attempts_reached: self.permanent_failures().iter().map(|e| e.period).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn failed_result(period: Period, message: &str, stage: ProcessingStage) -> PeriodResult {
        let mut result = PeriodResult::new(period);
        result.error_message = Some(message.to_string());
        result.last_stage = stage;
        result
    }

    #[test]
    fn test_first_failure_creates_entry_with_one_attempt() {
        let mut ledger = FailureLedger::new(5);
        ledger.record_failure(&failed_result(
            Period::new(2025, 3),
            "connection timed out",
            ProcessingStage::Export,
        ));

        let entry = ledger.get(Period::new(2025, 3)).unwrap();
        assert_eq!(entry.attempt_count, 1);
        assert_eq!(entry.category, ErrorCategory::ConnectionTimeout);
        assert_eq!(entry.first_error_time, entry.last_attempt_time);
    }

    #[test]
    fn test_repeat_failure_increments_and_keeps_first_error_time() {
        let mut ledger = FailureLedger::new(5);
        let result = failed_result(
            Period::new(2025, 3),
            "session expired",
            ProcessingStage::Export,
        );

        ledger.record_failure(&result);
        let first_time = ledger.get(result.period).unwrap().first_error_time;

        ledger.record_failure(&result);
        ledger.record_failure(&result);

        let entry = ledger.get(result.period).unwrap();
        assert_eq!(entry.attempt_count, 3);
        assert_eq!(entry.first_error_time, first_time);
        assert!(entry.last_attempt_time >= first_time);
    }

    #[test]
    fn test_refailure_refreshes_message_category_and_stage() {
        let mut ledger = FailureLedger::new(5);
        let period = Period::new(2025, 3);

        ledger.record_failure(&failed_result(period, "timed out", ProcessingStage::Export));

        let mut second = failed_result(period, "out of memory", ProcessingStage::Validation);
        second.export_success = true;
        ledger.record_failure(&second);

        let entry = ledger.get(period).unwrap();
        assert_eq!(entry.category, ErrorCategory::MemoryError);
        assert_eq!(entry.failed_stage, ProcessingStage::Validation);
        assert!(entry.export_success);
        assert_eq!(entry.attempt_count, 2);
    }

    #[test]
    fn test_artifact_path_is_sticky() {
        let mut ledger = FailureLedger::new(5);
        let period = Period::new(2025, 3);

        let mut with_artifact = failed_result(period, "mismatch", ProcessingStage::Validation);
        with_artifact.export_success = true;
        with_artifact.artifact_path = Some(PathBuf::from("/tmp/slice.json"));
        ledger.record_failure(&with_artifact);

        // A later failure without a path must not erase the artifact.
        let mut without = failed_result(period, "mismatch again", ProcessingStage::Validation);
        without.export_success = true;
        ledger.record_failure(&without);

        assert_eq!(
            ledger.get(period).unwrap().artifact_path,
            Some(PathBuf::from("/tmp/slice.json"))
        );
    }

    #[test]
    fn test_remove_on_success() {
        let mut ledger = FailureLedger::new(5);
        let period = Period::new(2025, 3);
        ledger.record_failure(&failed_result(period, "boom", ProcessingStage::Export));
        assert_eq!(ledger.len(), 1);

        ledger.remove(period);
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_candidate_views_split_by_stage() {
        let mut ledger = FailureLedger::new(5);

        // Validation failure with an artifact: validation-only candidate.
        let mut validation = failed_result(
            Period::new(2025, 1),
            "reconciliation mismatch",
            ProcessingStage::Validation,
        );
        validation.export_success = true;
        validation.artifact_path = Some(PathBuf::from("/tmp/a.json"));
        ledger.record_failure(&validation);

        // Export failure: full retry candidate.
        ledger.record_failure(&failed_result(
            Period::new(2025, 2),
            "timed out",
            ProcessingStage::Export,
        ));

        // Validation failure without artifact: full retry (export not reusable).
        let no_artifact = failed_result(
            Period::new(2025, 3),
            "reconciliation mismatch",
            ProcessingStage::Validation,
        );
        ledger.record_failure(&no_artifact);

        let validation_only = ledger.validation_only_candidates();
        assert_eq!(validation_only.len(), 1);
        assert_eq!(validation_only[0].period, Period::new(2025, 1));

        let full = ledger.full_retry_candidates();
        assert_eq!(full.len(), 2);
    }

    #[test]
    fn test_exhausted_entries_are_excluded_from_candidates() {
        let mut ledger = FailureLedger::new(2);
        let result = failed_result(Period::new(2025, 4), "timed out", ProcessingStage::Export);
        ledger.record_failure(&result);
        ledger.record_failure(&result);

        assert!(ledger.full_retry_candidates().is_empty());
        assert_eq!(ledger.permanent_failures().len(), 1);
    }

    #[test]
    fn test_demote_to_full() {
        let mut ledger = FailureLedger::new(5);
        let mut result = failed_result(
            Period::new(2025, 5),
            "mismatch",
            ProcessingStage::Validation,
        );
        result.export_success = true;
        result.artifact_path = Some(PathBuf::from("/tmp/gone.json"));
        ledger.record_failure(&result);
        assert_eq!(ledger.validation_only_candidates().len(), 1);

        ledger.demote_to_full(Period::new(2025, 5));
        assert!(ledger.validation_only_candidates().is_empty());
        assert_eq!(ledger.full_retry_candidates().len(), 1);
    }

    #[test]
    fn test_summary_breakdowns() {
        let mut ledger = FailureLedger::new(2);
        ledger.record_failure(&failed_result(
            Period::new(2025, 1),
            "timed out",
            ProcessingStage::Export,
        ));
        ledger.record_failure(&failed_result(
            Period::new(2025, 2),
            "request timeout",
            ProcessingStage::Export,
        ));
        let exhausted = failed_result(Period::new(2025, 3), "weird", ProcessingStage::Export);
        ledger.record_failure(&exhausted);
        ledger.record_failure(&exhausted);

        let summary = ledger.summary();
        assert_eq!(summary.total_failures, 3);
        assert_eq!(summary.permanent_failures, 1);
        assert_eq!(summary.retry_eligible, 2);
        assert_eq!(
            summary.error_breakdown.get(&ErrorCategory::ConnectionTimeout),
            Some(&2)
        );
        assert_eq!(summary.max_attempts_reached, vec![Period::new(2025, 3)]);
        assert_eq!(summary.stage_breakdown.get("export"), Some(&3));
    }
}
