//! Reconciliation engine
//!
//! Compares the aggregate recomputed from extracted data against the
//! authoritative aggregate the source itself reports, and keeps an
//! append-only trail of every comparison so retries stay auditable.

pub mod sum;

use crate::domain::{Period, Result, StrataError};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Outcome of one reconciliation check, never mutated after creation
#[derive(Debug, Clone, Serialize)]
pub struct ValidationRecord {
    pub year: i32,
    pub month: u32,
    pub period_label: String,
    pub authoritative_sum: f64,
    pub extracted_sum: f64,
    pub difference: f64,
    pub percentage_difference: f64,
    pub row_count: usize,
    pub validation_passed: bool,
    pub validation_time: DateTime<Utc>,
}

/// Computes and records reconciliation results
///
/// Re-validating the same period appends a second, distinct record;
/// earlier records are never overwritten.
#[derive(Debug)]
pub struct Reconciler {
    tolerance_pct: f64,
    records: Vec<ValidationRecord>,
}

impl Reconciler {
    /// `tolerance_pct` is the pass threshold as a percentage, e.g. 0.01
    /// for 0.01%.
    pub fn new(tolerance_pct: f64) -> Self {
        Self {
            tolerance_pct,
            records: Vec::new(),
        }
    }

    /// Compare the two aggregates and record the outcome
    ///
    /// The percentage difference is defined as 0 when the authoritative
    /// sum is exactly zero; a non-zero extracted sum against a zero
    /// baseline still passes but is logged loudly, since it can mask a
    /// data-presence error.
    pub fn validate(
        &mut self,
        period: Period,
        authoritative_sum: f64,
        extracted_sum: f64,
        row_count: usize,
    ) -> ValidationRecord {
        let difference = (authoritative_sum - extracted_sum).abs();
        let percentage_difference = if authoritative_sum != 0.0 {
            difference / authoritative_sum * 100.0
        } else {
            0.0
        };
        let validation_passed = percentage_difference < self.tolerance_pct;

        if authoritative_sum == 0.0 && extracted_sum != 0.0 {
            tracing::warn!(
                period = %period,
                extracted_sum,
                "Zero authoritative baseline against non-zero extracted data; \
                 treating percentage difference as 0 by policy"
            );
        }

        let record = ValidationRecord {
            year: period.year,
            month: period.month,
            period_label: period.label(),
            authoritative_sum,
            extracted_sum,
            difference,
            percentage_difference,
            row_count,
            validation_passed,
            validation_time: Utc::now(),
        };

        tracing::info!(
            period = %period,
            authoritative_sum = format!("{authoritative_sum:.2}"),
            extracted_sum = format!("{extracted_sum:.2}"),
            difference = format!("{difference:.2}"),
            percentage = format!("{percentage_difference:.4}%"),
            passed = validation_passed,
            "Reconciliation check"
        );

        self.records.push(record.clone());
        record
    }

    pub fn records(&self) -> &[ValidationRecord] {
        &self.records
    }

    pub fn passed_count(&self) -> usize {
        self.records.iter().filter(|r| r.validation_passed).count()
    }

    pub fn failed_count(&self) -> usize {
        self.records.len() - self.passed_count()
    }

    /// Write all records plus summary totals to a timestamped JSON report
    pub fn save_report(&self, dir: &Path) -> Result<PathBuf> {
        if self.records.is_empty() {
            return Err(StrataError::Validation(
                "no validation results to save".to_string(),
            ));
        }

        fs::create_dir_all(dir)?;
        let path = dir.join(format!(
            "validation_report_{}.json",
            Utc::now().format("%Y%m%d_%H%M%S")
        ));

        let total_authoritative: f64 = self.records.iter().map(|r| r.authoritative_sum).sum();
        let total_extracted: f64 = self.records.iter().map(|r| r.extracted_sum).sum();
        let total_difference: f64 = self.records.iter().map(|r| r.difference).sum();
        let average_pct = self
            .records
            .iter()
            .map(|r| r.percentage_difference)
            .sum::<f64>()
            / self.records.len() as f64;

        let report = serde_json::json!({
            "results": self.records,
            "summary": {
                "total_periods_validated": self.records.len(),
                "validations_passed": self.passed_count(),
                "validations_failed": self.failed_count(),
                "total_authoritative_sum": total_authoritative,
                "total_extracted_sum": total_extracted,
                "total_difference": total_difference,
                "average_percentage_difference": average_pct,
            },
        });

        fs::write(&path, serde_json::to_string_pretty(&report)?)?;
        tracing::info!(path = %path.display(), "Validation report saved");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_small_difference_passes() {
        let mut reconciler = Reconciler::new(0.01);
        let record = reconciler.validate(Period::new(2025, 7), 1000.0, 1000.05, 100);

        assert!((record.percentage_difference - 0.005).abs() < 1e-9);
        assert!(record.validation_passed);
    }

    #[test]
    fn test_large_difference_fails() {
        let mut reconciler = Reconciler::new(0.01);
        let record = reconciler.validate(Period::new(2025, 7), 1000.0, 1001.0, 100);

        assert!((record.percentage_difference - 0.1).abs() < 1e-9);
        assert!(!record.validation_passed);
    }

    #[test]
    fn test_zero_baseline_defined_as_zero_percent() {
        let mut reconciler = Reconciler::new(0.01);
        let record = reconciler.validate(Period::new(2025, 7), 0.0, 123.45, 10);

        assert_eq!(record.percentage_difference, 0.0);
        assert!(record.validation_passed);
    }

    #[test]
    fn test_revalidation_appends_distinct_records() {
        let mut reconciler = Reconciler::new(0.01);
        reconciler.validate(Period::new(2025, 7), 1000.0, 1001.0, 100);
        reconciler.validate(Period::new(2025, 7), 1000.0, 1000.0, 100);

        assert_eq!(reconciler.records().len(), 2);
        assert!(!reconciler.records()[0].validation_passed);
        assert!(reconciler.records()[1].validation_passed);
        assert_eq!(reconciler.passed_count(), 1);
        assert_eq!(reconciler.failed_count(), 1);
    }

    #[test]
    fn test_report_contains_summary() {
        let dir = TempDir::new().unwrap();
        let mut reconciler = Reconciler::new(0.01);
        reconciler.validate(Period::new(2025, 6), 500.0, 500.0, 10);
        reconciler.validate(Period::new(2025, 7), 1000.0, 1001.0, 20);

        let path = reconciler.save_report(dir.path()).unwrap();
        let raw = std::fs::read_to_string(path).unwrap();
        let doc: serde_json::Value = serde_json::from_str(&raw).unwrap();

        assert_eq!(doc["summary"]["total_periods_validated"], 2);
        assert_eq!(doc["summary"]["validations_passed"], 1);
        assert_eq!(doc["summary"]["validations_failed"], 1);
        assert_eq!(doc["results"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_empty_report_is_an_error() {
        let dir = TempDir::new().unwrap();
        let reconciler = Reconciler::new(0.01);
        assert!(reconciler.save_report(dir.path()).is_err());
    }
}
