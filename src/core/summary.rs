//! End-of-run reporting

use crate::core::retry::LedgerSummary;
use crate::domain::Period;
use std::time::Duration;

/// Aggregated outcome of one pipeline run
#[derive(Debug)]
pub struct PipelineSummary {
    pub window_start: Period,
    pub window_end: Period,
    pub periods_total: usize,
    pub successful: Vec<Period>,
    pub total_rows: usize,
    pub total_bytes: u64,
    pub duration: Duration,
    pub ledger: LedgerSummary,
    pub interrupted: bool,
}

impl PipelineSummary {
    pub fn failed_count(&self) -> usize {
        self.ledger.total_failures
    }

    pub fn has_permanent_failures(&self) -> bool {
        self.ledger.permanent_failures > 0
    }

    pub fn total_mb(&self) -> f64 {
        self.total_bytes as f64 / (1024.0 * 1024.0)
    }

    /// Human-readable report for the console
    pub fn print_report(&self) {
        println!();
        println!("=== Pipeline run summary ===");
        println!("Window:        {} .. {}", self.window_start, self.window_end);
        println!(
            "Periods:       {} total, {} succeeded, {} failed",
            self.periods_total,
            self.successful.len(),
            self.failed_count()
        );
        println!("Rows exported: {}", self.total_rows);
        println!("Data volume:   {:.1} MB", self.total_mb());
        println!("Elapsed:       {:.1}s", self.duration.as_secs_f64());
        if self.interrupted {
            println!("NOTE: run was interrupted before finishing");
        }

        if self.failed_count() > 0 {
            println!();
            println!("Failures by category:");
            for (category, count) in &self.ledger.error_breakdown {
                println!("  {category}: {count}");
            }
            if !self.ledger.max_attempts_reached.is_empty() {
                let periods: Vec<String> = self
                    .ledger
                    .max_attempts_reached
                    .iter()
                    .map(|p| p.to_string())
                    .collect();
                println!("Permanently failed: {}", periods.join(", "));
            }
            if self.ledger.retry_eligible > 0 {
                println!(
                    "{} period(s) still eligible for retry on the next run",
                    self.ledger.retry_eligible
                );
            }
        }
    }

    pub fn log_summary(&self) {
        tracing::info!(
            window_start = %self.window_start,
            window_end = %self.window_end,
            periods = self.periods_total,
            succeeded = self.successful.len(),
            failed = self.failed_count(),
            permanent_failures = self.ledger.permanent_failures,
            total_rows = self.total_rows,
            total_mb = format!("{:.1}", self.total_mb()),
            elapsed_secs = self.duration.as_secs(),
            interrupted = self.interrupted,
            "Pipeline run finished"
        );
    }

    /// Entry for the persisted execution log
    pub fn to_log_entry(&self) -> serde_json::Value {
        serde_json::json!({
            "window_start": self.window_start.to_string(),
            "window_end": self.window_end.to_string(),
            "periods_total": self.periods_total,
            "periods_succeeded": self.successful.len(),
            "periods_failed": self.failed_count(),
            "permanent_failures": self.ledger.permanent_failures,
            "total_rows": self.total_rows,
            "total_bytes": self.total_bytes,
            "duration_secs": self.duration.as_secs(),
            "interrupted": self.interrupted,
            "error_breakdown": self.ledger.error_breakdown,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::retry::FailureLedger;
    use crate::domain::{PeriodResult, ProcessingStage};

    fn summary_with_failure() -> PipelineSummary {
        let mut ledger = FailureLedger::new(1);
        let mut result = PeriodResult::new(Period::new(2025, 6));
        result.error_message = Some("connection timed out".to_string());
        result.last_stage = ProcessingStage::Export;
        ledger.record_failure(&result);

        PipelineSummary {
            window_start: Period::new(2024, 8),
            window_end: Period::new(2025, 7),
            periods_total: 12,
            successful: vec![Period::new(2025, 7)],
            total_rows: 1234,
            total_bytes: 2 * 1024 * 1024,
            duration: Duration::from_secs(90),
            ledger: ledger.summary(),
            interrupted: false,
        }
    }

    #[test]
    fn test_permanent_failure_detection() {
        let summary = summary_with_failure();
        assert!(summary.has_permanent_failures());
        assert_eq!(summary.failed_count(), 1);
    }

    #[test]
    fn test_log_entry_shape() {
        let entry = summary_with_failure().to_log_entry();
        assert_eq!(entry["periods_total"], 12);
        assert_eq!(entry["periods_succeeded"], 1);
        assert_eq!(entry["periods_failed"], 1);
        assert_eq!(entry["permanent_failures"], 1);
        assert_eq!(entry["duration_secs"], 90);
        assert_eq!(entry["error_breakdown"]["connection_timeout"], 1);
    }
}
