//! Processing stages and per-attempt results

use crate::domain::period::Period;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Coarse progress marker for a period
///
/// Represents the furthest stage a processing attempt reached. `Export` is
/// the initial stage, `Validation` is reached only after export succeeds,
/// and `Complete` is terminal. Within one attempt the stage never regresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStage {
    #[default]
    Export,
    Validation,
    Complete,
}

impl fmt::Display for ProcessingStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProcessingStage::Export => "export",
            ProcessingStage::Validation => "validation",
            ProcessingStage::Complete => "complete",
        };
        f.write_str(name)
    }
}

/// Result of one processing attempt for a period
///
/// Created fresh per attempt, owned by the processor while the attempt
/// runs, then handed to the orchestrator. A period is complete if and only
/// if both success flags are true.
#[derive(Debug, Clone)]
pub struct PeriodResult {
    pub period: Period,
    pub rows: usize,
    pub memory_bytes: u64,
    pub export_success: bool,
    pub validation_success: bool,
    pub last_stage: ProcessingStage,
    pub error_message: Option<String>,
    /// Path to the re-loadable artifact written during export, if any
    pub artifact_path: Option<PathBuf>,
}

impl PeriodResult {
    pub fn new(period: Period) -> Self {
        Self {
            period,
            rows: 0,
            memory_bytes: 0,
            export_success: false,
            validation_success: false,
            last_stage: ProcessingStage::Export,
            error_message: None,
            artifact_path: None,
        }
    }

    /// Advance the stage marker; the stage never moves backwards within
    /// an attempt.
    pub fn advance_stage(&mut self, stage: ProcessingStage) {
        if stage_rank(stage) >= stage_rank(self.last_stage) {
            self.last_stage = stage;
        }
    }

    pub fn is_complete(&self) -> bool {
        self.last_stage == ProcessingStage::Complete
            && self.export_success
            && self.validation_success
    }

    /// Estimated in-memory footprint in megabytes
    pub fn memory_mb(&self) -> f64 {
        self.memory_bytes as f64 / (1024.0 * 1024.0)
    }
}

fn stage_rank(stage: ProcessingStage) -> u8 {
    match stage {
        ProcessingStage::Export => 0,
        ProcessingStage::Validation => 1,
        ProcessingStage::Complete => 2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_serializes_snake_case() {
        let json = serde_json::to_string(&ProcessingStage::Validation).unwrap();
        assert_eq!(json, "\"validation\"");
    }

    #[test]
    fn test_new_result_starts_at_export() {
        let result = PeriodResult::new(Period::new(2025, 7));
        assert_eq!(result.last_stage, ProcessingStage::Export);
        assert!(!result.export_success);
        assert!(!result.validation_success);
        assert!(!result.is_complete());
    }

    #[test]
    fn test_stage_never_regresses() {
        let mut result = PeriodResult::new(Period::new(2025, 7));
        result.advance_stage(ProcessingStage::Validation);
        result.advance_stage(ProcessingStage::Export);
        assert_eq!(result.last_stage, ProcessingStage::Validation);

        result.advance_stage(ProcessingStage::Complete);
        assert_eq!(result.last_stage, ProcessingStage::Complete);
    }

    #[test]
    fn test_complete_requires_both_flags() {
        let mut result = PeriodResult::new(Period::new(2025, 7));
        result.advance_stage(ProcessingStage::Complete);
        assert!(!result.is_complete());

        result.export_success = true;
        result.validation_success = true;
        assert!(result.is_complete());
    }

    #[test]
    fn test_memory_mb() {
        let mut result = PeriodResult::new(Period::new(2025, 7));
        result.memory_bytes = 5 * 1024 * 1024;
        assert!((result.memory_mb() - 5.0).abs() < f64::EPSILON);
    }
}
