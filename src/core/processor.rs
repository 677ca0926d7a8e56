//! Single-period processing
//!
//! Runs one attempt for one calendar month: extract, export to every
//! configured sink, then reconcile against the authoritative aggregate.
//! An attempt never propagates an error; whatever goes wrong is folded
//! into the returned [`PeriodResult`] so the orchestrator can classify
//! and retry it.

use crate::adapters::sinks::{load_artifact, ExportFormat, ExportSink};
use crate::adapters::source::{AnalyticsSource, ConnectOptions, QueryTemplate};
use crate::core::validation::sum::table_sum;
use crate::core::validation::Reconciler;
use crate::domain::{DataTable, Period, PeriodResult, ProcessingStage, Result, StrataError};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

/// How an attempt runs
#[derive(Debug, Clone)]
pub enum AttemptMode {
    /// Extract, export, and validate from scratch
    Full,
    /// Reload the existing artifact and re-run validation only
    ValidationOnly { artifact: PathBuf },
}

/// Processes one period at a time
pub struct PeriodProcessor {
    source: Arc<dyn AnalyticsSource>,
    sinks: Vec<Box<dyn ExportSink>>,
    extract_query: QueryTemplate,
    validation_query: QueryTemplate,
    reconciler: Reconciler,
    output_dir: PathBuf,
    file_prefix: String,
}

impl PeriodProcessor {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        source: Arc<dyn AnalyticsSource>,
        sinks: Vec<Box<dyn ExportSink>>,
        extract_query: QueryTemplate,
        validation_query: QueryTemplate,
        reconciler: Reconciler,
        output_dir: impl Into<PathBuf>,
        file_prefix: impl Into<String>,
    ) -> Self {
        Self {
            source,
            sinks,
            extract_query,
            validation_query,
            reconciler,
            output_dir: output_dir.into(),
            file_prefix: file_prefix.into(),
        }
    }

    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    /// Run one attempt; errors are captured in the result, never raised
    pub async fn process(
        &mut self,
        period: Period,
        options: &ConnectOptions,
        mode: AttemptMode,
    ) -> PeriodResult {
        let started = Instant::now();
        let mut result = PeriodResult::new(period);

        tracing::info!(period = %period, mode = ?mode_label(&mode), "Processing period");

        let outcome = match mode {
            AttemptMode::Full => self.attempt_full(&mut result, options).await,
            AttemptMode::ValidationOnly { artifact } => {
                self.attempt_validation_only(&mut result, options, artifact)
                    .await
            }
        };

        if let Err(e) = outcome {
            result.error_message = Some(e.to_string());
            tracing::warn!(
                period = %period,
                stage = %result.last_stage,
                error = %e,
                "Period attempt failed"
            );
        } else {
            tracing::info!(
                period = %period,
                rows = result.rows,
                memory_mb = format!("{:.1}", result.memory_mb()),
                elapsed_secs = started.elapsed().as_secs(),
                "Period complete"
            );
        }
        result
    }

    async fn attempt_full(
        &mut self,
        result: &mut PeriodResult,
        options: &ConnectOptions,
    ) -> Result<()> {
        let period = result.period;
        let mut session = self.source.connect(options).await?;

        let table = session.execute(&self.extract_query.render(period)).await?;
        result.rows = table.row_count();
        result.memory_bytes = table.estimated_bytes();

        // An empty month is legitimate (no activity), not a failure.
        if table.is_empty() {
            tracing::info!(period = %period, "No rows for period, nothing to export");
            result.export_success = true;
            result.validation_success = true;
            result.advance_stage(ProcessingStage::Complete);
            return Ok(());
        }

        std::fs::create_dir_all(&self.output_dir)?;
        let stem = format!("{}_{}", self.file_prefix, period.filename_suffix());
        for sink in &self.sinks {
            let path = sink.export(&table, &self.output_dir, &stem)?;
            tracing::debug!(period = %period, path = %path.display(), "Exported");
            // Prefer the JSON artifact for reloads; fall back to CSV.
            let is_better = match sink.format() {
                ExportFormat::Json => true,
                ExportFormat::Csv => result.artifact_path.is_none(),
                ExportFormat::Xlsx => false,
            };
            if is_better {
                result.artifact_path = Some(path);
            }
        }
        result.export_success = true;
        result.advance_stage(ProcessingStage::Validation);

        self.validate(result, session.as_mut(), &table).await?;

        // Table can be multi-MB; release it before the next period.
        drop(table);
        Ok(())
    }

    async fn attempt_validation_only(
        &mut self,
        result: &mut PeriodResult,
        options: &ConnectOptions,
        artifact: PathBuf,
    ) -> Result<()> {
        // Export already succeeded in an earlier attempt.
        result.export_success = true;
        result.artifact_path = Some(artifact.clone());
        result.advance_stage(ProcessingStage::Validation);

        let table = load_artifact(&artifact)?;
        result.rows = table.row_count();
        result.memory_bytes = table.estimated_bytes();

        let mut session = self.source.connect(options).await?;
        self.validate(result, session.as_mut(), &table).await
    }

    async fn validate(
        &mut self,
        result: &mut PeriodResult,
        session: &mut dyn crate::adapters::source::SourceSession,
        table: &DataTable,
    ) -> Result<()> {
        let period = result.period;
        let authoritative = session
            .execute(&self.validation_query.render(period))
            .await?;

        let record = self.reconciler.validate(
            period,
            table_sum(&authoritative),
            table_sum(table),
            table.row_count(),
        );

        if !record.validation_passed {
            return Err(StrataError::Validation(format!(
                "reconciliation mismatch for {period}: {:.4}% difference exceeds tolerance",
                record.percentage_difference
            )));
        }

        result.validation_success = true;
        result.advance_stage(ProcessingStage::Complete);
        Ok(())
    }
}

fn mode_label(mode: &AttemptMode) -> &'static str {
    match mode {
        AttemptMode::Full => "full",
        AttemptMode::ValidationOnly { .. } => "validation_only",
    }
}
