//! Pipeline orchestration
//!
//! Drives the whole run: an initial pass over the processing window, then
//! bounded retry rounds that handle cheap validation-only retries before
//! full re-extractions. Periods run strictly one at a time so only one
//! month's data is ever materialized.

use crate::adapters::source::ConnectOptions;
use crate::core::processor::{AttemptMode, PeriodProcessor};
use crate::core::retry::{FailureLedger, RetryPolicy};
use crate::core::state::StateStore;
use crate::core::summary::PipelineSummary;
use crate::domain::{Period, PeriodResult, Result, StrataError};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::sync::watch;

/// Settle pause after a memory-category failure, before reconnecting
const MEMORY_SETTLE_PAUSE: Duration = Duration::from_secs(2);

pub struct Orchestrator {
    processor: PeriodProcessor,
    policy: RetryPolicy,
    ledger: FailureLedger,
    state: StateStore,
    defaults: ConnectOptions,
    max_rounds: u32,
    report_dir: PathBuf,
    shutdown: watch::Receiver<bool>,
}

impl Orchestrator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        processor: PeriodProcessor,
        policy: RetryPolicy,
        state: StateStore,
        defaults: ConnectOptions,
        max_rounds: u32,
        report_dir: impl Into<PathBuf>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        let ledger = FailureLedger::new(policy.max_attempts());
        Self {
            processor,
            policy,
            ledger,
            state,
            defaults,
            max_rounds,
            report_dir: report_dir.into(),
            shutdown,
        }
    }

    /// Run the pipeline over a chronological window of periods
    pub async fn run(mut self, window: Vec<Period>) -> Result<PipelineSummary> {
        let (Some(&window_start), Some(&window_end)) = (window.first(), window.last()) else {
            return Err(StrataError::Configuration(
                "processing window is empty".to_string(),
            ));
        };

        let started = Instant::now();
        let mut totals = RunTotals::default();

        // Failures persisted by a previous run re-enter as full retries.
        self.state.load(&mut self.ledger);

        tracing::info!(
            window_start = %window_start,
            window_end = %window_end,
            periods = window.len(),
            carried_over = self.ledger.len(),
            "Starting pipeline run"
        );

        for &period in &window {
            if self.shutdown_requested() {
                totals.interrupted = true;
                break;
            }
            let result = self
                .processor
                .process(period, &self.defaults, AttemptMode::Full)
                .await;
            totals.absorb(&mut self.ledger, result);
        }

        if !totals.interrupted {
            self.retry_rounds(&mut totals).await;
        }

        self.finish(window, window_start, window_end, started, totals)
    }

    async fn retry_rounds(&mut self, totals: &mut RunTotals) {
        let mut round = 0;
        while !self.ledger.is_empty() && round < self.max_rounds {
            if self.shutdown_requested() {
                totals.interrupted = true;
                return;
            }
            round += 1;

            let validation_only = self.ledger.validation_only_candidates();
            // Re-read after the validation pass; it may demote entries.
            if validation_only.is_empty() && self.ledger.full_retry_candidates().is_empty() {
                tracing::info!(
                    remaining = self.ledger.len(),
                    "No retry candidates left, stopping retry rounds"
                );
                return;
            }

            tracing::info!(
                round,
                max_rounds = self.max_rounds,
                validation_only = validation_only.len(),
                "Retry round starting"
            );

            for entry in validation_only {
                if self.shutdown_requested() {
                    totals.interrupted = true;
                    return;
                }
                let Some(artifact) = entry.artifact_path.clone() else {
                    self.ledger.demote_to_full(entry.period);
                    continue;
                };
                if !artifact.exists() {
                    tracing::warn!(
                        period = %entry.period,
                        artifact = %artifact.display(),
                        "Exported artifact is gone, falling back to full retry"
                    );
                    self.ledger.demote_to_full(entry.period);
                    continue;
                }
                let result = self
                    .processor
                    .process(
                        entry.period,
                        &self.defaults,
                        AttemptMode::ValidationOnly { artifact },
                    )
                    .await;
                totals.absorb(&mut self.ledger, result);
            }

            for entry in self.ledger.full_retry_candidates() {
                if self.shutdown_requested() {
                    totals.interrupted = true;
                    return;
                }
                let strategy = self.policy.strategy(&entry);
                if strategy.wait_before_retry {
                    let delay = self.policy.retry_delay(&entry);
                    tracing::info!(
                        period = %entry.period,
                        category = %entry.category,
                        attempt = entry.attempt_count + 1,
                        delay_secs = delay.as_secs(),
                        "Waiting before full retry"
                    );
                    tokio::time::sleep(delay).await;
                }
                if strategy.clear_memory {
                    tokio::time::sleep(MEMORY_SETTLE_PAUSE).await;
                }
                let options =
                    ConnectOptions::new(strategy.connect_timeout, strategy.command_timeout);
                let result = self
                    .processor
                    .process(entry.period, &options, AttemptMode::Full)
                    .await;
                totals.absorb(&mut self.ledger, result);
            }
        }

        if !self.ledger.is_empty() && round >= self.max_rounds {
            tracing::warn!(
                remaining = self.ledger.len(),
                rounds = round,
                "Retry round budget exhausted with failures remaining"
            );
        }
    }

    fn finish(
        self,
        window: Vec<Period>,
        window_start: Period,
        window_end: Period,
        started: Instant,
        totals: RunTotals,
    ) -> Result<PipelineSummary> {
        if !self.processor.reconciler().records().is_empty() {
            if let Err(e) = self.processor.reconciler().save_report(&self.report_dir) {
                tracing::warn!(error = %e, "Could not save validation report");
            }
        }

        if self.ledger.is_empty() {
            if let Err(e) = self.state.clear() {
                tracing::warn!(error = %e, "Could not clear retry state");
            }
        } else if let Err(e) = self.state.save(&self.ledger) {
            tracing::warn!(error = %e, "Could not persist retry state");
        }

        let summary = PipelineSummary {
            window_start,
            window_end,
            periods_total: window.len(),
            successful: totals.successful,
            total_rows: totals.rows,
            total_bytes: totals.bytes,
            duration: started.elapsed(),
            ledger: self.ledger.summary(),
            interrupted: totals.interrupted,
        };

        if let Err(e) = self.state.append_execution_log(summary.to_log_entry()) {
            tracing::warn!(error = %e, "Could not append execution log");
        }

        summary.log_summary();
        Ok(summary)
    }

    fn shutdown_requested(&self) -> bool {
        *self.shutdown.borrow()
    }
}

#[derive(Default)]
struct RunTotals {
    successful: Vec<Period>,
    rows: usize,
    bytes: u64,
    interrupted: bool,
}

impl RunTotals {
    /// Fold one attempt result into the ledger and the running totals
    fn absorb(&mut self, ledger: &mut FailureLedger, result: PeriodResult) {
        if result.is_complete() {
            ledger.remove(result.period);
            self.successful.push(result.period);
            self.rows += result.rows;
            self.bytes += result.memory_bytes;
        } else {
            ledger.record_failure(&result);
        }
    }
}
