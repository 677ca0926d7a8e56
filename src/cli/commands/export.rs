//! Export command implementation

use crate::adapters::sinks::build_sinks;
use crate::adapters::source::{ConnectOptions, FixtureSource, QueryTemplate};
use crate::config::{load_config, SourceProvider, StrataConfig};
use crate::core::processor::PeriodProcessor;
use crate::core::retry::RetryPolicy;
use crate::core::state::StateStore;
use crate::core::validation::Reconciler;
use crate::core::Orchestrator;
use crate::domain::Period;
use clap::Args;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Arguments for the export command
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Year of the last month in the processing window (defaults to the
    /// current year)
    #[arg(long)]
    pub end_year: Option<i32>,

    /// Month of the last month in the processing window, 1-12 (defaults
    /// to the current month)
    #[arg(long)]
    pub end_month: Option<u32>,

    /// Override the number of months in the window
    #[arg(long)]
    pub months: Option<u32>,
}

impl ExportArgs {
    /// Execute the export command, returning the process exit code
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!("Starting export command");

        let mut config = match load_config(config_path) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!(error = %e, "Configuration error");
                eprintln!("Configuration error: {e}");
                return Ok(2);
            }
        };

        if let Some(months) = self.months {
            tracing::info!(months, "Overriding window length from CLI");
            config.export.window_months = months;
        }

        let window = match self.window(&config) {
            Ok(window) => window,
            Err(message) => {
                eprintln!("{message}");
                return Ok(2);
            }
        };

        if !self.yes {
            let (Some(start), Some(end)) = (window.first(), window.last()) else {
                eprintln!("Processing window is empty");
                return Ok(2);
            };
            println!("Export configuration:");
            println!("  Window:     {start} .. {end} ({} months)", window.len());
            println!("  Output dir: {}", config.export.output_dir);
            println!(
                "  Formats:    {}",
                config
                    .export
                    .formats
                    .iter()
                    .map(|f| f.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
            println!("  Tolerance:  {}%", config.validation.tolerance_pct);
            println!();
            print!("Proceed with export? [y/N]: ");
            use std::io::{self, Write};
            io::stdout().flush()?;

            let mut input = String::new();
            io::stdin().read_line(&mut input)?;
            if !input.trim().eq_ignore_ascii_case("y") {
                println!("Export cancelled.");
                return Ok(0);
            }
        }

        let orchestrator = build_orchestrator(&config, shutdown_signal);
        let summary = orchestrator.run(window).await?;
        summary.print_report();

        if summary.has_permanent_failures() {
            Ok(3)
        } else if summary.failed_count() > 0 || summary.interrupted {
            Ok(1)
        } else {
            Ok(0)
        }
    }

    /// Resolve the processing window from CLI arguments and configuration
    fn window(&self, config: &StrataConfig) -> Result<Vec<Period>, String> {
        let current = Period::current();
        let year = self.end_year.unwrap_or(current.year);
        let month = self.end_month.unwrap_or(current.month);
        if !(1..=12).contains(&month) {
            return Err(format!("invalid --end-month {month}: must be 1-12"));
        }
        // The CLI --months override is applied after load_config, so the
        // schema's window_months check does not cover it.
        if config.export.window_months == 0 {
            return Err("invalid window length 0: need at least one month".to_string());
        }
        Ok(Period::window_ending(
            Period::new(year, month),
            config.export.window_months,
        ))
    }
}

fn build_orchestrator(
    config: &StrataConfig,
    shutdown_signal: watch::Receiver<bool>,
) -> Orchestrator {
    let source = match config.source.provider {
        SourceProvider::Fixture => Arc::new(FixtureSource::new(&config.source.fixture_dir)),
    };

    let processor = PeriodProcessor::new(
        source,
        build_sinks(&config.export.formats),
        QueryTemplate::new(config.queries.extract.as_str()),
        QueryTemplate::new(config.queries.validate.as_str()),
        Reconciler::new(config.validation.tolerance_pct),
        &config.export.output_dir,
        config.export.file_prefix.as_str(),
    );

    let defaults = ConnectOptions::new(
        Duration::from_secs(config.source.connect_timeout_secs),
        Duration::from_secs(config.source.command_timeout_secs),
    );

    let policy = RetryPolicy::new(
        config.retry.max_attempts,
        Duration::from_secs(config.retry.base_delay_secs),
        defaults.connect_timeout,
        defaults.command_timeout,
    );

    let state = StateStore::new(
        &config.state.path,
        &config.state.execution_log,
        config.retry.base_delay_secs,
    );

    Orchestrator::new(
        processor,
        policy,
        state,
        defaults,
        config.retry.max_rounds,
        &config.validation.report_dir,
        shutdown_signal,
    )
}
