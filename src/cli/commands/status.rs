//! Status command implementation

use crate::config::load_config;
use crate::core::state::StateStore;
use clap::Args;

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Also print recent execution log entries
    #[arg(long)]
    pub history: bool,
}

impl StatusArgs {
    /// Execute the status command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let config = match load_config(config_path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Configuration error: {e}");
                return Ok(2);
            }
        };

        let store = StateStore::new(
            &config.state.path,
            &config.state.execution_log,
            config.retry.base_delay_secs,
        );

        match store.read()? {
            None => {
                println!("No retry state: the last run finished clean.");
            }
            Some(state) => {
                println!("Retry state saved {}", state.last_saved);
                println!(
                    "{} period(s) pending retry (max {} attempts):",
                    state.failed_months.len(),
                    state.settings.max_retry_attempts
                );
                for failure in &state.failed_months {
                    println!(
                        "  {}-{:02}  attempts={}  {}  first failed {}",
                        failure.year,
                        failure.month,
                        failure.attempt_count,
                        failure.error_type,
                        failure.first_error_time
                    );
                }
            }
        }

        if self.history {
            let log_path = std::path::Path::new(&config.state.execution_log);
            if log_path.exists() {
                let contents = std::fs::read_to_string(log_path)?;
                let entries: Vec<serde_json::Value> = serde_json::from_str(&contents)?;
                println!();
                println!("Last {} run(s):", entries.len().min(5));
                for entry in entries.iter().rev().take(5) {
                    println!("  {}", serde_json::to_string(entry)?);
                }
            } else {
                println!();
                println!("No execution log yet.");
            }
        }

        Ok(0)
    }
}
