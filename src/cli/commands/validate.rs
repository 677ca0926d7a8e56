//! Validate-config command implementation

use crate::config::load_config;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        match load_config(config_path) {
            Ok(config) => {
                println!("Configuration is valid: {config_path}");
                println!("  Source:    {} ({:?})", config.source.fixture_dir, config.source.provider);
                println!("  Output:    {}", config.export.output_dir);
                println!(
                    "  Window:    {} months, retries: {} attempts / {} rounds",
                    config.export.window_months,
                    config.retry.max_attempts,
                    config.retry.max_rounds
                );
                Ok(0)
            }
            Err(e) => {
                eprintln!("Configuration invalid: {e}");
                Ok(2)
            }
        }
    }
}
