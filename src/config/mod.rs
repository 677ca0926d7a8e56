//! Configuration management
//!
//! TOML-based configuration with environment variable substitution
//! (`${VAR_NAME}`), `STRATA_*` overrides, defaults for optional settings,
//! and validation on load.
//!
//! # Example configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [source]
//! fixture_dir = "fixtures"
//!
//! [export]
//! output_dir = "out"
//! formats = ["csv", "json", "xlsx"]
//! window_months = 12
//!
//! [retry]
//! max_attempts = 5
//! base_delay_secs = 30
//! ```

pub mod loader;
pub mod schema;

pub use loader::load_config;
pub use schema::{
    ApplicationConfig, ExportConfig, LoggingConfig, QueriesConfig, RetryConfig, SourceConfig,
    SourceProvider, StateConfig, StrataConfig, ValidationConfig,
};
