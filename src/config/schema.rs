//! Configuration schema types

use crate::adapters::sinks::ExportFormat;
use serde::{Deserialize, Serialize};

/// Root configuration, mapped from the TOML file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrataConfig {
    /// Application-level settings
    pub application: ApplicationConfig,

    /// Analytical source settings
    pub source: SourceConfig,

    /// Export settings
    pub export: ExportConfig,

    /// Query templates
    #[serde(default)]
    pub queries: QueriesConfig,

    /// Retry behavior
    #[serde(default)]
    pub retry: RetryConfig,

    /// Persisted state locations
    #[serde(default)]
    pub state: StateConfig,

    /// Reconciliation settings
    #[serde(default)]
    pub validation: ValidationConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl StrataConfig {
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.source.validate()?;
        self.export.validate()?;
        self.retry.validate()?;
        self.validation.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
            other => Err(format!("invalid log_level '{other}'")),
        }
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Source provider selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceProvider {
    /// JSON table documents under `fixture_dir`
    #[default]
    Fixture,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default)]
    pub provider: SourceProvider,

    /// Directory the fixture provider serves documents from
    pub fixture_dir: String,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_command_timeout_secs")]
    pub command_timeout_secs: u64,
}

impl SourceConfig {
    fn validate(&self) -> Result<(), String> {
        if self.fixture_dir.trim().is_empty() {
            return Err("source.fixture_dir must not be empty".to_string());
        }
        if self.command_timeout_secs == 0 {
            return Err("source.command_timeout_secs must be positive".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Directory export files are written to
    pub output_dir: String,

    /// Filename prefix for exported slices
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,

    /// Formats to write, in order
    #[serde(default = "default_formats")]
    pub formats: Vec<ExportFormat>,

    /// Number of months in the processing window, ending at the target
    /// period
    #[serde(default = "default_window_months")]
    pub window_months: u32,
}

impl ExportConfig {
    fn validate(&self) -> Result<(), String> {
        if self.output_dir.trim().is_empty() {
            return Err("export.output_dir must not be empty".to_string());
        }
        if self.formats.is_empty() {
            return Err("export.formats must not be empty".to_string());
        }
        // Validation-only retries need an artifact that can be read back.
        if !self.formats.iter().any(|f| f.reloadable()) {
            return Err(
                "export.formats must include at least one re-loadable format (csv or json)"
                    .to_string(),
            );
        }
        if self.window_months == 0 {
            return Err("export.window_months must be positive".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueriesConfig {
    /// Extraction query template
    #[serde(default = "default_extract_query")]
    pub extract: String,

    /// Validation query template returning the authoritative aggregate
    #[serde(default = "default_validate_query")]
    pub validate: String,
}

impl Default for QueriesConfig {
    fn default() -> Self {
        Self {
            extract: default_extract_query(),
            validate: default_validate_query(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Attempts per period before it is declared permanently failed
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Base retry delay; categories scale it
    #[serde(default = "default_base_delay_secs")]
    pub base_delay_secs: u64,

    /// Upper bound on retry rounds per run
    #[serde(default = "default_max_rounds")]
    pub max_rounds: u32,
}

impl RetryConfig {
    fn validate(&self) -> Result<(), String> {
        if self.max_attempts == 0 {
            return Err("retry.max_attempts must be positive".to_string());
        }
        if self.max_rounds == 0 {
            return Err("retry.max_rounds must be positive".to_string());
        }
        Ok(())
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_secs: default_base_delay_secs(),
            max_rounds: default_max_rounds(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateConfig {
    /// Retry state file
    #[serde(default = "default_state_path")]
    pub path: String,

    /// Execution log file
    #[serde(default = "default_execution_log")]
    pub execution_log: String,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            path: default_state_path(),
            execution_log: default_execution_log(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Pass threshold as a percentage
    #[serde(default = "default_tolerance_pct")]
    pub tolerance_pct: f64,

    /// Directory validation reports are written to
    #[serde(default = "default_report_dir")]
    pub report_dir: String,
}

impl ValidationConfig {
    fn validate(&self) -> Result<(), String> {
        if self.tolerance_pct <= 0.0 {
            return Err("validation.tolerance_pct must be positive".to_string());
        }
        Ok(())
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            tolerance_pct: default_tolerance_pct(),
            report_dir: default_report_dir(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Whether to also log to a rolling local file
    #[serde(default)]
    pub local_enabled: bool,

    /// Directory for local log files
    #[serde(default = "default_log_path")]
    pub local_path: String,

    /// Rotation: "daily", "hourly", or "never"
    #[serde(default = "default_log_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        match self.local_rotation.as_str() {
            "daily" | "hourly" | "never" => Ok(()),
            other => Err(format!("invalid logging.local_rotation '{other}'")),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_log_path(),
            local_rotation: default_log_rotation(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_connect_timeout_secs() -> u64 {
    30
}

fn default_command_timeout_secs() -> u64 {
    600
}

fn default_file_prefix() -> String {
    "slice".to_string()
}

fn default_formats() -> Vec<ExportFormat> {
    vec![ExportFormat::Csv, ExportFormat::Json, ExportFormat::Xlsx]
}

fn default_window_months() -> u32 {
    12
}

fn default_extract_query() -> String {
    "extract_{year}_{month02}.json".to_string()
}

fn default_validate_query() -> String {
    "validate_{year}_{month02}.json".to_string()
}

fn default_max_attempts() -> u32 {
    5
}

fn default_base_delay_secs() -> u64 {
    30
}

fn default_max_rounds() -> u32 {
    10
}

fn default_state_path() -> String {
    "state/retry_state.json".to_string()
}

fn default_execution_log() -> String {
    "state/execution_log.json".to_string()
}

fn default_tolerance_pct() -> f64 {
    0.01
}

fn default_report_dir() -> String {
    "reports".to_string()
}

fn default_log_path() -> String {
    "logs".to_string()
}

fn default_log_rotation() -> String {
    "daily".to_string()
}
