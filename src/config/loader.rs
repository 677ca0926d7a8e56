//! Configuration loader with TOML parsing and environment variable
//! overrides

use super::schema::StrataConfig;
use crate::domain::errors::StrataError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// The file is read, `${VAR}` placeholders are substituted from the
/// environment, the TOML is parsed, `STRATA_*` environment overrides are
/// applied, and the result is validated.
pub fn load_config(path: impl AsRef<Path>) -> Result<StrataConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(StrataError::Configuration(format!(
            "configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        StrataError::Configuration(format!(
            "failed to read configuration file {}: {e}",
            path.display()
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: StrataConfig = toml::from_str(&contents)
        .map_err(|e| StrataError::Configuration(format!("failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config);

    config
        .validate()
        .map_err(|e| StrataError::Configuration(format!("configuration validation failed: {e}")))?;

    Ok(config)
}

/// Substitutes environment variables in the format `${VAR_NAME}`
///
/// Comment lines are left untouched. A referenced variable that is not
/// set is an error.
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| StrataError::Configuration(e.to_string()))?;
    let mut result = String::new();
    let mut missing_vars = Vec::new();

    for line in input.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{var_name}}}");
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.contains(&var_name.to_string()) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(StrataError::Configuration(format!(
            "missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using the `STRATA_*` prefix
///
/// Variables follow the pattern `STRATA_<SECTION>_<KEY>`, for example
/// `STRATA_SOURCE_FIXTURE_DIR` or `STRATA_RETRY_MAX_ATTEMPTS`.
fn apply_env_overrides(config: &mut StrataConfig) {
    if let Ok(val) = std::env::var("STRATA_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    if let Ok(val) = std::env::var("STRATA_SOURCE_FIXTURE_DIR") {
        config.source.fixture_dir = val;
    }
    if let Ok(val) = std::env::var("STRATA_SOURCE_CONNECT_TIMEOUT_SECS") {
        if let Ok(secs) = val.parse() {
            config.source.connect_timeout_secs = secs;
        }
    }
    if let Ok(val) = std::env::var("STRATA_SOURCE_COMMAND_TIMEOUT_SECS") {
        if let Ok(secs) = val.parse() {
            config.source.command_timeout_secs = secs;
        }
    }

    if let Ok(val) = std::env::var("STRATA_EXPORT_OUTPUT_DIR") {
        config.export.output_dir = val;
    }
    if let Ok(val) = std::env::var("STRATA_EXPORT_FILE_PREFIX") {
        config.export.file_prefix = val;
    }
    if let Ok(val) = std::env::var("STRATA_EXPORT_WINDOW_MONTHS") {
        if let Ok(months) = val.parse() {
            config.export.window_months = months;
        }
    }

    if let Ok(val) = std::env::var("STRATA_RETRY_MAX_ATTEMPTS") {
        if let Ok(attempts) = val.parse() {
            config.retry.max_attempts = attempts;
        }
    }
    if let Ok(val) = std::env::var("STRATA_RETRY_BASE_DELAY_SECS") {
        if let Ok(secs) = val.parse() {
            config.retry.base_delay_secs = secs;
        }
    }
    if let Ok(val) = std::env::var("STRATA_RETRY_MAX_ROUNDS") {
        if let Ok(rounds) = val.parse() {
            config.retry.max_rounds = rounds;
        }
    }

    if let Ok(val) = std::env::var("STRATA_STATE_PATH") {
        config.state.path = val;
    }
    if let Ok(val) = std::env::var("STRATA_STATE_EXECUTION_LOG") {
        config.state.execution_log = val;
    }

    if let Ok(val) = std::env::var("STRATA_VALIDATION_TOLERANCE_PCT") {
        if let Ok(pct) = val.parse() {
            config.validation.tolerance_pct = pct;
        }
    }
    if let Ok(val) = std::env::var("STRATA_VALIDATION_REPORT_DIR") {
        config.validation.report_dir = val;
    }

    if let Ok(val) = std::env::var("STRATA_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("STRATA_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_substitute_env_vars() {
        std::env::set_var("STRATA_TEST_SUB_VAR", "fixtures/live");
        let input = "fixture_dir = \"${STRATA_TEST_SUB_VAR}\"";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, "fixture_dir = \"fixtures/live\"\n");
        std::env::remove_var("STRATA_TEST_SUB_VAR");
    }

    #[test]
    fn test_substitute_env_vars_missing() {
        std::env::remove_var("STRATA_TEST_MISSING_VAR");
        let input = "fixture_dir = \"${STRATA_TEST_MISSING_VAR}\"";
        assert!(substitute_env_vars(input).is_err());
    }

    #[test]
    fn test_substitution_skips_comments() {
        std::env::remove_var("STRATA_TEST_COMMENTED_VAR");
        let input = "# fixture_dir = \"${STRATA_TEST_COMMENTED_VAR}\"";
        let result = substitute_env_vars(input).unwrap();
        assert!(result.contains("STRATA_TEST_COMMENTED_VAR"));
    }

    #[test]
    fn test_load_config_missing_file() {
        assert!(load_config("nonexistent.toml").is_err());
    }

    #[test]
    fn test_load_config_valid() {
        let toml_content = r#"
[application]
log_level = "debug"

[source]
fixture_dir = "fixtures"

[export]
output_dir = "out"
formats = ["csv", "json"]

[retry]
max_attempts = 3
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.application.log_level, "debug");
        assert_eq!(config.source.fixture_dir, "fixtures");
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.max_rounds, 10);
    }

    #[test]
    fn test_load_config_invalid_values() {
        let toml_content = r#"
[application]
log_level = "loud"

[source]
fixture_dir = "fixtures"

[export]
output_dir = "out"
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        assert!(load_config(temp_file.path()).is_err());
    }
}
