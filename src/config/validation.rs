use super::{AppConfig, ConfigError};

const MIN_SNIPPET_BYTES: usize = 64;
const MAX_SNIPPET_BYTES: usize = 64 * 1024;

const VALID_LOG_LEVELS: &[&str] = &["DEBUG", "INFO", "WARNING", "WARN", "ERROR", "CRITICAL", "DISABLED"];

/// Validate the full application config, returning an error if any rule is violated.
///
/// # Errors
///
/// Returns [`ConfigError::Validation`] when any configuration invariant is violated.
pub fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    validate_server_config(config)?;
    validate_repair_config(config)?;
    validate_log_level(config)?;
    Ok(())
}

fn validation_err(msg: impl Into<String>) -> ConfigError {
    ConfigError::Validation(msg.into())
}

fn validate_server_config(config: &AppConfig) -> Result<(), ConfigError> {
    let server = &config.server;
    if server.max_body_bytes == 0 {
        return Err(validation_err("server.max_body_bytes must be greater than 0"));
    }
    if let Some(worker_threads) = server.runtime_worker_threads {
        if worker_threads == 0 {
            return Err(validation_err(
                "server.runtime_worker_threads must be greater than 0 when set",
            ));
        }
    }
    Ok(())
}

fn validate_repair_config(config: &AppConfig) -> Result<(), ConfigError> {
    let repair = &config.repair;
    if !(MIN_SNIPPET_BYTES..=MAX_SNIPPET_BYTES).contains(&repair.snippet_max_bytes) {
        return Err(validation_err(format!(
            "repair.snippet_max_bytes must be between {MIN_SNIPPET_BYTES} and {MAX_SNIPPET_BYTES}"
        )));
    }
    for (index, tail) in repair.extra_latex_tails.iter().enumerate() {
        if tail.tail.is_empty() {
            return Err(validation_err(format!(
                "repair.extra_latex_tails[{index}]: tail cannot be empty"
            )));
        }
        if !tail.tail.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(validation_err(format!(
                "repair.extra_latex_tails[{index}]: tail '{}' must contain only ASCII letters",
                tail.tail
            )));
        }
    }
    Ok(())
}

fn validate_log_level(config: &AppConfig) -> Result<(), ConfigError> {
    let level = config.features.log_level.to_uppercase();
    if !VALID_LOG_LEVELS.contains(&level.as_str()) {
        return Err(validation_err(format!(
            "Invalid log_level '{}'. Must be one of: {}",
            config.features.log_level,
            VALID_LOG_LEVELS.join(", ")
        )));
    }
    Ok(())
}
