pub mod validation;

use serde::{Deserialize, Serialize};

use self::validation::validate_config;
use crate::repair::pipeline::DEFAULT_SNIPPET_MAX_BYTES;
use crate::repair::{LatexRepairTable, LatexTail, ResponseRepairer};

/// Error type for configuration loading and validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default)]
    pub base_path: String,
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime_worker_threads: Option<usize>,
}

fn default_port() -> u16 {
    8080
}
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_max_body_bytes() -> usize {
    4 * 1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            base_path: String::new(),
            max_body_bytes: default_max_body_bytes(),
            runtime_worker_threads: None,
        }
    }
}

/// Repair pipeline settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepairConfig {
    /// Upper bound on the raw-text snippet kept for diagnostics.
    #[serde(default = "default_snippet_max_bytes")]
    pub snippet_max_bytes: usize,
    /// LaTeX tails added on top of the built-in table.
    #[serde(default)]
    pub extra_latex_tails: Vec<LatexTail>,
}

fn default_snippet_max_bytes() -> usize {
    DEFAULT_SNIPPET_MAX_BYTES
}

impl Default for RepairConfig {
    fn default() -> Self {
        Self {
            snippet_max_bytes: default_snippet_max_bytes(),
            extra_latex_tails: Vec::new(),
        }
    }
}

impl RepairConfig {
    /// Build the repairer described by this config.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] when an extra tail cannot be
    /// compiled.
    pub fn build_repairer(&self) -> Result<ResponseRepairer, ConfigError> {
        let table = LatexRepairTable::with_extra_tails(&self.extra_latex_tails).map_err(|e| {
            ConfigError::Validation(format!("repair.extra_latex_tails: {e}"))
        })?;
        Ok(ResponseRepairer::new(table, self.snippet_max_bytes))
    }
}

/// Feature flags and settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeaturesConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "INFO".to_string()
}

impl Default for FeaturesConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub repair: RepairConfig,
    #[serde(default)]
    pub features: FeaturesConfig,
}

/// Load configuration from a YAML file and validate it.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] when reading the file fails, [`ConfigError::Yaml`]
/// when parsing fails, or [`ConfigError::Validation`] when semantic validation fails.
pub fn load_config(path: &str) -> Result<AppConfig, ConfigError> {
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

/// Parse and validate configuration from YAML text.
///
/// # Errors
///
/// Same as [`load_config`], minus the I/O case.
pub fn parse_config(contents: &str) -> Result<AppConfig, ConfigError> {
    let config: AppConfig = serde_yaml::from_str(contents)?;
    validate_config(&config)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repair::ControlChar;

    #[test]
    fn test_load_example_config() {
        let config = load_config("config.example.yaml");
        assert!(
            config.is_ok(),
            "Failed to load example config: {:?}",
            config.err()
        );
        let config = config.unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.repair.snippet_max_bytes, 1500);
        assert_eq!(config.repair.extra_latex_tails.len(), 2);
        assert_eq!(config.features.log_level, "INFO");
    }

    #[test]
    fn test_empty_document_takes_defaults() {
        let config = parse_config("{}").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.max_body_bytes, 4 * 1024 * 1024);
        assert_eq!(config.repair.snippet_max_bytes, DEFAULT_SNIPPET_MAX_BYTES);
        assert!(config.repair.extra_latex_tails.is_empty());
    }

    #[test]
    fn test_extra_tails_parse() {
        let config = parse_config(
            "repair:\n  extra_latex_tails:\n    - control: formfeed\n      tail: box\n    - control: newline\n      tail: u\n      boundary: true\n",
        )
        .unwrap();
        let tails = &config.repair.extra_latex_tails;
        assert_eq!(tails[0], LatexTail::new(ControlChar::Formfeed, "box", false));
        assert_eq!(tails[1], LatexTail::new(ControlChar::Newline, "u", true));
    }

    #[test]
    fn test_build_repairer_extends_table() {
        let config = RepairConfig {
            snippet_max_bytes: 512,
            extra_latex_tails: vec![LatexTail::new(ControlChar::Tab, "extbf", false)],
        };
        let repairer = config.build_repairer().unwrap();
        assert_eq!(repairer.snippet_max_bytes(), 512);
        assert_eq!(
            repairer.table().tail_count(),
            LatexRepairTable::seed().tail_count() + 1
        );
    }
}
