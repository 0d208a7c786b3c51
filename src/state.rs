mod request_id;

use crate::config::{AppConfig, ConfigError};
use crate::repair::ResponseRepairer;

use request_id::RequestIdGenerator;

/// Shared application state accessible to all handlers.
pub struct AppState {
    pub config: AppConfig,
    pub repairer: ResponseRepairer,
    request_ids: RequestIdGenerator,
}

impl AppState {
    #[must_use]
    pub fn new(config: AppConfig, repairer: ResponseRepairer) -> Self {
        Self {
            config,
            repairer,
            request_ids: RequestIdGenerator::new(),
        }
    }

    /// Build state whose repairer follows `config.repair`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] when the configured LaTeX tails do
    /// not compile.
    pub fn from_config(config: AppConfig) -> Result<Self, ConfigError> {
        let repairer = config.repair.build_repairer()?;
        Ok(Self::new(config, repairer))
    }

    /// Next request id, rendered as a hyphenated UUID.
    #[must_use]
    pub fn next_request_id(&self) -> String {
        self.request_ids.next_uuid().hyphenated().to_string()
    }
}
