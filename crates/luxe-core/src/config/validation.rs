use crate::config::AppConfig;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// Credentials are not checked here; adapters call the `require_*`
    /// accessors so that a job for one source does not need another
    /// source's keys.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.aed_to_usd > 0.0 && self.aed_to_usd < 10.0) {
            return Err(ConfigError::Invalid { field: "aed_to_usd".into(), reason: "must be between 0 and 10".into() });
        }

        if self.max_urls == 0 || self.max_urls > 1_000 {
            return Err(ConfigError::Invalid { field: "max_urls".into(), reason: "must be between 1 and 1000".into() });
        }

        if self.request_timeout_ms < 100 || self.request_timeout_ms > 300_000 {
            return Err(ConfigError::Invalid {
                field: "request_timeout_ms".into(),
                reason: "must be between 100ms and 5 minutes".into(),
            });
        }

        if self.idx_limit == 0 || self.idx_limit > 500 {
            return Err(ConfigError::Invalid { field: "idx_limit".into(), reason: "must be between 1 and 500".into() });
        }

        if self.user_agent.is_empty() {
            return Err(ConfigError::Invalid { field: "user_agent".into(), reason: "must not be empty".into() });
        }

        if self.request_delay_ms == 0 {
            tracing::warn!("request_delay_ms is 0; sources will be fetched without a politeness delay");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rate_bounds() {
        let config = AppConfig { aed_to_usd: 0.0, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { field, .. }) if field == "aed_to_usd"));

        let config = AppConfig { aed_to_usd: f64::NAN, ..Default::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_max_urls() {
        let config = AppConfig { max_urls: 0, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { field, .. }) if field == "max_urls"));
    }

    #[test]
    fn test_validate_timeout() {
        let config = AppConfig { request_timeout_ms: 50, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { field, .. }) if field == "request_timeout_ms"));
    }

    #[test]
    fn test_validate_empty_user_agent() {
        let config = AppConfig { user_agent: String::new(), ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { field, .. }) if field == "user_agent"));
    }
}
