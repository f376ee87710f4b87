//! Ingestion configuration with layered loading.
//!
//! Loading precedence (highest wins):
//! 1. Environment variables (`LUXE_*`)
//! 2. TOML config file (if `LUXE_CONFIG_FILE` is set)
//! 3. Built-in defaults
//!
//! The resulting [`AppConfig`] is passed explicitly to every adapter and job;
//! nothing reads the environment after startup.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// SQLite database holding listings, items and the IDX cache.
    #[serde(default = "default_database")]
    pub database: PathBuf,

    /// Scraping API key. Required by every page-scraping adapter.
    #[serde(default)]
    pub firecrawl_api_key: Option<String>,

    #[serde(default = "default_firecrawl_base_url")]
    pub firecrawl_base_url: String,

    /// Milliseconds the scraping API waits for client-side rendering.
    #[serde(default = "default_wait_for_ms")]
    pub wait_for_ms: u64,

    /// IDX API key and secret (HTTP basic auth). Required by the IDX adapter.
    #[serde(default)]
    pub idx_api_key: Option<String>,

    #[serde(default)]
    pub idx_api_secret: Option<String>,

    #[serde(default = "default_idx_base_url")]
    pub idx_base_url: String,

    /// Alternate IDX endpoint tried when the primary answers non-2xx.
    #[serde(default)]
    pub idx_fallback_url: Option<String>,

    /// Saved search used by the IDX sync job.
    #[serde(default)]
    pub idx_city: Option<String>,

    #[serde(default = "default_idx_min_price")]
    pub idx_min_price: Option<i64>,

    #[serde(default = "default_idx_limit")]
    pub idx_limit: u32,

    /// Fixed pause between outbound requests to one source.
    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,

    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Hard cap on detail URLs per run.
    #[serde(default = "default_max_urls")]
    pub max_urls: usize,

    /// Fixed AED to USD conversion rate.
    #[serde(default = "default_aed_to_usd")]
    pub aed_to_usd: f64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_database() -> PathBuf {
    PathBuf::from("luxe.db")
}

fn default_firecrawl_base_url() -> String {
    "https://api.firecrawl.dev".into()
}

fn default_wait_for_ms() -> u64 {
    3_000
}

fn default_idx_base_url() -> String {
    "https://api.simplyrets.com".into()
}

fn default_idx_min_price() -> Option<i64> {
    Some(1_000_000)
}

fn default_idx_limit() -> u32 {
    50
}

fn default_request_delay_ms() -> u64 {
    2_000
}

fn default_request_timeout_ms() -> u64 {
    60_000
}

fn default_max_urls() -> usize {
    100
}

fn default_aed_to_usd() -> f64 {
    0.27
}

fn default_user_agent() -> String {
    "luxe-ingest/0.1".into()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: default_database(),
            firecrawl_api_key: None,
            firecrawl_base_url: default_firecrawl_base_url(),
            wait_for_ms: default_wait_for_ms(),
            idx_api_key: None,
            idx_api_secret: None,
            idx_base_url: default_idx_base_url(),
            idx_fallback_url: None,
            idx_city: None,
            idx_min_price: default_idx_min_price(),
            idx_limit: default_idx_limit(),
            request_delay_ms: default_request_delay_ms(),
            request_timeout_ms: default_request_timeout_ms(),
            max_urls: default_max_urls(),
            aed_to_usd: default_aed_to_usd(),
            user_agent: default_user_agent(),
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, optional TOML file and environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file or environment cannot be parsed or
    /// validation fails.
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("LUXE_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(Env::prefixed("LUXE_").map(|key| key.as_str().to_lowercase().into()));

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if no scraping API key is configured.
    pub fn require_firecrawl_key(&self) -> Result<&str, ConfigError> {
        self.firecrawl_api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ConfigError::Missing {
                field: "firecrawl_api_key".into(),
                hint: "Set LUXE_FIRECRAWL_API_KEY environment variable".into(),
            })
    }

    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if either IDX credential is absent.
    pub fn require_idx_credentials(&self) -> Result<(&str, &str), ConfigError> {
        let key = self.idx_api_key.as_deref().filter(|k| !k.is_empty()).ok_or_else(|| ConfigError::Missing {
            field: "idx_api_key".into(),
            hint: "Set LUXE_IDX_API_KEY environment variable".into(),
        })?;
        let secret = self.idx_api_secret.as_deref().filter(|s| !s.is_empty()).ok_or_else(|| ConfigError::Missing {
            field: "idx_api_secret".into(),
            hint: "Set LUXE_IDX_API_SECRET environment variable".into(),
        })?;
        Ok((key, secret))
    }
}
