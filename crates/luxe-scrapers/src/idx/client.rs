//! HTTP client for the licensed IDX listing API.

use luxe_core::{AppConfig, LuxeError, Result};
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

const WRAPPER_KEYS: &[&str] = &["listings", "properties", "results", "data", "value"];

/// Search parameters accepted by the `/properties` endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdxQuery {
    pub city: Option<String>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub beds: Option<u32>,
    pub baths: Option<u32>,
    pub limit: u32,
    pub offset: u32,
}

impl Default for IdxQuery {
    fn default() -> Self {
        Self { city: None, min_price: None, max_price: None, beds: None, baths: None, limit: 50, offset: 0 }
    }
}

impl IdxQuery {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            city: config.idx_city.clone(),
            min_price: config.idx_min_price,
            limit: config.idx_limit,
            ..Self::default()
        }
    }

    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(city) = &self.city {
            params.push(("cities", city.clone()));
        }
        if let Some(min) = self.min_price {
            params.push(("minprice", min.to_string()));
        }
        if let Some(max) = self.max_price {
            params.push(("maxprice", max.to_string()));
        }
        if let Some(beds) = self.beds {
            params.push(("minbeds", beds.to_string()));
        }
        if let Some(baths) = self.baths {
            params.push(("minbaths", baths.to_string()));
        }
        params.push(("limit", self.limit.to_string()));
        params.push(("offset", self.offset.to_string()));
        params
    }
}

/// Listing array from a response that is either a bare array or an object
/// wrapping one.
pub fn unwrap_listings(body: Value) -> Vec<Value> {
    match body {
        Value::Array(items) => items,
        Value::Object(mut map) => WRAPPER_KEYS
            .iter()
            .find_map(|key| match map.remove(*key) {
                Some(Value::Array(items)) => Some(items),
                _ => None,
            })
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

#[derive(Debug, Clone)]
pub struct IdxClient {
    client: Client,
    /// Primary endpoint first, then the optional fallback.
    endpoints: Vec<String>,
    api_key: String,
    api_secret: String,
}

impl IdxClient {
    /// # Errors
    ///
    /// Fails with a configuration error when the key or secret is missing.
    pub fn new(config: &AppConfig) -> Result<Self> {
        let (api_key, api_secret) = config.require_idx_credentials()?;
        let client = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(config.user_agent.as_str())
            .build()?;

        let endpoints = std::iter::once(config.idx_base_url.as_str())
            .chain(config.idx_fallback_url.as_deref())
            .map(|url| url.trim_end_matches('/').to_string())
            .collect();

        Ok(Self { client, endpoints, api_key: api_key.to_string(), api_secret: api_secret.to_string() })
    }

    pub fn base_url(&self) -> &str {
        self.endpoints.first().map(String::as_str).unwrap_or_default()
    }

    pub async fn search(&self, query: &IdxQuery) -> Result<Vec<Value>> {
        let body = self.get_with_fallback("/properties", &query.params()).await?;
        Ok(unwrap_listings(body))
    }

    pub async fn fetch(&self, id: &str) -> Result<Value> {
        self.get_with_fallback(&format!("/properties/{}", id), &[]).await
    }

    async fn get(&self, base: &str, path: &str, params: &[(&'static str, String)]) -> Result<Value> {
        let url = format!("{}{}", base, path);
        debug!(url = %url, "Querying IDX");
        let response = self
            .client
            .get(&url)
            .basic_auth(&self.api_key, Some(&self.api_secret))
            .query(params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(LuxeError::Api { status: status.as_u16(), message });
        }
        Ok(response.json().await?)
    }

    /// Tries each endpoint in order; a non-2xx status or transport error
    /// moves on to the next one.
    async fn get_with_fallback(&self, path: &str, params: &[(&'static str, String)]) -> Result<Value> {
        let mut last_error = None;
        for base in &self.endpoints {
            match self.get(base, path, params).await {
                Ok(body) => return Ok(body),
                Err(e) => {
                    warn!(endpoint = %base, error = %e, "IDX endpoint failed");
                    last_error = Some(e);
                }
            }
        }
        Err(last_error.unwrap_or_else(|| LuxeError::Scraping("no IDX endpoint configured".to_string())))
    }
}
