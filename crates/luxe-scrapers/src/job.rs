//! Trigger entry point: one ingestion job for one source.

use crate::{AdapterFactory, RunOptions, SourceAdapter, SourceName};
use luxe_core::{AppConfig, Database, Synchronizer};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Scrape, normalize and upsert into canonical storage.
    #[default]
    Sync,
    /// Discovery only: report candidate URLs without fetching them.
    Map,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InvokeRequest {
    pub action: Action,
    pub fetch_details: bool,
    pub limit: Option<usize>,
}

impl InvokeRequest {
    pub fn run_options(&self) -> RunOptions {
        RunOptions { limit: self.limit, fetch_details: self.fetch_details }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvokeResponse {
    pub success: bool,
    pub scraped: usize,
    pub inserted: usize,
    pub updated: usize,
    pub failed: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urls_found: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub urls: Vec<String>,
}

impl InvokeResponse {
    /// Failed run with zero counts.
    pub fn failure(error: impl Into<String>) -> Self {
        Self { success: false, error: Some(error.into()), ..Default::default() }
    }
}

pub struct IngestJob {
    config: AppConfig,
    db: Database,
}

impl IngestJob {
    pub fn new(config: AppConfig, db: Database) -> Self {
        Self { config, db }
    }

    /// Builds the adapter for `source` and runs the requested action.
    ///
    /// Never returns an error: configuration and adapter failures are
    /// reported through [`InvokeResponse::error`].
    pub async fn invoke(&self, source: SourceName, request: &InvokeRequest) -> InvokeResponse {
        match AdapterFactory::create(source, &self.config, &self.db) {
            Ok(adapter) => self.run(adapter.as_ref(), request).await,
            Err(e) => {
                error!(source = %source, error = %e, "Cannot start ingestion job");
                InvokeResponse::failure(e.to_string())
            }
        }
    }

    pub async fn run(&self, adapter: &dyn SourceAdapter, request: &InvokeRequest) -> InvokeResponse {
        let source = adapter.name();
        let options = request.run_options();
        info!(source = %source, action = ?request.action, limit = ?request.limit, "Starting ingestion job");

        match request.action {
            Action::Map => match adapter.discover(&options).await {
                Ok(urls) => InvokeResponse { success: true, urls_found: Some(urls.len()), urls, ..Default::default() },
                Err(e) => {
                    error!(source = %source, error = %e, "Discovery failed");
                    InvokeResponse::failure(e.to_string())
                }
            },
            Action::Sync => {
                let result = match adapter.scrape(&options).await {
                    Ok(result) => result,
                    Err(e) => {
                        error!(source = %source, error = %e, "Scrape failed");
                        return InvokeResponse::failure(e.to_string());
                    }
                };

                let report = Synchronizer::new(self.db.clone()).sync(&result.scraped).await;
                let success = !(result.error.is_some() && result.scraped.is_empty());
                info!(
                    source = %source,
                    scraped = result.scraped.len(),
                    inserted = report.inserted,
                    updated = report.updated,
                    failed = report.failed,
                    "Ingestion job finished"
                );

                InvokeResponse {
                    success,
                    scraped: result.scraped.len(),
                    inserted: report.inserted,
                    updated: report.updated,
                    failed: report.failed,
                    urls_found: Some(result.urls_found),
                    error: result.error,
                    urls: Vec::new(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrape_api::{PageContent, StaticScrapeApi};
    use crate::sothebys;
    use std::sync::Arc;

    fn detail(title: &str) -> PageContent {
        PageContent::from_markdown(format!("# {}\n\nAED 7,400,000\n\n5 Bedrooms\n\nLocation: Palm Jumeirah", title))
    }

    fn config() -> AppConfig {
        AppConfig { request_delay_ms: 0, ..Default::default() }
    }

    fn api() -> Arc<StaticScrapeApi> {
        let index = PageContent::from_markdown(
            "[A](https://www.sothebysrealty.ae/en/properties/buy/villa-a/)\n\
             [B](https://www.sothebysrealty.ae/en/properties/buy/villa-b/)",
        );
        Arc::new(
            StaticScrapeApi::new()
                .with_page(sothebys::seed_urls()[0].clone(), index)
                .with_page("https://www.sothebysrealty.ae/en/properties/buy/villa-a/", detail("Frond A Villa"))
                .with_page("https://www.sothebysrealty.ae/en/properties/buy/villa-b/", detail("Frond B Villa")),
        )
    }

    #[test]
    fn test_request_deserializes_with_defaults() {
        let request: InvokeRequest = serde_json::from_str(r#"{"action": "map", "limit": 5}"#).unwrap();
        assert_eq!(request, InvokeRequest { action: Action::Map, fetch_details: false, limit: Some(5) });

        let request: InvokeRequest = serde_json::from_str(r#"{"fetchDetails": true}"#).unwrap();
        assert_eq!(request.action, Action::Sync);
        assert!(request.fetch_details);
    }

    #[test]
    fn test_response_serialization_skips_empty_fields() {
        let json = serde_json::to_value(InvokeResponse::failure("missing key")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"success": false, "scraped": 0, "inserted": 0, "updated": 0, "failed": 0, "error": "missing key"})
        );
    }

    #[tokio::test]
    async fn test_sync_inserts_then_updates() {
        let db = Database::in_memory().await.unwrap();
        let config = config();
        let job = IngestJob::new(config.clone(), db.clone());
        let adapter = AdapterFactory::create_with_api(SourceName::Sothebys, &config, &db, api()).unwrap();

        let first = job.run(adapter.as_ref(), &InvokeRequest::default()).await;
        assert!(first.success);
        assert_eq!(first.scraped, 2);
        assert_eq!(first.inserted, 2);
        assert_eq!(first.updated, 0);
        assert_eq!(first.urls_found, Some(2));

        let second = job.run(adapter.as_ref(), &InvokeRequest::default()).await;
        assert_eq!(second.inserted, 0);
        assert_eq!(second.updated, 2);
        assert_eq!(db.count_listings().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_map_reports_urls_without_writing() {
        let db = Database::in_memory().await.unwrap();
        let config = config();
        let job = IngestJob::new(config.clone(), db.clone());
        let adapter = AdapterFactory::create_with_api(SourceName::Sothebys, &config, &db, api()).unwrap();

        let request = InvokeRequest { action: Action::Map, ..Default::default() };
        let response = job.run(adapter.as_ref(), &request).await;

        assert!(response.success);
        assert_eq!(response.urls_found, Some(2));
        assert_eq!(response.urls[0], "https://www.sothebysrealty.ae/en/properties/buy/villa-a/");
        assert_eq!(db.count_listings().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_invoke_without_credentials_fails_cleanly() {
        let db = Database::in_memory().await.unwrap();
        let job = IngestJob::new(AppConfig::default(), db);

        let response = job.invoke(SourceName::Bayut, &InvokeRequest::default()).await;
        assert!(!response.success);
        assert_eq!(response.scraped, 0);
        assert_eq!(response.inserted, 0);
        assert!(response.error.is_some());

        let response = job.invoke(SourceName::Idx, &InvokeRequest::default()).await;
        assert!(!response.success);
    }
}
