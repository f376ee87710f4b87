pub mod auction;
pub mod bayut;
pub mod christies;
pub mod classify;
pub mod crawler;
pub mod detail;
pub mod extract;
pub mod idx;
pub mod job;
pub mod normalize;
pub mod scrape_api;
pub mod sothebys;

use async_trait::async_trait;
use luxe_core::{AppConfig, Database, LuxeError, Result, ScrapedRecord};
use std::str::FromStr;
use std::sync::Arc;

pub use auction::AuctionScraper;
pub use crawler::{CrawlConfig, Crawler, DetailPattern, MapSeed};
pub use detail::{DetailScraper, Rejection, SourceProfile};
pub use idx::{IdxAdapter, IdxQuery, IdxSearchResult};
pub use job::{Action, IngestJob, InvokeRequest, InvokeResponse};
pub use normalize::{Currency, CurrencyRates};
pub use scrape_api::{FirecrawlClient, MapOptions, PageContent, PageMetadata, ScrapeApi, ScrapeOptions};

#[cfg(any(test, feature = "fixtures"))]
pub use scrape_api::StaticScrapeApi;

/// External listing sources an ingestion job can be run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceName {
    /// Sotheby's International Realty, Dubai property listings.
    Sothebys,
    /// Christie's International Real Estate.
    Christies,
    Bayut,
    /// Sotheby's luxury goods and auction lots.
    SothebysAuction,
    /// Licensed MLS/IDX property API.
    Idx,
}

impl SourceName {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceName::Sothebys => "sothebys",
            SourceName::Christies => "christies",
            SourceName::Bayut => "bayut",
            SourceName::SothebysAuction => "sothebys-auction",
            SourceName::Idx => "idx",
        }
    }
}

impl std::fmt::Display for SourceName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceName {
    type Err = LuxeError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "sothebys" | "sotheby's" | "sothebys-realty" => Ok(SourceName::Sothebys),
            "christies" | "christie's" => Ok(SourceName::Christies),
            "bayut" => Ok(SourceName::Bayut),
            "sothebys-auction" | "sothebys-items" | "auction" => Ok(SourceName::SothebysAuction),
            "idx" | "mls" => Ok(SourceName::Idx),
            _ => Err(LuxeError::UnknownSource(s.to_string())),
        }
    }
}

/// Per-run knobs supplied by the trigger.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Caps discovered URLs (or items) below the source's own cap.
    pub limit: Option<usize>,
    /// Follow auction item summaries through to their detail pages.
    pub fetch_details: bool,
}

impl RunOptions {
    pub(crate) fn effective_limit(&self, source_cap: usize) -> usize {
        self.limit.map(|limit| limit.min(source_cap)).unwrap_or(source_cap)
    }
}

/// What every adapter hands back to the synchronizer.
#[derive(Debug, Clone, Default)]
pub struct ScrapeResult {
    pub scraped: Vec<ScrapedRecord>,
    pub urls_found: usize,
    /// Set when the source degraded to an empty or partial result instead of
    /// failing the run.
    pub error: Option<String>,
}

#[async_trait]
pub trait SourceAdapter: Send + Sync {
    fn name(&self) -> SourceName;

    /// Candidate detail URLs, without fetching them.
    async fn discover(&self, options: &RunOptions) -> Result<Vec<String>>;

    /// Discover, fetch, extract and normalize into canonical records.
    async fn scrape(&self, options: &RunOptions) -> Result<ScrapeResult>;
}

/// Factory for creating source adapters from configuration.
pub struct AdapterFactory;

impl AdapterFactory {
    /// Builds the adapter for `source`.
    ///
    /// Missing credentials are reported here, before any network call.
    pub fn create(source: SourceName, config: &AppConfig, db: &Database) -> Result<Arc<dyn SourceAdapter>> {
        if source == SourceName::Idx {
            return Ok(Arc::new(IdxAdapter::new(config, db)?));
        }
        let api: Arc<dyn ScrapeApi> = Arc::new(FirecrawlClient::new(config)?);
        Self::create_with_api(source, config, db, api)
    }

    /// Builds a page-scraping adapter on top of an existing scrape API client.
    pub fn create_with_api(
        source: SourceName,
        config: &AppConfig,
        db: &Database,
        api: Arc<dyn ScrapeApi>,
    ) -> Result<Arc<dyn SourceAdapter>> {
        let rates = CurrencyRates::from_config(config);
        let adapter: Arc<dyn SourceAdapter> = match source {
            SourceName::Sothebys => Arc::new(DetailScraper::new(sothebys::profile(), api, config, rates)),
            SourceName::Christies => Arc::new(DetailScraper::new(christies::profile(), api, config, rates)),
            SourceName::Bayut => Arc::new(DetailScraper::new(bayut::profile(), api, config, rates)),
            SourceName::SothebysAuction => Arc::new(AuctionScraper::new(api, config, rates)),
            SourceName::Idx => Arc::new(IdxAdapter::new(config, db)?),
        };
        Ok(adapter)
    }
}
