//! Client for a Firecrawl-compatible page-scraping API.
//!
//! Third-party listing sites render client-side, so pages are fetched through
//! a rendering API rather than a plain HTTP client. The API returns markdown,
//! raw HTML, harvested links and page metadata for one URL (`scrape`), or a
//! list of URLs found under a site root (`map`).

use async_trait::async_trait;
use luxe_core::{AppConfig, LuxeError, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Markdown,
    Html,
    Links,
}

#[derive(Debug, Clone)]
pub struct ScrapeOptions {
    pub formats: Vec<Format>,
    /// Milliseconds to wait for client-side rendering; `None` uses the
    /// client's configured default.
    pub wait_for_ms: Option<u64>,
}

impl Default for ScrapeOptions {
    fn default() -> Self {
        Self { formats: vec![Format::Markdown, Format::Html, Format::Links], wait_for_ms: None }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MapOptions {
    pub search: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PageMetadata {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, rename = "sourceURL")]
    pub source_url: Option<String>,
    #[serde(default, rename = "statusCode")]
    pub status_code: Option<u16>,
}

/// Rendered content of one page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageContent {
    pub markdown: String,
    pub html: String,
    pub links: Vec<String>,
    pub metadata: PageMetadata,
}

impl PageContent {
    pub fn from_markdown(markdown: impl Into<String>) -> Self {
        Self { markdown: markdown.into(), ..Default::default() }
    }

    pub fn from_html(html: impl Into<String>) -> Self {
        Self { html: html.into(), ..Default::default() }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.metadata.title = Some(title.into());
        self
    }
}

#[async_trait]
pub trait ScrapeApi: Send + Sync {
    async fn scrape(&self, url: &str, options: &ScrapeOptions) -> Result<PageContent>;

    async fn map(&self, url: &str, options: &MapOptions) -> Result<Vec<String>>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ScrapeRequest<'a> {
    url: &'a str,
    formats: &'a [Format],
    wait_for: u64,
}

#[derive(Serialize)]
struct MapRequest<'a> {
    url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    search: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    limit: Option<usize>,
}

#[derive(Deserialize)]
struct ScrapeEnvelope {
    #[serde(default)]
    success: bool,
    data: Option<WirePage>,
    error: Option<String>,
}

// Any format not requested comes back missing or null.
#[derive(Deserialize)]
struct WirePage {
    markdown: Option<String>,
    html: Option<String>,
    links: Option<Vec<String>>,
    metadata: Option<PageMetadata>,
}

impl From<WirePage> for PageContent {
    fn from(page: WirePage) -> Self {
        Self {
            markdown: page.markdown.unwrap_or_default(),
            html: page.html.unwrap_or_default(),
            links: page.links.unwrap_or_default(),
            metadata: page.metadata.unwrap_or_default(),
        }
    }
}

#[derive(Deserialize)]
struct MapEnvelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    links: Vec<MapLink>,
    error: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MapLink {
    Url(String),
    Entry { url: String },
}

impl MapLink {
    fn into_url(self) -> String {
        match self {
            MapLink::Url(url) | MapLink::Entry { url } => url,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FirecrawlClient {
    client: Client,
    base_url: String,
    api_key: String,
    wait_for_ms: u64,
}

impl FirecrawlClient {
    /// # Errors
    ///
    /// Fails with a configuration error when no API key is set.
    pub fn new(config: &AppConfig) -> Result<Self> {
        let api_key = config.require_firecrawl_key()?.to_string();
        let client = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            client,
            base_url: config.firecrawl_base_url.trim_end_matches('/').to_string(),
            api_key,
            wait_for_ms: config.wait_for_ms,
        })
    }

    async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<reqwest::Response> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.client.post(&url).bearer_auth(&self.api_key).json(body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(LuxeError::Api { status: status.as_u16(), message });
        }
        Ok(response)
    }
}

#[async_trait]
impl ScrapeApi for FirecrawlClient {
    async fn scrape(&self, url: &str, options: &ScrapeOptions) -> Result<PageContent> {
        debug!(url, "Scraping page");
        let request = ScrapeRequest {
            url,
            formats: &options.formats,
            wait_for: options.wait_for_ms.unwrap_or(self.wait_for_ms),
        };

        let envelope: ScrapeEnvelope = self.post("/v1/scrape", &request).await?.json().await?;
        if !envelope.success {
            return Err(LuxeError::Scraping(
                envelope.error.unwrap_or_else(|| format!("scrape of {} was not successful", url)),
            ));
        }

        envelope
            .data
            .map(PageContent::from)
            .ok_or_else(|| LuxeError::Scraping(format!("scrape of {} returned no data", url)))
    }

    async fn map(&self, url: &str, options: &MapOptions) -> Result<Vec<String>> {
        debug!(url, search = ?options.search, "Mapping site");
        let request = MapRequest { url, search: options.search.as_deref(), limit: options.limit };

        let envelope: MapEnvelope = self.post("/v1/map", &request).await?.json().await?;
        if !envelope.success {
            return Err(LuxeError::Scraping(
                envelope.error.unwrap_or_else(|| format!("map of {} was not successful", url)),
            ));
        }

        Ok(envelope.links.into_iter().map(MapLink::into_url).collect())
    }
}

#[cfg(any(test, feature = "fixtures"))]
mod fixtures {
    use super::*;
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    /// In-memory [`ScrapeApi`] serving canned pages.
    ///
    /// Unknown URLs answer with a 404 API error. Every call is recorded in
    /// order, scrape calls as the bare URL and map calls prefixed `map:`.
    #[derive(Debug, Default)]
    pub struct StaticScrapeApi {
        pages: HashMap<String, PageContent>,
        maps: HashMap<String, Vec<String>>,
        failing: HashSet<String>,
        calls: Mutex<Vec<String>>,
    }

    impl StaticScrapeApi {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_page(mut self, url: impl Into<String>, page: PageContent) -> Self {
            self.pages.insert(url.into(), page);
            self
        }

        pub fn with_map(mut self, url: impl Into<String>, links: Vec<String>) -> Self {
            self.maps.insert(url.into(), links);
            self
        }

        /// Makes `url` answer with a 500 API error.
        pub fn failing(mut self, url: impl Into<String>) -> Self {
            self.failing.insert(url.into());
            self
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
        }

        fn record(&self, call: String) {
            if let Ok(mut calls) = self.calls.lock() {
                calls.push(call);
            }
        }
    }

    #[async_trait]
    impl ScrapeApi for StaticScrapeApi {
        async fn scrape(&self, url: &str, _options: &ScrapeOptions) -> Result<PageContent> {
            self.record(url.to_string());
            if self.failing.contains(url) {
                return Err(LuxeError::Api { status: 500, message: format!("upstream failure for {}", url) });
            }
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| LuxeError::Api { status: 404, message: format!("no page for {}", url) })
        }

        async fn map(&self, url: &str, options: &MapOptions) -> Result<Vec<String>> {
            self.record(format!("map:{}", url));
            if self.failing.contains(url) {
                return Err(LuxeError::Api { status: 500, message: format!("upstream failure for {}", url) });
            }
            let links = self.maps.get(url).cloned().unwrap_or_default();
            Ok(match options.limit {
                Some(limit) => links.into_iter().take(limit).collect(),
                None => links,
            })
        }
    }
}

#[cfg(any(test, feature = "fixtures"))]
pub use fixtures::StaticScrapeApi;
