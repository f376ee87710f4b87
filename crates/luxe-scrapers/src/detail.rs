//! Shared engine for property sites that publish one listing per detail page.
//!
//! A [`SourceProfile`] describes where to look and what to accept; the
//! [`DetailScraper`] walks the discovered URLs sequentially, extracts and
//! normalizes each page, and applies the profile's acceptance rules.

use crate::classify::{infer_property_type, lifestyle_tags};
use crate::crawler::{CrawlConfig, Crawler, DetailPattern, MapSeed};
use crate::extract::extract_page;
use crate::normalize::{Currency, CurrencyRates};
use crate::scrape_api::{PageContent, ScrapeApi, ScrapeOptions};
use crate::{RunOptions, ScrapeResult, SourceAdapter, SourceName};
use async_trait::async_trait;
use luxe_core::{AppConfig, ListingDraft, ListingRecord, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct SourceProfile {
    pub name: SourceName,
    pub seeds: Vec<String>,
    pub map_seed: Option<MapSeed>,
    pub detail_pattern: DetailPattern,
    /// Currency the source publishes prices in.
    pub currency: Currency,
    pub city: &'static str,
    pub country: &'static str,
    pub region: &'static str,
    /// Inclusive USD floor; `1` accepts any positive price.
    pub min_price_usd: i64,
    /// Localities outside the target market, matched case-insensitively
    /// against title and address.
    pub excluded_localities: &'static [&'static str],
    /// Appended to titles when the source does not guarantee unique titles.
    pub title_suffix: Option<&'static str>,
}

/// Why a fetched page did not become a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    NoTitle,
    NoPrice,
    BelowFloor { price: i64, floor: i64 },
    ExcludedLocality(&'static str),
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rejection::NoTitle => write!(f, "no title"),
            Rejection::NoPrice => write!(f, "no price"),
            Rejection::BelowFloor { price, floor } => write!(f, "price {} below floor {}", price, floor),
            Rejection::ExcludedLocality(locality) => write!(f, "outside target market ({})", locality),
        }
    }
}

/// Assembles a listing from one rendered detail page.
pub fn build_listing(
    page: &PageContent,
    url: &str,
    profile: &SourceProfile,
    rates: &CurrencyRates,
) -> std::result::Result<ListingRecord, Rejection> {
    let extracted = extract_page(page);

    let title = extracted.title.ok_or(Rejection::NoTitle)?;
    let price = extracted
        .price_text
        .as_deref()
        .map(|raw| rates.normalize_price(raw, Some(profile.currency)))
        .unwrap_or(0);
    if price <= 0 {
        return Err(Rejection::NoPrice);
    }
    if price < profile.min_price_usd {
        return Err(Rejection::BelowFloor { price, floor: profile.min_price_usd });
    }

    let address = extracted.address.unwrap_or_default();
    let locality_text = format!("{} {}", title, address).to_lowercase();
    if let Some(excluded) = profile
        .excluded_localities
        .iter()
        .copied()
        .find(|locality| locality_text.contains(&locality.to_lowercase()))
    {
        return Err(Rejection::ExcludedLocality(excluded));
    }

    let description = extracted.description.unwrap_or_default();
    let tags = lifestyle_tags(&format!("{} {} {}", title, address, description));
    let property_type = infer_property_type(&title, &description);

    let title = match profile.title_suffix {
        Some(suffix) if !title.ends_with(suffix) => format!("{}{}", title, suffix),
        _ => title,
    };

    let draft = ListingDraft {
        title: Some(title),
        price,
        bedrooms: extracted.bedrooms,
        bathrooms: extracted.bathrooms,
        sqft: extracted.sqft,
        address: Some(address).filter(|a| !a.is_empty()),
        city: profile.city.to_string(),
        country: profile.country.to_string(),
        region: profile.region.to_string(),
        description: Some(description).filter(|d| !d.is_empty()),
        images: extracted.images,
        features: extracted.features,
        lifestyle_tags: tags,
        property_type: Some(property_type),
        source: profile.name.as_str().to_string(),
        source_url: url.to_string(),
    };

    draft.finish().ok_or(Rejection::NoTitle)
}

/// Source adapter for detail-page property sites.
pub struct DetailScraper {
    profile: SourceProfile,
    api: Arc<dyn ScrapeApi>,
    rates: CurrencyRates,
    delay: Duration,
    max_urls: usize,
}

impl DetailScraper {
    pub fn new(profile: SourceProfile, api: Arc<dyn ScrapeApi>, config: &AppConfig, rates: CurrencyRates) -> Self {
        Self { profile, api, rates, delay: config.request_delay(), max_urls: config.max_urls }
    }

    fn crawl_config(&self, options: &RunOptions) -> CrawlConfig {
        CrawlConfig {
            seeds: self.profile.seeds.clone(),
            map_seed: self.profile.map_seed.clone(),
            pattern: self.profile.detail_pattern,
            max_urls: options.effective_limit(self.max_urls),
            delay: self.delay,
        }
    }
}

#[async_trait]
impl SourceAdapter for DetailScraper {
    fn name(&self) -> SourceName {
        self.profile.name
    }

    async fn discover(&self, options: &RunOptions) -> Result<Vec<String>> {
        let crawler = Crawler::new(self.api.clone());
        Ok(crawler.discover_urls(&self.crawl_config(options)).await)
    }

    async fn scrape(&self, options: &RunOptions) -> Result<ScrapeResult> {
        let source = self.profile.name.as_str();
        let urls = self.discover(options).await?;
        info!(source, urls = urls.len(), "Scraping detail pages");

        let mut scraped = Vec::new();
        for url in &urls {
            tokio::time::sleep(self.delay).await;

            let page = match self.api.scrape(url, &ScrapeOptions::default()).await {
                Ok(page) => page,
                Err(e) => {
                    warn!(source, url = %url, error = %e, "Failed to fetch detail page, skipping");
                    continue;
                }
            };

            match build_listing(&page, url, &self.profile, &self.rates) {
                Ok(record) => {
                    debug!(source, url = %url, title = %record.title, price = record.price, "Accepted listing");
                    scraped.push(record.into());
                }
                Err(reason) => debug!(source, url = %url, %reason, "Rejected listing"),
            }
        }

        info!(source, scraped = scraped.len(), urls_found = urls.len(), "Scrape finished");
        Ok(ScrapeResult { scraped, urls_found: urls.len(), error: None })
    }
}
