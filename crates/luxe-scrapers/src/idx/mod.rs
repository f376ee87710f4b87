//! Licensed MLS/IDX property source.
//!
//! Unlike the page-scraping sources this one talks to a JSON API, so there is
//! no discovery crawl. Every search result is written to the short-TTL
//! [`IdxCache`] by a detached task that never blocks or fails the search.

pub mod client;
pub mod fields;

pub use client::{IdxClient, IdxQuery};

use crate::classify::{infer_property_type, lifestyle_tags};
use crate::{RunOptions, ScrapeResult, SourceAdapter, SourceName};
use async_trait::async_trait;
use luxe_core::{
    AppConfig, Database, IdxCache, ListingDraft, ListingRecord, ListingStatus, PropertyType, Result, ScrapedRecord,
};
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

pub const DEFAULT_COUNTRY: &str = "USA";
pub const DEFAULT_REGION: &str = "North America";

/// Outcome of one IDX search. `error` is set, with no properties, when every
/// endpoint failed.
#[derive(Debug, Clone, Default)]
pub struct IdxSearchResult {
    /// Active listings, highest price first.
    pub properties: Vec<ListingRecord>,
    /// Raw listings returned by the API before filtering.
    pub total_fetched: usize,
    pub error: Option<String>,
}

/// Maps one raw IDX payload to a listing. Returns `None` when the payload has
/// no usable id, title or price.
pub fn map_listing(value: &Value, base_url: &str) -> Option<ListingRecord> {
    let id = fields::string_field(value, fields::ID_KEYS)?;
    let address = fields::string_field(value, fields::ADDRESS_KEYS);
    let city = fields::string_field(value, fields::CITY_KEYS).unwrap_or_default();
    let description = fields::string_field(value, fields::DESCRIPTION_KEYS);
    let type_text = fields::string_field(value, fields::TYPE_KEYS).unwrap_or_default();

    let property_type = type_text
        .parse::<PropertyType>()
        .unwrap_or_else(|_| infer_property_type(&type_text, description.as_deref().unwrap_or_default()));

    let full_address = match (&address, fields::string_field(value, fields::STATE_KEYS)) {
        (Some(street), Some(state)) if !city.is_empty() => format!("{}, {}, {}", street, city, state),
        (Some(street), _) => street.clone(),
        (None, _) => String::new(),
    };
    let tag_text = format!("{} {} {}", full_address, city, description.as_deref().unwrap_or_default());

    let record = ListingDraft {
        title: address.clone(),
        price: fields::int_field(value, fields::PRICE_KEYS).unwrap_or(0),
        bedrooms: fields::int_field(value, fields::BEDROOM_KEYS).and_then(|n| i32::try_from(n).ok()),
        bathrooms: fields::int_field(value, fields::BATHROOM_KEYS).and_then(|n| i32::try_from(n).ok()),
        sqft: fields::int_field(value, fields::AREA_KEYS).filter(|n| *n > 0),
        address: Some(full_address),
        city,
        country: DEFAULT_COUNTRY.to_string(),
        region: DEFAULT_REGION.to_string(),
        description,
        images: fields::photos(value),
        features: fields::features(value),
        lifestyle_tags: lifestyle_tags(&tag_text),
        property_type: Some(property_type),
        source: SourceName::Idx.as_str().to_string(),
        source_url: format!("{}/properties/{}", base_url, id),
    }
    .finish()?;

    Some(record)
}

pub struct IdxAdapter {
    client: IdxClient,
    cache: IdxCache,
    default_query: IdxQuery,
}

impl IdxAdapter {
    /// # Errors
    ///
    /// Fails with a configuration error when IDX credentials are missing.
    pub fn new(config: &AppConfig, db: &Database) -> Result<Self> {
        Ok(Self {
            client: IdxClient::new(config)?,
            cache: IdxCache::new(db.pool().clone()),
            default_query: IdxQuery::from_config(config),
        })
    }

    /// Runs a search and hands the raw payloads to a background cache writer.
    pub async fn search(&self, query: &IdxQuery) -> IdxSearchResult {
        let (result, _writer) = self.search_with_writer(query).await;
        result
    }

    /// Like [`search`](Self::search), also returning the cache writer's handle.
    pub async fn search_with_writer(&self, query: &IdxQuery) -> (IdxSearchResult, Option<JoinHandle<()>>) {
        let raw = match self.client.search(query).await {
            Ok(raw) => raw,
            Err(e) => {
                error!(error = %e, "IDX search failed on every endpoint");
                let result = IdxSearchResult { error: Some(e.to_string()), ..Default::default() };
                return (result, None);
            }
        };

        let total_fetched = raw.len();
        let mut entries = Vec::with_capacity(raw.len());
        let mut properties = Vec::new();

        for listing in raw {
            let Some(id) = fields::string_field(&listing, fields::ID_KEYS) else {
                debug!("Skipping IDX listing without id");
                continue;
            };
            if fields::is_inactive(&listing) {
                debug!(id = %id, "Skipping inactive IDX listing");
            } else if let Some(record) = map_listing(&listing, self.client.base_url()) {
                properties.push(record);
            }
            entries.push((id, listing));
        }

        properties.sort_by(|a, b| b.price.cmp(&a.price));
        info!(fetched = total_fetched, active = properties.len(), "IDX search finished");

        let writer = self.spawn_cache_write(entries);
        (IdxSearchResult { properties, total_fetched, error: None }, Some(writer))
    }

    /// Writes payloads to the cache, then purges expired rows, on a detached
    /// task. Failures are logged only.
    pub fn spawn_cache_write(&self, entries: Vec<(String, Value)>) -> JoinHandle<()> {
        let cache = self.cache.clone();
        tokio::spawn(async move {
            match cache.put_batch(&entries).await {
                Ok(written) => debug!(written, "IDX cache updated"),
                Err(e) => warn!(error = %e, "IDX cache write failed"),
            }
            if let Err(e) = cache.purge_expired().await {
                warn!(error = %e, "IDX cache purge failed");
            }
        })
    }

    /// Read-through lookup of one listing. Inactive listings come back with
    /// status `Sold`. Cache failures are logged and never fail the lookup.
    pub async fn get_listing(&self, id: &str) -> Result<Option<ListingRecord>> {
        let cached = match self.cache.get(id).await {
            Ok(cached) => cached,
            Err(e) => {
                warn!(id, error = %e, "IDX cache read failed, fetching from API");
                None
            }
        };

        let payload = match cached {
            Some(payload) => {
                debug!(id, "IDX cache hit");
                payload
            }
            None => {
                let payload = self.client.fetch(id).await?;
                if let Err(e) = self.cache.put(id, payload.clone()).await {
                    warn!(id, error = %e, "IDX cache write failed");
                }
                payload
            }
        };

        let inactive = fields::is_inactive(&payload);
        Ok(map_listing(&payload, self.client.base_url()).map(|mut record| {
            if inactive {
                record.status = ListingStatus::Sold;
            }
            record
        }))
    }

    fn query_for(&self, options: &RunOptions) -> IdxQuery {
        let limit = options.effective_limit(self.default_query.limit as usize);
        IdxQuery { limit: u32::try_from(limit).unwrap_or(self.default_query.limit), ..self.default_query.clone() }
    }
}

#[async_trait]
impl SourceAdapter for IdxAdapter {
    fn name(&self) -> SourceName {
        SourceName::Idx
    }

    async fn discover(&self, options: &RunOptions) -> Result<Vec<String>> {
        let result = self.search(&self.query_for(options)).await;
        Ok(result.properties.into_iter().map(|listing| listing.source_url).collect())
    }

    async fn scrape(&self, options: &RunOptions) -> Result<ScrapeResult> {
        let result = self.search(&self.query_for(options)).await;
        Ok(ScrapeResult {
            scraped: result.properties.into_iter().map(ScrapedRecord::from).collect(),
            urls_found: result.total_fetched,
            error: result.error,
        })
    }
}
