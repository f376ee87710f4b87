//! Sotheby's luxury goods and auction lots.
//!
//! Category pages list lots as markdown links followed by an estimate. In
//! summary mode those are enough to build a record; with `fetch_details` each
//! lot page is fetched as well for condition, provenance, dimensions and
//! photos.

use crate::extract::{fields, first_match, images, text};
use crate::normalize::{parse_amount, CurrencyRates};
use crate::scrape_api::{PageContent, ScrapeApi, ScrapeOptions};
use crate::{RunOptions, ScrapeResult, SourceAdapter, SourceName};
use async_trait::async_trait;
use luxe_core::{AppConfig, ItemDraft, Result, ScrapedRecord};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const AUCTION_HOUSE: &str = "Sotheby's";

const BUY_PREFIX: &str = "https://www.sothebys.com/en/buy/";

pub const CATEGORIES: &[(&str, &str)] = &[
    ("Watches", "https://www.sothebys.com/en/buy/luxury/watches"),
    ("Jewelry", "https://www.sothebys.com/en/buy/luxury/jewelry"),
    ("Handbags", "https://www.sothebys.com/en/buy/luxury/handbags"),
    ("Wine & Spirits", "https://www.sothebys.com/en/buy/luxury/wine"),
    ("Cars", "https://www.sothebys.com/en/buy/luxury/cars"),
];

pub const SUMMARY_LIMIT: usize = 50;
pub const DETAIL_LIMIT: usize = 10;

/// Lines after a lot link searched for its estimate.
const SUMMARY_WINDOW_LINES: usize = 8;
const MAX_DETAIL_FIELD_CHARS: usize = 500;

static ITEM_LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\[\]]+)\]\((https://www\.sothebys\.com/en/buy/[^)\s]+)\)").unwrap());
static ESTIMATE_LABEL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:estimate|starting bid|current bid|sold for|price)\b").unwrap());

const GENERIC_LINK_TEXT: &[&str] = &["view", "view lot", "bid now", "learn more", "details", "shop now"];

/// One lot as listed on a category page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemSummary {
    pub title: String,
    pub url: String,
    pub category: &'static str,
    /// Raw estimate or price line, e.g. `10,000 – 15,000 USD`.
    pub estimate_text: Option<String>,
}

/// Extra fields only present on a lot's own page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemDetail {
    pub description: Option<String>,
    pub condition: Option<String>,
    pub provenance: Option<String>,
    pub dimensions: Option<String>,
    pub images: Vec<String>,
    pub estimate_text: Option<String>,
}

/// Lot pages sit at least three path segments below `/en/buy/`.
pub fn is_item_url(url: &str) -> bool {
    url.strip_prefix(BUY_PREFIX)
        .and_then(|rest| rest.split(['?', '#']).next())
        .map(|path| path.split('/').filter(|segment| !segment.is_empty()).count() >= 3)
        .unwrap_or(false)
}

fn item_links(line: &str) -> impl Iterator<Item = (String, String)> + '_ {
    ITEM_LINK_RE
        .captures_iter(line)
        .map(|caps| (caps[1].to_string(), caps[2].to_string()))
        .filter(|(_, url)| is_item_url(url))
}

/// First line after an estimate label (or the first currency-marked amount)
/// that carries a number.
fn estimate_in(window: &str) -> Option<String> {
    ESTIMATE_LABEL_RE
        .find_iter(window)
        .find_map(|label| {
            window[label.end()..]
                .lines()
                .map(|line| line.trim_matches(|c: char| c.is_whitespace() || matches!(c, ':' | '*' | '|')))
                .find(|line| !line.is_empty())
                .filter(|line| parse_amount(line).is_some())
                .map(str::to_string)
        })
        .or_else(|| first_match(window, fields::PRICE_PATTERNS))
}

/// Lots listed on one category page, deduplicated by URL.
pub fn parse_summaries(markdown: &str, category: &'static str) -> Vec<ItemSummary> {
    let lines: Vec<&str> = markdown.lines().collect();
    let mut seen = HashSet::new();
    let mut summaries = Vec::new();

    for (index, line) in lines.iter().enumerate() {
        for (text, url) in item_links(line) {
            let Some(title) = fields::clean_title(&text) else {
                continue;
            };
            if GENERIC_LINK_TEXT.contains(&title.to_lowercase().as_str()) || !seen.insert(url.clone()) {
                continue;
            }

            // The window ends where the next lot begins.
            let window_end = (index + 1 + SUMMARY_WINDOW_LINES).min(lines.len());
            let window: Vec<&str> = std::iter::once(*line)
                .chain(
                    lines[index + 1..window_end]
                        .iter()
                        .copied()
                        .take_while(|next| item_links(next).all(|(_, other)| other == url)),
                )
                .collect();

            summaries.push(ItemSummary { title, url, category, estimate_text: estimate_in(&window.join("\n")) });
        }
    }

    summaries
}

fn strip_label<'a>(line: &'a str, label: &str) -> Option<&'a str> {
    let trimmed = line.trim_start_matches(|c: char| c == '#' || c == '*' || c.is_whitespace());
    let head = trimmed.get(..label.len())?;
    if !head.eq_ignore_ascii_case(label) {
        return None;
    }
    let rest = &trimmed[label.len()..];
    if rest.chars().next().map_or(false, char::is_alphanumeric) {
        return None;
    }
    Some(rest.trim_matches(|c: char| matches!(c, ':' | '*' | '-' | '#') || c.is_whitespace()))
}

/// Value of a labelled field: the rest of the label line, or the next
/// non-empty line when the label is a heading.
fn labelled_value(body: &str, labels: &[&str]) -> Option<String> {
    let lines: Vec<&str> = body.lines().collect();
    labels.iter().find_map(|label| {
        lines.iter().enumerate().find_map(|(index, line)| {
            let rest = strip_label(line, label)?;
            let value = if rest.is_empty() {
                lines[index + 1..]
                    .iter()
                    .map(|next| next.trim())
                    .find(|next| !next.is_empty())
                    .filter(|next| !next.starts_with('#'))?
            } else {
                rest
            };
            let value: String = value.replace("**", "").chars().take(MAX_DETAIL_FIELD_CHARS).collect();
            let value = value.trim().to_string();
            (!value.is_empty()).then_some(value)
        })
    })
}

pub fn parse_item_detail(page: &PageContent) -> ItemDetail {
    let plain_html = if page.markdown.is_empty() { text::html_to_text(&page.html) } else { String::new() };
    let body = if page.markdown.is_empty() { plain_html.as_str() } else { page.markdown.as_str() };
    let base = page.metadata.source_url.as_deref().and_then(|url| url::Url::parse(url).ok());

    ItemDetail {
        description: text::extract_description(body, page.metadata.description.as_deref()),
        condition: labelled_value(body, &["condition report", "condition"]),
        provenance: labelled_value(body, &["provenance"]),
        dimensions: labelled_value(body, &["dimensions", "measurements", "case size", "size"]),
        images: images::extract_images(&page.html, &page.markdown, base.as_ref()),
        estimate_text: estimate_in(body),
    }
}

pub struct AuctionScraper {
    api: Arc<dyn ScrapeApi>,
    rates: CurrencyRates,
    delay: Duration,
}

impl AuctionScraper {
    pub fn new(api: Arc<dyn ScrapeApi>, config: &AppConfig, rates: CurrencyRates) -> Self {
        Self { api, rates, delay: config.request_delay() }
    }

    fn limit(options: &RunOptions) -> usize {
        let cap = if options.fetch_details { DETAIL_LIMIT } else { SUMMARY_LIMIT };
        options.effective_limit(cap)
    }

    /// Walks the category pages in order until `limit` lots are collected.
    async fn collect_summaries(&self, limit: usize) -> Vec<ItemSummary> {
        let mut summaries: Vec<ItemSummary> = Vec::new();
        let mut seen = HashSet::new();

        for (index, &(category, url)) in CATEGORIES.iter().enumerate() {
            if summaries.len() >= limit {
                break;
            }
            if index > 0 {
                tokio::time::sleep(self.delay).await;
            }

            match self.api.scrape(url, &ScrapeOptions::default()).await {
                Ok(page) => {
                    let found = parse_summaries(&page.markdown, category);
                    debug!(category, lots = found.len(), "Parsed category page");
                    for summary in found {
                        if summaries.len() < limit && seen.insert(summary.url.clone()) {
                            summaries.push(summary);
                        }
                    }
                }
                Err(e) => warn!(category, url = %url, error = %e, "Category page failed, skipping"),
            }
        }

        summaries
    }

    async fn fetch_detail(&self, url: &str) -> Option<ItemDetail> {
        tokio::time::sleep(self.delay).await;
        match self.api.scrape(url, &ScrapeOptions::default()).await {
            Ok(page) => Some(parse_item_detail(&page)),
            Err(e) => {
                warn!(url = %url, error = %e, "Lot page failed, keeping summary");
                None
            }
        }
    }

    fn build_item(&self, summary: ItemSummary, detail: Option<ItemDetail>) -> Option<ScrapedRecord> {
        let detail = detail.unwrap_or_default();
        let estimate = summary.estimate_text.as_deref().or(detail.estimate_text.as_deref());
        let price = estimate.map(|raw| self.rates.normalize_price(raw, None)).unwrap_or(0);

        ItemDraft {
            title: Some(summary.title),
            price,
            category: summary.category.to_string(),
            description: detail.description,
            images: detail.images,
            condition: detail.condition,
            provenance: detail.provenance,
            dimensions: detail.dimensions,
            auction_house: AUCTION_HOUSE.to_string(),
            source_url: summary.url,
        }
        .finish()
        .map(ScrapedRecord::from)
    }
}

#[async_trait]
impl SourceAdapter for AuctionScraper {
    fn name(&self) -> SourceName {
        SourceName::SothebysAuction
    }

    async fn discover(&self, options: &RunOptions) -> Result<Vec<String>> {
        let summaries = self.collect_summaries(Self::limit(options)).await;
        Ok(summaries.into_iter().map(|summary| summary.url).collect())
    }

    async fn scrape(&self, options: &RunOptions) -> Result<ScrapeResult> {
        let summaries = self.collect_summaries(Self::limit(options)).await;
        let urls_found = summaries.len();
        info!(lots = urls_found, fetch_details = options.fetch_details, "Collected auction lots");

        let mut scraped = Vec::new();
        for summary in summaries {
            let detail = if options.fetch_details { self.fetch_detail(&summary.url).await } else { None };
            let url = summary.url.clone();
            match self.build_item(summary, detail) {
                Some(record) => scraped.push(record),
                None => debug!(url = %url, "Rejected lot without estimate"),
            }
        }

        Ok(ScrapeResult { scraped, urls_found, error: None })
    }
}
