//! Detail-page URL discovery from seed index pages.
//!
//! The crawler runs single-threaded per source. Every outbound call after the
//! first is preceded by a fixed delay, and a failing seed is logged and
//! skipped.

use crate::scrape_api::{MapOptions, PageContent, ScrapeApi, ScrapeOptions};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

static MD_LINK_TARGET_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\]\(\s*<?([^)\s>]+)").unwrap());
static ANCHOR_SELECTOR: Lazy<Option<Selector>> = Lazy::new(|| Selector::parse("a[href]").ok());

/// Which URLs count as listing detail pages for a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetailPattern {
    /// Every fragment must appear in the URL.
    pub contains: &'static [&'static str],
    pub ends_with: Option<&'static str>,
    /// Any of these fragments disqualifies the URL.
    pub excludes: &'static [&'static str],
}

impl DetailPattern {
    pub fn matches(&self, url: &str) -> bool {
        self.contains.iter().all(|fragment| url.contains(fragment))
            && self.ends_with.map_or(true, |suffix| url.ends_with(suffix))
            && !self.excludes.iter().any(|fragment| url.contains(fragment))
    }
}

/// Secondary discovery through the scraping API's site map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapSeed {
    pub url: String,
    pub search: Option<String>,
    pub limit: usize,
}

#[derive(Debug, Clone)]
pub struct CrawlConfig {
    pub seeds: Vec<String>,
    pub map_seed: Option<MapSeed>,
    pub pattern: DetailPattern,
    pub max_urls: usize,
    pub delay: Duration,
}

/// Absolute, fragment-free form of `href` relative to `base`.
fn resolve(href: &str, base: Option<&Url>) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') || href.starts_with("mailto:") || href.starts_with("tel:") {
        return None;
    }
    let mut url = match base {
        Some(base) => base.join(href).ok()?,
        None => Url::parse(href).ok()?,
    };
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    url.set_fragment(None);
    Some(url.to_string())
}

/// Every link on a page: the API's harvested links, markdown link targets
/// and HTML anchors, in that order.
pub fn harvest_links(page: &PageContent, page_url: &str) -> Vec<String> {
    let base = Url::parse(page_url).ok();
    let mut raw: Vec<String> = page.links.clone();
    raw.extend(MD_LINK_TARGET_RE.captures_iter(&page.markdown).map(|caps| caps[1].to_string()));

    if !page.html.is_empty() {
        if let Some(selector) = ANCHOR_SELECTOR.as_ref() {
            let document = Html::parse_document(&page.html);
            raw.extend(document.select(selector).filter_map(|a| a.value().attr("href").map(str::to_string)));
        }
    }

    raw.iter().filter_map(|href| resolve(href, base.as_ref())).collect()
}

pub struct Crawler {
    api: Arc<dyn ScrapeApi>,
}

impl Crawler {
    pub fn new(api: Arc<dyn ScrapeApi>) -> Self {
        Self { api }
    }

    /// Candidate detail URLs in discovery order, deduplicated and capped.
    pub async fn discover_urls(&self, config: &CrawlConfig) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut found = Vec::new();
        let mut calls = 0usize;
        let seed_set: HashSet<&str> = config.seeds.iter().map(String::as_str).collect();

        let mut accept = |url: String, found: &mut Vec<String>| {
            if found.len() < config.max_urls
                && config.pattern.matches(&url)
                && !seed_set.contains(url.as_str())
                && seen.insert(url.clone())
            {
                found.push(url);
            }
        };

        for seed in &config.seeds {
            if found.len() >= config.max_urls {
                break;
            }
            if calls > 0 {
                tokio::time::sleep(config.delay).await;
            }
            calls += 1;

            match self.api.scrape(seed, &ScrapeOptions::default()).await {
                Ok(page) => {
                    let before = found.len();
                    for url in harvest_links(&page, seed) {
                        accept(url, &mut found);
                    }
                    debug!(seed = %seed, new = found.len() - before, "Harvested seed page");
                }
                Err(e) => warn!(seed = %seed, error = %e, "Seed page failed, skipping"),
            }
        }

        if let Some(map_seed) = &config.map_seed {
            if found.len() < config.max_urls {
                if calls > 0 {
                    tokio::time::sleep(config.delay).await;
                }
                let options = MapOptions { search: map_seed.search.clone(), limit: Some(map_seed.limit) };
                match self.api.map(&map_seed.url, &options).await {
                    Ok(links) => {
                        let base = Url::parse(&map_seed.url).ok();
                        for url in links.iter().filter_map(|link| resolve(link, base.as_ref())) {
                            accept(url, &mut found);
                        }
                    }
                    Err(e) => warn!(url = %map_seed.url, error = %e, "Site map failed, skipping"),
                }
            }
        }

        info!(urls = found.len(), seeds = config.seeds.len(), "URL discovery finished");
        found
    }
}
