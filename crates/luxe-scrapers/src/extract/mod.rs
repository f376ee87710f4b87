//! Best-effort field extraction from rendered listing pages.
//!
//! Every field is an ordered list of pure pattern functions; the first one
//! that yields a value wins. Extractors never fail, they return `None` or an
//! empty list.

pub mod fields;
pub mod images;
pub mod text;

use crate::scrape_api::PageContent;

/// A single attempt at extracting `T` from a text blob.
pub type Pattern<T> = fn(&str) -> Option<T>;

/// Returns the value from the first pattern that matches.
pub fn first_match<T>(text: &str, patterns: &[Pattern<T>]) -> Option<T> {
    patterns.iter().find_map(|pattern| pattern(text))
}

/// Raw, unnormalized field values pulled from one page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extracted {
    pub title: Option<String>,
    /// Price snippet including any currency marker, e.g. `AED 3,700,000`.
    pub price_text: Option<String>,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,
    pub sqft: Option<i64>,
    pub address: Option<String>,
    pub description: Option<String>,
    pub images: Vec<String>,
    pub features: Vec<String>,
}

/// Runs every field extractor over a page. Markdown is preferred, HTML is
/// the fallback for each field.
pub fn extract_page(page: &PageContent) -> Extracted {
    let markdown = page.markdown.as_str();
    let html = page.html.as_str();
    let base = page.metadata.source_url.as_deref().and_then(|url| url::Url::parse(url).ok());

    let title = page
        .metadata
        .title
        .as_deref()
        .and_then(fields::clean_title)
        .or_else(|| first_match(markdown, fields::TITLE_PATTERNS))
        .or_else(|| first_match(html, fields::HTML_TITLE_PATTERNS));

    let plain_html = if markdown.is_empty() { text::html_to_text(html) } else { String::new() };
    let body = if markdown.is_empty() { plain_html.as_str() } else { markdown };

    Extracted {
        title,
        price_text: first_match(body, fields::PRICE_PATTERNS),
        bedrooms: first_match(body, fields::BEDROOM_PATTERNS),
        bathrooms: first_match(body, fields::BATHROOM_PATTERNS),
        sqft: first_match(body, fields::AREA_PATTERNS),
        address: first_match(body, fields::ADDRESS_PATTERNS).or_else(|| first_match(html, fields::HTML_ADDRESS_PATTERNS)),
        description: text::extract_description(body, page.metadata.description.as_deref()),
        images: images::extract_images(html, markdown, base.as_ref()),
        features: text::extract_features(markdown, html),
    }
}
