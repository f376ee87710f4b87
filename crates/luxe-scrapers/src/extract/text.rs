//! Free-text fields: descriptions and feature lists.

use luxe_core::MAX_FEATURES;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use scraper::{Html, Selector};
use std::collections::HashSet;

pub const MAX_DESCRIPTION_CHARS: usize = 2_000;
const MIN_PARAGRAPH_CHARS: usize = 60;

static MD_IMAGE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"!\[[^\]]*\]\([^)]*\)").unwrap());
static MD_LINK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[([^\]]*)\]\([^)]*\)").unwrap());
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\w.+-]+@[\w-]+(?:\.[\w-]+)+").unwrap());
static PHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\+?\d[\d\s().-]{7,}\d").unwrap());
static LICENSE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:BRN|ORN|RERA(?:\s+permit)?|permit|licen[cs]e|DLD)\s*(?:no\.?|number|#)?\s*[:\-]?\s*\d{3,}").unwrap()
});
static AGENT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?i:agent|broker|listed by|contact|agency)\s*:?\s+[A-Z][a-z]+(?:\s+[A-Z][a-z]+){0,2}").unwrap()
});
static WS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static PARAGRAPH_BREAK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n").unwrap());
static BULLET_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^\s*[-*•]\s+(.+?)\s*$").unwrap());

static FEATURE_SELECTOR: Lazy<Option<Selector>> =
    Lazy::new(|| Selector::parse(r#"[class*="feature"] li, [class*="amenit"] li"#).ok());

/// Removes contact details, agent attribution and markdown syntax, collapses
/// whitespace and caps the length. Returns `None` if nothing readable is left.
pub fn clean_description(raw: &str) -> Option<String> {
    let text = MD_IMAGE_RE.replace_all(raw, " ");
    let text = MD_LINK_RE.replace_all(&text, "$1");
    let text = EMAIL_RE.replace_all(&text, " ");
    // Only digit runs long enough to be a phone number.
    let text = PHONE_RE.replace_all(&text, |caps: &Captures| {
        let digits = caps[0].chars().filter(char::is_ascii_digit).count();
        if digits >= 9 {
            " ".to_string()
        } else {
            caps[0].to_string()
        }
    });
    let text = LICENSE_RE.replace_all(&text, " ");
    let text = AGENT_RE.replace_all(&text, " ");
    let text = text.replace(['*', '#', '`'], "");
    let text = WS_RE.replace_all(text.trim(), " ");

    let capped: String = text.chars().take(MAX_DESCRIPTION_CHARS).collect();
    let capped = capped.trim().to_string();
    (capped.chars().count() >= 10).then_some(capped)
}

fn is_prose(paragraph: &str) -> bool {
    let first = paragraph.chars().next().unwrap_or(' ');
    !matches!(first, '#' | '-' | '*' | '•' | '|' | '!' | '>' | '[')
        && paragraph.chars().count() >= MIN_PARAGRAPH_CHARS
}

/// Joins the prose paragraphs of a page into a cleaned description, falling
/// back to the page's meta description.
pub fn extract_description(body: &str, meta_description: Option<&str>) -> Option<String> {
    let prose: Vec<&str> = PARAGRAPH_BREAK_RE.split(body).map(str::trim).filter(|p| is_prose(p)).collect();

    if !prose.is_empty() {
        if let Some(description) = clean_description(&prose.join(" ")) {
            return Some(description);
        }
    }

    meta_description.and_then(clean_description)
}

fn accept_feature(raw: &str) -> Option<String> {
    if raw.contains("](") || raw.starts_with('[') || raw.starts_with("![") {
        return None;
    }
    let feature = WS_RE.replace_all(raw.replace("**", "").trim(), " ").to_string();
    let len = feature.chars().count();
    (3..=80).contains(&len).then_some(feature)
}

/// Amenity strings from markdown bullets, then from HTML feature lists.
pub fn extract_features(markdown: &str, html: &str) -> Vec<String> {
    let mut candidates: Vec<String> = BULLET_RE.captures_iter(markdown).filter_map(|caps| accept_feature(&caps[1])).collect();

    if !html.is_empty() {
        if let Some(selector) = FEATURE_SELECTOR.as_ref() {
            let document = Html::parse_document(html);
            candidates.extend(
                document
                    .select(selector)
                    .filter_map(|li| accept_feature(&li.text().collect::<Vec<_>>().join(" "))),
            );
        }
    }

    let mut seen = HashSet::new();
    candidates.into_iter().filter(|f| seen.insert(f.clone())).take(MAX_FEATURES).collect()
}

/// Visible text of an HTML document, one block per text node.
pub fn html_to_text(html: &str) -> String {
    if html.is_empty() {
        return String::new();
    }
    let document = Html::parse_document(html);
    let mut blocks = Vec::new();
    for node in document.root_element().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node
            .parent()
            .and_then(|parent| parent.value().as_element().map(|el| matches!(el.name(), "script" | "style" | "noscript")))
            .unwrap_or(false);
        let trimmed = text.trim();
        if !hidden && !trimmed.is_empty() {
            blocks.push(trimmed.to_string());
        }
    }
    blocks.join("\n\n")
}
