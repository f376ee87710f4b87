//! Keyword heuristics for lifestyle tags and property type.

use luxe_core::{PropertyType, DEFAULT_LIFESTYLE_TAG};
use once_cell::sync::Lazy;
use regex::Regex;

const LIFESTYLE_RULES: &[(&str, &[&str])] = &[
    ("Waterfront", &["waterfront", "sea view", "marina", "canal", "lagoon", "lake view", "water view"]),
    ("Beachfront", &["beachfront", "beach access", "private beach", "beach front"]),
    ("Golf", &["golf"]),
    ("Island Living", &["island", "palm jumeirah", "bluewaters"]),
    ("Urban", &["downtown", "skyline", "city view", "burj khalifa", "difc"]),
    ("Family", &["family", "school", "garden", "play area", "nursery"]),
    ("Wellness", &["spa", "wellness", "yoga", "gym", "sauna"]),
    ("Equestrian", &["equestrian", "horse", "stables", "polo"]),
];

// Checked in order; the first match wins.
const PROPERTY_TYPE_RULES: &[(PropertyType, &[&str])] = &[
    (PropertyType::Penthouse, &["penthouse"]),
    (PropertyType::Mansion, &["mansion", "palace", "estate home"]),
    (PropertyType::Villa, &["villa"]),
    (PropertyType::Townhouse, &["townhouse", "town house"]),
    (PropertyType::Duplex, &["duplex"]),
    (PropertyType::Apartment, &["apartment", "flat", "condo", "studio", "residence tower"]),
];

/// Case-insensitive alternation of `keywords` as standalone words. Hyphenated
/// compounds ("studio-quality") do not count; a trailing `s` does.
fn keyword_regex(keywords: &[&str]) -> Regex {
    let alternation = keywords.iter().map(|keyword| regex::escape(keyword)).collect::<Vec<_>>().join("|");
    Regex::new(&format!(r"(?i)(?:^|[^\w-])(?:{})s?(?:$|[^\w-])", alternation)).unwrap()
}

static LIFESTYLE_PATTERNS: Lazy<Vec<(&'static str, Regex)>> =
    Lazy::new(|| LIFESTYLE_RULES.iter().map(|(tag, keywords)| (*tag, keyword_regex(keywords))).collect());

static PROPERTY_TYPE_PATTERNS: Lazy<Vec<(PropertyType, Regex)>> = Lazy::new(|| {
    PROPERTY_TYPE_RULES.iter().map(|(property_type, keywords)| (*property_type, keyword_regex(keywords))).collect()
});

/// Tags whose keywords appear as whole words in `text`, in rule order. Never empty.
pub fn lifestyle_tags(text: &str) -> Vec<String> {
    let mut tags: Vec<String> = LIFESTYLE_PATTERNS
        .iter()
        .filter(|(_, pattern)| pattern.is_match(text))
        .map(|(tag, _)| tag.to_string())
        .collect();

    if tags.is_empty() {
        tags.push(DEFAULT_LIFESTYLE_TAG.to_string());
    }
    tags
}

fn match_type(text: &str) -> Option<PropertyType> {
    PROPERTY_TYPE_PATTERNS.iter().find(|(_, pattern)| pattern.is_match(text)).map(|(property_type, _)| *property_type)
}

/// Property type from the title, then the description. Falls back to `House`.
pub fn infer_property_type(title: &str, description: &str) -> PropertyType {
    match_type(title).or_else(|| match_type(description)).unwrap_or(PropertyType::House)
}
