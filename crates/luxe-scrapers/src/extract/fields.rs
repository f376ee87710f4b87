//! Scalar field patterns: title, price, room counts, area and address.

use crate::extract::Pattern;
use crate::normalize::sqm_to_sqft;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};

const AMOUNT: &str = r"(?:\d{1,3}(?:[,.]\d{3})+|\d+(?:\.\d+)?)(?:\s?(?:million|mn|m)\b)?";

static MD_H1_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^#[ \t]+(.+?)[ \t#]*$").unwrap());
static MD_H2_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^##[ \t]+(.+?)[ \t#]*$").unwrap());
static MD_LINK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[([^\]]*)\]\([^)]*\)").unwrap());
static WS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

static PRICE_LABEL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\b(?:asking\s+)?price\b").unwrap());
static PREFIXED_PRICE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"(?i)(?:\b(?:AED|USD|EUR|GBP|HKD|CHF)|US\$|د\.إ|[$€£])\s?{}", AMOUNT)).unwrap());
static SUFFIXED_PRICE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?:\d{1,3}(?:[,.]\d{3})+|\d+)\s?(?:AED|USD|EUR|GBP|HKD|CHF)\b").unwrap());

static BEDROOMS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)(\d{1,2})[ \t-]*(?:bedrooms?|beds?|bds?|br)\b").unwrap());
static BEDROOMS_LABEL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bbed(?:room)?s?\**\s*[:\-]?\s*\**\s*(\d{1,2})\b").unwrap());
static BATHROOMS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d{1,2})(?:\.\d)?[ \t-]*(?:bathrooms?|baths?|ba)\b").unwrap());
static BATHROOMS_LABEL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bbath(?:room)?s?\**\s*[:\-]?\s*\**\s*(\d{1,2})\b").unwrap());

static SQFT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d{1,3}(?:,\d{3})+|\d+)(?:\.\d+)?\s*(?:sq\.?\s*ft\.?|sqft|square\s+f(?:ee|oo)t|ft²|ft2\b)").unwrap()
});
static SQM_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d{1,3}(?:,\d{3})+|\d+)(?:\.\d+)?\s*(?:sq\.?\s*m(?:et(?:er|re)s?)?\b|sqm\b|m²|square\s+met(?:er|re)s?)")
        .unwrap()
});

static ADDRESS_LABEL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?im)^[^\w\n]*(?:address|location)\**\s*[:\-]\s*\**\s*([^\n]{3,120}?)[\s*]*$").unwrap()
});
static ADDRESS_PIN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^\s*📍\s*([^\n]{3,120}?)\s*$").unwrap());

pub const TITLE_PATTERNS: &[Pattern<String>] = &[markdown_h1, markdown_h2];
pub const HTML_TITLE_PATTERNS: &[Pattern<String>] = &[html_h1, html_og_title, html_title];
pub const PRICE_PATTERNS: &[Pattern<String>] = &[labelled_price, currency_prefixed_price, currency_suffixed_price];
pub const BEDROOM_PATTERNS: &[Pattern<i32>] = &[bedrooms_counted, bedrooms_labelled];
pub const BATHROOM_PATTERNS: &[Pattern<i32>] = &[bathrooms_counted, bathrooms_labelled];
pub const AREA_PATTERNS: &[Pattern<i64>] = &[area_sqft, area_sqm];
pub const ADDRESS_PATTERNS: &[Pattern<String>] = &[address_labelled, address_pin];
pub const HTML_ADDRESS_PATTERNS: &[Pattern<String>] = &[html_address_element, html_address_class];

/// Strips site suffixes (`Title | Site`), markdown decoration and excess
/// whitespace. Titles shorter than 3 characters are rejected.
pub fn clean_title(raw: &str) -> Option<String> {
    let head = raw.split(" | ").next().unwrap_or(raw);
    let unlinked = MD_LINK_RE.replace_all(head, "$1");
    let stripped = unlinked.replace(['*', '_', '`'], "");
    let title = WS_RE.replace_all(stripped.trim(), " ").to_string();

    let len = title.chars().count();
    (3..=200).contains(&len).then_some(title)
}

fn markdown_h1(text: &str) -> Option<String> {
    MD_H1_RE.captures_iter(text).find_map(|caps| clean_title(&caps[1]))
}

fn markdown_h2(text: &str) -> Option<String> {
    MD_H2_RE.captures_iter(text).find_map(|caps| clean_title(&caps[1]))
}

fn select_text(html: &str, selector: &str) -> Option<String> {
    if html.is_empty() {
        return None;
    }
    let selector = Selector::parse(selector).ok()?;
    let document = Html::parse_document(html);
    document.select(&selector).find_map(|element| {
        let text = element.text().collect::<Vec<_>>().join(" ");
        let text = WS_RE.replace_all(text.trim(), " ").to_string();
        (!text.is_empty()).then_some(text)
    })
}

fn select_attr(html: &str, selector: &str, attr: &str) -> Option<String> {
    if html.is_empty() {
        return None;
    }
    let selector = Selector::parse(selector).ok()?;
    let document = Html::parse_document(html);
    let value = document.select(&selector).find_map(|element| element.value().attr(attr).map(str::to_string));
    value
}

fn html_h1(html: &str) -> Option<String> {
    select_text(html, "h1").and_then(|t| clean_title(&t))
}

fn html_og_title(html: &str) -> Option<String> {
    select_attr(html, r#"meta[property="og:title"]"#, "content").and_then(|t| clean_title(&t))
}

fn html_title(html: &str) -> Option<String> {
    select_text(html, "title").and_then(|t| clean_title(&t))
}

/// A currency amount following a `Price` label, within the next 80 characters.
fn labelled_price(text: &str) -> Option<String> {
    PRICE_LABEL_RE.find_iter(text).find_map(|label| {
        let window: String = text[label.end()..].chars().take(80).collect();
        currency_prefixed_price(&window).or_else(|| currency_suffixed_price(&window))
    })
}

fn currency_prefixed_price(text: &str) -> Option<String> {
    PREFIXED_PRICE_RE.find(text).map(|m| m.as_str().trim().to_string())
}

fn currency_suffixed_price(text: &str) -> Option<String> {
    SUFFIXED_PRICE_RE.find(text).map(|m| m.as_str().trim().to_string())
}

fn small_count(re: &Regex, text: &str) -> Option<i32> {
    re.captures_iter(text)
        .filter_map(|caps| caps[1].parse::<i32>().ok())
        .find(|n| (0..=50).contains(n))
}

fn bedrooms_counted(text: &str) -> Option<i32> {
    small_count(&BEDROOMS_RE, text)
}

fn bedrooms_labelled(text: &str) -> Option<i32> {
    small_count(&BEDROOMS_LABEL_RE, text)
}

fn bathrooms_counted(text: &str) -> Option<i32> {
    small_count(&BATHROOMS_RE, text)
}

fn bathrooms_labelled(text: &str) -> Option<i32> {
    small_count(&BATHROOMS_LABEL_RE, text)
}

fn parse_grouped(digits: &str) -> Option<i64> {
    digits.replace(',', "").parse::<i64>().ok().filter(|n| *n > 0)
}

fn area_sqft(text: &str) -> Option<i64> {
    SQFT_RE.captures_iter(text).find_map(|caps| parse_grouped(&caps[1]))
}

fn area_sqm(text: &str) -> Option<i64> {
    SQM_RE
        .captures_iter(text)
        .find_map(|caps| parse_grouped(&caps[1]))
        .map(|sqm| sqm_to_sqft(sqm as f64))
}

fn tidy(raw: &str) -> Option<String> {
    let cleaned = MD_LINK_RE.replace_all(raw, "$1");
    let cleaned = WS_RE.replace_all(cleaned.trim_matches(|c: char| c == '*' || c.is_whitespace()), " ").to_string();
    (cleaned.chars().count() >= 3).then_some(cleaned)
}

fn address_labelled(text: &str) -> Option<String> {
    ADDRESS_LABEL_RE.captures_iter(text).find_map(|caps| tidy(&caps[1]))
}

fn address_pin(text: &str) -> Option<String> {
    ADDRESS_PIN_RE.captures_iter(text).find_map(|caps| tidy(&caps[1]))
}

fn html_address_element(html: &str) -> Option<String> {
    select_text(html, "address").and_then(|t| tidy(&t))
}

fn html_address_class(html: &str) -> Option<String> {
    select_text(html, r#"[class*="address"], [class*="location"]"#).and_then(|t| tidy(&t))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::first_match;

    #[test]
    fn test_clean_title() {
        assert_eq!(clean_title("Villa in Emirates Hills | Bayut").as_deref(), Some("Villa in Emirates Hills"));
        assert_eq!(clean_title("**Sky   Penthouse**").as_deref(), Some("Sky Penthouse"));
        assert_eq!(clean_title("[Marina Loft](https://x.test/1)").as_deref(), Some("Marina Loft"));
        assert!(clean_title("  ").is_none());
        assert!(clean_title("ab").is_none());
    }

    #[test]
    fn test_markdown_heading_title() {
        let text = "Some nav\n# Jumeirah Bay Mansion\n## Overview";
        assert_eq!(first_match(text, TITLE_PATTERNS).as_deref(), Some("Jumeirah Bay Mansion"));
        assert_eq!(first_match("## Only Subheading", TITLE_PATTERNS).as_deref(), Some("Only Subheading"));
    }

    #[test]
    fn test_price_patterns() {
        assert_eq!(first_match("Listed at AED 3,700,000 today", PRICE_PATTERNS).as_deref(), Some("AED 3,700,000"));
        assert_eq!(first_match("USD 12,500,000", PRICE_PATTERNS).as_deref(), Some("USD 12,500,000"));
        assert_eq!(first_match("only $4.2 million", PRICE_PATTERNS).as_deref(), Some("$4.2 million"));
        assert_eq!(first_match("15,000,000 AED", PRICE_PATTERNS).as_deref(), Some("15,000,000 AED"));
        assert_eq!(first_match("£2,100,000", PRICE_PATTERNS).as_deref(), Some("£2,100,000"));
        assert!(first_match("Price on request", PRICE_PATTERNS).is_none());
        assert!(first_match("4 Beds 5 Baths", PRICE_PATTERNS).is_none());
    }

    #[test]
    fn test_labelled_price_wins_over_earlier_amount() {
        let text = "Service charge AED 45 per sq ft\nPrice: AED 8,900,000";
        assert_eq!(first_match(text, PRICE_PATTERNS).as_deref(), Some("AED 8,900,000"));
    }

    #[test]
    fn test_fused_price_and_bedrooms() {
        let text = "AED 296,000,0007Beds";
        assert_eq!(first_match(text, PRICE_PATTERNS).as_deref(), Some("AED 296,000,000"));
        assert_eq!(first_match(text, BEDROOM_PATTERNS), Some(7));
    }

    #[test]
    fn test_room_counts() {
        assert_eq!(first_match("4 Beds | 5 Baths", BEDROOM_PATTERNS), Some(4));
        assert_eq!(first_match("4 Beds | 5 Baths", BATHROOM_PATTERNS), Some(5));
        assert_eq!(first_match("5-bedroom villa", BEDROOM_PATTERNS), Some(5));
        assert_eq!(first_match("Bedrooms: 6\nBathrooms: 7", BEDROOM_PATTERNS), Some(6));
        assert_eq!(first_match("Bedrooms: 6\nBathrooms: 7", BATHROOM_PATTERNS), Some(7));
        assert_eq!(first_match("4.5 baths", BATHROOM_PATTERNS), Some(4));
        assert_eq!(first_match("a bay view", BATHROOM_PATTERNS), None);
        assert_eq!(first_match("no rooms here", BEDROOM_PATTERNS), None);
    }

    #[test]
    fn test_area_patterns() {
        assert_eq!(first_match("6,200 SQ. FT.", AREA_PATTERNS), Some(6200));
        assert_eq!(first_match("BUA: 12500 sqft", AREA_PATTERNS), Some(12500));
        assert_eq!(first_match("8,000 square feet", AREA_PATTERNS), Some(8000));
        assert_eq!(first_match("Plot 1,000 sqm", AREA_PATTERNS), Some(10764));
        assert_eq!(first_match("0 sq ft", AREA_PATTERNS), None);
    }

    #[test]
    fn test_address_patterns() {
        assert_eq!(
            first_match("**Location:** Palm Jumeirah, Dubai", ADDRESS_PATTERNS).as_deref(),
            Some("Palm Jumeirah, Dubai")
        );
        assert_eq!(first_match("Address - Al Barari, Dubai", ADDRESS_PATTERNS).as_deref(), Some("Al Barari, Dubai"));
        assert_eq!(first_match("📍 Dubai Hills Estate", ADDRESS_PATTERNS).as_deref(), Some("Dubai Hills Estate"));
        assert!(first_match("nothing to see", ADDRESS_PATTERNS).is_none());
    }

    #[test]
    fn test_html_patterns() {
        let html = r#"<html><head><meta property="og:title" content="OG Title"><title>Doc Title | Site</title></head>
            <body><div class="property-location">  Jumeirah   Islands </div></body></html>"#;
        assert_eq!(first_match(html, HTML_TITLE_PATTERNS).as_deref(), Some("OG Title"));
        assert_eq!(first_match(html, HTML_ADDRESS_PATTERNS).as_deref(), Some("Jumeirah Islands"));
        assert!(first_match("", HTML_TITLE_PATTERNS).is_none());
    }
}
