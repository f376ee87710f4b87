//! Listing photo discovery from HTML and markdown.

use luxe_core::MAX_IMAGES;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

static MD_IMAGE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"!\[[^\]]*\]\(\s*<?([^)\s>]+)").unwrap());
static JUNK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:logo|icon|avatar|sprite|placeholder|favicon|pixel|spacer|blank\.gif|loader|\.svg(?:$|[?#]))").unwrap()
});

static OG_IMAGE_SELECTOR: Lazy<Option<Selector>> =
    Lazy::new(|| Selector::parse(r#"meta[property="og:image"]"#).ok());
static IMG_SELECTOR: Lazy<Option<Selector>> = Lazy::new(|| Selector::parse("img, source").ok());

const IMG_ATTRS: [&str; 4] = ["src", "data-src", "data-lazy-src", "data-original"];
const SRCSET_ATTRS: [&str; 2] = ["srcset", "data-srcset"];

/// Makes an image reference absolute and drops non-content assets.
///
/// Protocol-relative URLs are promoted to `https:`. Relative paths are
/// resolved against `base` when one is known and dropped otherwise.
pub fn normalize_image_url(raw: &str, base: Option<&Url>) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() || raw.starts_with("data:") {
        return None;
    }

    let absolute = if let Some(rest) = raw.strip_prefix("//") {
        format!("https://{}", rest)
    } else if raw.starts_with("https://") || raw.starts_with("http://") {
        raw.to_string()
    } else {
        base?.join(raw).ok()?.to_string()
    };

    (!JUNK_RE.is_match(&absolute)).then_some(absolute)
}

// The widest candidate is listed last by convention.
fn largest_srcset_candidate(srcset: &str) -> Option<&str> {
    srcset
        .split(',')
        .filter_map(|candidate| candidate.split_whitespace().next())
        .last()
}

fn html_candidates(html: &str) -> Vec<String> {
    let mut candidates = Vec::new();
    if html.is_empty() {
        return candidates;
    }
    let document = Html::parse_document(html);

    if let Some(selector) = OG_IMAGE_SELECTOR.as_ref() {
        candidates.extend(document.select(selector).filter_map(|meta| meta.value().attr("content").map(str::to_string)));
    }

    if let Some(selector) = IMG_SELECTOR.as_ref() {
        for element in document.select(selector) {
            let value = element.value();
            for attr in IMG_ATTRS {
                if let Some(src) = value.attr(attr) {
                    candidates.push(src.to_string());
                }
            }
            for attr in SRCSET_ATTRS {
                if let Some(src) = value.attr(attr).and_then(largest_srcset_candidate) {
                    candidates.push(src.to_string());
                }
            }
        }
    }

    candidates
}

/// Ordered, deduplicated image URLs for one page, capped at [`MAX_IMAGES`].
/// The first entry is the cover image.
pub fn extract_images(html: &str, markdown: &str, base: Option<&Url>) -> Vec<String> {
    let markdown_candidates = MD_IMAGE_RE.captures_iter(markdown).map(|caps| caps[1].to_string());

    let mut seen = HashSet::new();
    html_candidates(html)
        .into_iter()
        .chain(markdown_candidates)
        .filter_map(|raw| normalize_image_url(&raw, base))
        .filter(|url| seen.insert(url.clone()))
        .take(MAX_IMAGES)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedupe_and_cap_preserve_order() {
        let mut html = String::from("<html><body>");
        for i in 0..30 {
            html.push_str(&format!(r#"<img src="https://cdn.example.com/photos/{}.jpg">"#, i));
        }
        for i in 0..5 {
            html.push_str(&format!(r#"<img src="https://cdn.example.com/photos/{}.jpg">"#, i));
        }
        html.push_str("</body></html>");

        let images = extract_images(&html, "", None);
        assert_eq!(images.len(), MAX_IMAGES);
        let unique: HashSet<_> = images.iter().collect();
        assert_eq!(unique.len(), images.len());
        for (i, url) in images.iter().enumerate() {
            assert_eq!(url, &format!("https://cdn.example.com/photos/{}.jpg", i));
        }
    }

    #[test]
    fn test_filters_non_content_assets() {
        let html = r#"<img src="https://cdn.example.com/logo.png">
            <img src="https://cdn.example.com/icons/bed.png">
            <img src="https://cdn.example.com/agent-avatar.jpg">
            <img src="https://cdn.example.com/badge.svg">
            <img src="data:image/gif;base64,R0lGOD">
            <img data-src="https://cdn.example.com/living-room.jpg">"#;
        assert_eq!(extract_images(html, "", None), vec!["https://cdn.example.com/living-room.jpg".to_string()]);
    }

    #[test]
    fn test_protocol_relative_and_relative_urls() {
        let base = Url::parse("https://www.bayut.com/property/details-1.html").unwrap();
        assert_eq!(
            normalize_image_url("//images.bayut.com/a.jpg", None).as_deref(),
            Some("https://images.bayut.com/a.jpg")
        );
        assert_eq!(
            normalize_image_url("/thumbs/b.jpg", Some(&base)).as_deref(),
            Some("https://www.bayut.com/thumbs/b.jpg")
        );
        assert!(normalize_image_url("/thumbs/b.jpg", None).is_none());
    }

    #[test]
    fn test_og_image_first_then_markdown() {
        let html = r#"<head><meta property="og:image" content="https://cdn.example.com/cover.jpg"></head>
            <img srcset="https://cdn.example.com/s.jpg 480w, https://cdn.example.com/l.jpg 1200w">"#;
        let markdown = "![a](https://cdn.example.com/cover.jpg)\n![b](https://cdn.example.com/pool.jpg)";
        assert_eq!(
            extract_images(html, markdown, None),
            vec![
                "https://cdn.example.com/cover.jpg".to_string(),
                "https://cdn.example.com/l.jpg".to_string(),
                "https://cdn.example.com/pool.jpg".to_string(),
            ]
        );
    }
}
