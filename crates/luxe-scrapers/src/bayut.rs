//! Bayut, the UAE property portal.
//!
//! Bayut lists across every emirate and at every price point; only Dubai
//! listings at or above one million USD are kept.

use crate::crawler::DetailPattern;
use crate::detail::SourceProfile;
use crate::normalize::Currency;
use crate::SourceName;

const BASE_URL: &str = "https://www.bayut.com";

pub const MIN_PRICE_USD: i64 = 1_000_000;

pub const EXCLUDED_EMIRATES: &[&str] =
    &["Abu Dhabi", "Sharjah", "Ajman", "Ras Al Khaimah", "Fujairah", "Umm Al Quwain"];

pub const DETAIL_PATTERN: DetailPattern =
    DetailPattern { contains: &["/property/details-"], ends_with: Some(".html"), excludes: &[] };

const SEARCHES: &[(&str, &str)] = &[
    ("villas", "palm-jumeirah"),
    ("villas", "emirates-hills"),
    ("villas", "dubai-hills-estate"),
    ("villas", "jumeirah-golf-estates"),
    ("penthouse", "downtown-dubai"),
    ("penthouse", "dubai-marina"),
    ("apartments", "jumeirah-bay-island"),
];

pub fn seed_urls() -> Vec<String> {
    SEARCHES
        .iter()
        .map(|(kind, area)| format!("{}/for-sale/{}/dubai/{}/?price_min=3700000", BASE_URL, kind, area))
        .collect()
}

pub fn profile() -> SourceProfile {
    SourceProfile {
        name: SourceName::Bayut,
        seeds: seed_urls(),
        map_seed: None,
        detail_pattern: DETAIL_PATTERN,
        currency: Currency::Aed,
        city: "Dubai",
        country: "UAE",
        region: "Middle East",
        min_price_usd: MIN_PRICE_USD,
        excluded_localities: EXCLUDED_EMIRATES,
        title_suffix: None,
    }
}
