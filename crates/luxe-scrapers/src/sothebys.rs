//! Sotheby's International Realty, Dubai.

use crate::crawler::{DetailPattern, MapSeed};
use crate::detail::SourceProfile;
use crate::normalize::Currency;
use crate::SourceName;

const BASE_URL: &str = "https://www.sothebysrealty.ae";

const AREAS: &[&str] = &[
    "palm-jumeirah",
    "emirates-hills",
    "downtown-dubai",
    "dubai-marina",
    "jumeirah-bay-island",
    "dubai-hills-estate",
    "al-barari",
    "jumeirah-golf-estates",
];

pub const DETAIL_PATTERN: DetailPattern =
    DetailPattern { contains: &["/properties/buy/"], ends_with: None, excludes: &["/agents/", "?page="] };

pub fn seed_urls() -> Vec<String> {
    AREAS.iter().map(|area| format!("{}/en/buy/{}/", BASE_URL, area)).collect()
}

pub fn profile() -> SourceProfile {
    SourceProfile {
        name: SourceName::Sothebys,
        seeds: seed_urls(),
        map_seed: Some(MapSeed { url: BASE_URL.to_string(), search: Some("properties buy".to_string()), limit: 200 }),
        detail_pattern: DETAIL_PATTERN,
        currency: Currency::Aed,
        city: "Dubai",
        country: "UAE",
        region: "Middle East",
        min_price_usd: 1,
        excluded_localities: &[],
        title_suffix: None,
    }
}
