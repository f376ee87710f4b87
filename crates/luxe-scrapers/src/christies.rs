//! Christie's International Real Estate, UAE listings.
//!
//! Christie's reuses generic titles across markets, so every title carries a
//! ` (Christie's)` suffix to keep the title-and-city identity distinct from
//! the same property listed elsewhere.

use crate::crawler::{DetailPattern, MapSeed};
use crate::detail::SourceProfile;
use crate::normalize::Currency;
use crate::SourceName;

const BASE_URL: &str = "https://www.christiesrealestate.com";

pub const TITLE_SUFFIX: &str = " (Christie's)";

pub const DETAIL_PATTERN: DetailPattern =
    DetailPattern { contains: &["/sales/detail/"], ends_with: None, excludes: &["/agents/", "/offices/"] };

pub fn seed_urls() -> Vec<String> {
    [
        "/sales/dubai-united-arab-emirates",
        "/sales/dubai-united-arab-emirates/villa-type",
        "/sales/dubai-united-arab-emirates/penthouse-type",
        "/sales/united-arab-emirates",
    ]
    .iter()
    .map(|path| format!("{}{}", BASE_URL, path))
    .collect()
}

pub fn profile() -> SourceProfile {
    SourceProfile {
        name: SourceName::Christies,
        seeds: seed_urls(),
        map_seed: Some(MapSeed { url: BASE_URL.to_string(), search: Some("dubai".to_string()), limit: 200 }),
        detail_pattern: DETAIL_PATTERN,
        currency: Currency::Usd,
        city: "Dubai",
        country: "UAE",
        region: "Middle East",
        min_price_usd: 1,
        excluded_localities: &[],
        title_suffix: Some(TITLE_SUFFIX),
    }
}
