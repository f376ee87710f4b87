use luxe_core::{AppConfig, ListingDraft, ListingRecord, PropertyType};

mod export;
mod list;
mod migrations;
mod pipeline;

/// Config for runs against canned pages: no inter-request delay.
pub fn test_config() -> AppConfig {
    AppConfig { request_delay_ms: 0, ..Default::default() }
}

pub fn listing(title: &str, city: &str, price: i64, property_type: PropertyType, source: &str) -> ListingRecord {
    ListingDraft {
        title: Some(title.to_string()),
        price,
        bedrooms: Some(4),
        bathrooms: Some(5),
        city: city.to_string(),
        country: "UAE".to_string(),
        region: "Middle East".to_string(),
        property_type: Some(property_type),
        source: source.to_string(),
        source_url: format!("https://listings.test/{}", title.to_lowercase().replace(' ', "-")),
        ..Default::default()
    }
    .finish()
    .unwrap()
}
