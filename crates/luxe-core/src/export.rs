//! CSV export of canonical listings.

use crate::{Listing, Result};
use csv::Writer;
use std::io::Write;
use std::path::Path;

pub const LISTING_CSV_HEADER: [&str; 14] = [
    "ID",
    "Title",
    "Price (USD)",
    "Bedrooms",
    "Bathrooms",
    "Sq ft",
    "Address",
    "City",
    "Country",
    "Type",
    "Status",
    "Lifestyle",
    "Source",
    "URL",
];

fn optional<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

pub fn write_listings_csv<W: Write>(listings: &[Listing], writer: W) -> Result<()> {
    let mut writer = Writer::from_writer(writer);
    writer.write_record(LISTING_CSV_HEADER)?;
    for listing in listings {
        let record = &listing.record;
        writer.write_record([
            listing.id.to_string(),
            record.title.clone(),
            record.price.to_string(),
            optional(record.bedrooms),
            optional(record.bathrooms),
            optional(record.sqft),
            record.address.clone(),
            record.city.clone(),
            record.country.clone(),
            record.property_type.to_string(),
            record.status.to_string(),
            record.lifestyle_tags.join("; "),
            record.source.clone(),
            record.source_url.clone(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes `listings` to a CSV file at `path`, replacing any existing file.
pub fn export_listings(listings: &[Listing], path: impl AsRef<Path>) -> Result<()> {
    let file = std::fs::File::create(path)?;
    write_listings_csv(listings, file)
}
