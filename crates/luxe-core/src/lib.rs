use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::{FromRow, Row};
use std::str::FromStr;

pub mod cache;
pub mod config;
pub mod db;
mod display;
mod export;
mod record;
pub mod sync;

pub use cache::{CacheEntry, IdxCache};
pub use config::{AppConfig, ConfigError};
pub use db::{Database, ListingStatus, WriteOutcome};
pub use display::{create_item_table, create_listing_table, ItemTableRow, ListingTableRow};
pub use export::{export_listings, write_listings_csv};
pub use record::{
    IdentityKey, ItemDraft, ItemRecord, ListingDraft, ListingRecord, ScrapedRecord, DEFAULT_LIFESTYLE_TAG, MAX_FEATURES,
    MAX_IMAGES,
};
pub use sync::{SyncReport, Synchronizer};

pub type Result<T> = std::result::Result<T, LuxeError>;

#[derive(Debug, thiserror::Error)]
pub enum LuxeError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Scraping error: {0}")]
    Scraping(String),
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("Invalid property type: {0}")]
    InvalidPropertyType(String),
    #[error("Unknown source: {0}")]
    UnknownSource(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
}

/// Closed vocabulary of residential property types.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    Villa,
    Apartment,
    Penthouse,
    Townhouse,
    Mansion,
    Duplex,
    /// Generic house / residential fallback.
    House,
}

impl PropertyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::Villa => "villa",
            PropertyType::Apartment => "apartment",
            PropertyType::Penthouse => "penthouse",
            PropertyType::Townhouse => "townhouse",
            PropertyType::Mansion => "mansion",
            PropertyType::Duplex => "duplex",
            PropertyType::House => "house",
        }
    }
}

impl sqlx::Type<sqlx::Sqlite> for PropertyType {
    fn type_info() -> sqlx::sqlite::SqliteTypeInfo {
        <String as sqlx::Type<sqlx::Sqlite>>::type_info()
    }
}

impl<'r> sqlx::Decode<'r, sqlx::Sqlite> for PropertyType {
    fn decode(value: sqlx::sqlite::SqliteValueRef<'r>) -> std::result::Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let text = <&str as sqlx::Decode<sqlx::Sqlite>>::decode(value)?;
        text.parse::<PropertyType>().map_err(Into::into)
    }
}

impl sqlx::Encode<'_, sqlx::Sqlite> for PropertyType {
    fn encode_by_ref(&self, args: &mut Vec<sqlx::sqlite::SqliteArgumentValue<'_>>) -> sqlx::encode::IsNull {
        args.push(sqlx::sqlite::SqliteArgumentValue::Text(self.as_str().into()));
        sqlx::encode::IsNull::No
    }
}

impl std::fmt::Display for PropertyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PropertyType::Villa => write!(f, "Villa"),
            PropertyType::Apartment => write!(f, "Apartment"),
            PropertyType::Penthouse => write!(f, "Penthouse"),
            PropertyType::Townhouse => write!(f, "Townhouse"),
            PropertyType::Mansion => write!(f, "Mansion"),
            PropertyType::Duplex => write!(f, "Duplex"),
            PropertyType::House => write!(f, "House"),
        }
    }
}

impl FromStr for PropertyType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "villa" | "villas" => Ok(PropertyType::Villa),
            "apartment" | "apartments" | "flat" | "condo" => Ok(PropertyType::Apartment),
            "penthouse" | "penthouses" => Ok(PropertyType::Penthouse),
            "townhouse" | "townhouses" | "town house" => Ok(PropertyType::Townhouse),
            "mansion" | "mansions" => Ok(PropertyType::Mansion),
            "duplex" | "duplexes" => Ok(PropertyType::Duplex),
            "house" | "houses" | "residential" => Ok(PropertyType::House),
            _ => Err(format!(
                "Invalid property type: {}. Valid options are: villa, apartment, penthouse, townhouse, mansion, duplex, house",
                s
            )),
        }
    }
}

/// A listing row as persisted in canonical storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    pub id: i64,
    #[serde(flatten)]
    pub record: ListingRecord,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, sqlx::sqlite::SqliteRow> for Listing {
    fn from_row(row: &'r sqlx::sqlite::SqliteRow) -> std::result::Result<Self, sqlx::Error> {
        let images: Json<Vec<String>> = row.try_get("images")?;
        let features: Json<Vec<String>> = row.try_get("features")?;
        let lifestyle_tags: Json<Vec<String>> = row.try_get("lifestyle_tags")?;

        Ok(Listing {
            id: row.try_get("id")?,
            record: ListingRecord {
                title: row.try_get("title")?,
                price: row.try_get("price")?,
                bedrooms: row.try_get("bedrooms")?,
                bathrooms: row.try_get("bathrooms")?,
                sqft: row.try_get("sqft")?,
                address: row.try_get("address")?,
                city: row.try_get("city")?,
                country: row.try_get("country")?,
                region: row.try_get("region")?,
                description: row.try_get("description")?,
                images: images.0,
                features: features.0,
                lifestyle_tags: lifestyle_tags.0,
                property_type: row.try_get("property_type")?,
                status: row.try_get("status")?,
                source: row.try_get("source")?,
                source_url: row.try_get("source_url")?,
            },
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// A luxury goods / auction lot row as persisted in canonical storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LuxuryItem {
    pub id: i64,
    #[serde(flatten)]
    pub record: ItemRecord,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, sqlx::sqlite::SqliteRow> for LuxuryItem {
    fn from_row(row: &'r sqlx::sqlite::SqliteRow) -> std::result::Result<Self, sqlx::Error> {
        let images: Json<Vec<String>> = row.try_get("images")?;

        Ok(LuxuryItem {
            id: row.try_get("id")?,
            record: ItemRecord {
                title: row.try_get("title")?,
                price: row.try_get("price")?,
                category: row.try_get("category")?,
                description: row.try_get("description")?,
                images: images.0,
                condition: row.try_get("condition")?,
                provenance: row.try_get("provenance")?,
                dimensions: row.try_get("dimensions")?,
                auction_house: row.try_get("auction_house")?,
                status: row.try_get("status")?,
                source_url: row.try_get("source_url")?,
            },
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}
