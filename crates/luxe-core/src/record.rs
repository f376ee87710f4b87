//! Canonical records produced by source adapters and consumed by the
//! synchronizer.
//!
//! Records are only constructed through [`ListingDraft::finish`] and
//! [`ItemDraft::finish`], which refuse to produce a record without a title or
//! with a non-positive price. Anything that reaches storage is complete.

use crate::{ListingStatus, PropertyType};
use serde::{Deserialize, Serialize};

pub const MAX_IMAGES: usize = 20;
pub const MAX_FEATURES: usize = 15;
pub const DEFAULT_LIFESTYLE_TAG: &str = "Luxury";

/// Content-derived identity used in place of a stable external ID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdentityKey {
    pub title: String,
    /// City for listings, category for luxury items.
    pub locality: String,
}

impl std::fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} @ {}", self.title, self.locality)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingRecord {
    pub title: String,
    /// Whole USD.
    pub price: i64,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,
    pub sqft: Option<i64>,
    pub address: String,
    pub city: String,
    pub country: String,
    pub region: String,
    pub description: Option<String>,
    pub images: Vec<String>,
    pub features: Vec<String>,
    pub lifestyle_tags: Vec<String>,
    pub property_type: PropertyType,
    pub status: ListingStatus,
    pub source: String,
    pub source_url: String,
}

impl ListingRecord {
    pub fn identity_key(&self) -> IdentityKey {
        IdentityKey { title: self.title.clone(), locality: self.city.clone() }
    }

    pub fn is_valid(&self) -> bool {
        !self.title.trim().is_empty() && self.price > 0 && !self.lifestyle_tags.is_empty()
    }
}

/// Mutable, partially-populated listing assembled by an adapter.
#[derive(Debug, Clone, Default)]
pub struct ListingDraft {
    pub title: Option<String>,
    pub price: i64,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,
    pub sqft: Option<i64>,
    pub address: Option<String>,
    pub city: String,
    pub country: String,
    pub region: String,
    pub description: Option<String>,
    pub images: Vec<String>,
    pub features: Vec<String>,
    pub lifestyle_tags: Vec<String>,
    pub property_type: Option<PropertyType>,
    pub source: String,
    pub source_url: String,
}

impl ListingDraft {
    /// Validates the draft and produces a record, or `None` when the draft
    /// has no title or no positive price.
    pub fn finish(self) -> Option<ListingRecord> {
        let title = self.title.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())?;
        if self.price <= 0 {
            return None;
        }

        let mut lifestyle_tags = dedupe(self.lifestyle_tags, usize::MAX);
        if lifestyle_tags.is_empty() {
            lifestyle_tags.push(DEFAULT_LIFESTYLE_TAG.to_string());
        }

        Some(ListingRecord {
            address: self.address.unwrap_or_default(),
            title,
            price: self.price,
            bedrooms: self.bedrooms,
            bathrooms: self.bathrooms,
            sqft: self.sqft,
            city: self.city,
            country: self.country,
            region: self.region,
            description: self.description,
            images: dedupe(self.images, MAX_IMAGES),
            features: dedupe(self.features, MAX_FEATURES),
            lifestyle_tags,
            property_type: self.property_type.unwrap_or(PropertyType::House),
            status: ListingStatus::Active,
            source: self.source,
            source_url: self.source_url,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub title: String,
    /// Whole USD; the low estimate for auction lots.
    pub price: i64,
    pub category: String,
    pub description: Option<String>,
    pub images: Vec<String>,
    pub condition: Option<String>,
    pub provenance: Option<String>,
    pub dimensions: Option<String>,
    pub auction_house: String,
    pub status: ListingStatus,
    pub source_url: String,
}

impl ItemRecord {
    pub fn identity_key(&self) -> IdentityKey {
        IdentityKey { title: self.title.clone(), locality: self.category.clone() }
    }

    pub fn is_valid(&self) -> bool {
        !self.title.trim().is_empty() && self.price > 0
    }
}

#[derive(Debug, Clone, Default)]
pub struct ItemDraft {
    pub title: Option<String>,
    pub price: i64,
    pub category: String,
    pub description: Option<String>,
    pub images: Vec<String>,
    pub condition: Option<String>,
    pub provenance: Option<String>,
    pub dimensions: Option<String>,
    pub auction_house: String,
    pub source_url: String,
}

impl ItemDraft {
    pub fn finish(self) -> Option<ItemRecord> {
        let title = self.title.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())?;
        if self.price <= 0 {
            return None;
        }

        Some(ItemRecord {
            title,
            price: self.price,
            category: self.category,
            description: self.description,
            images: dedupe(self.images, MAX_IMAGES),
            condition: self.condition,
            provenance: self.provenance,
            dimensions: self.dimensions,
            auction_house: self.auction_house,
            status: ListingStatus::Active,
            source_url: self.source_url,
        })
    }
}

/// The unit every adapter emits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ScrapedRecord {
    Listing(ListingRecord),
    Item(ItemRecord),
}

impl ScrapedRecord {
    pub fn identity_key(&self) -> IdentityKey {
        match self {
            ScrapedRecord::Listing(listing) => listing.identity_key(),
            ScrapedRecord::Item(item) => item.identity_key(),
        }
    }

    pub fn is_valid(&self) -> bool {
        match self {
            ScrapedRecord::Listing(listing) => listing.is_valid(),
            ScrapedRecord::Item(item) => item.is_valid(),
        }
    }
}

impl From<ListingRecord> for ScrapedRecord {
    fn from(record: ListingRecord) -> Self {
        ScrapedRecord::Listing(record)
    }
}

impl From<ItemRecord> for ScrapedRecord {
    fn from(record: ItemRecord) -> Self {
        ScrapedRecord::Item(record)
    }
}

// Order-preserving exact-match dedupe, truncated to `cap`.
fn dedupe(values: Vec<String>, cap: usize) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && seen.insert(v.clone()))
        .take(cap)
        .collect()
}
