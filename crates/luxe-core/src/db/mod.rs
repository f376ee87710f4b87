pub mod migrations;
pub mod queries;
pub mod types;

pub use migrations::{apply_migrations, get_applied_migrations, rollback_migration, Migration};
pub use queries::{ItemQueryBuilder, ListingQueryBuilder, SortField};
pub use types::{ListingStatus, STATUS_ACTIVE, STATUS_INACTIVE, STATUS_SOLD};

use crate::{ItemRecord, ListingRecord, Result};
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::types::Json;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

/// What an upsert did to the row it touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Inserted(i64),
    Updated(i64),
}

impl WriteOutcome {
    fn new(id: i64, inserted: bool) -> Self {
        if inserted {
            WriteOutcome::Inserted(id)
        } else {
            WriteOutcome::Updated(id)
        }
    }

    pub fn id(&self) -> i64 {
        match self {
            WriteOutcome::Inserted(id) | WriteOutcome::Updated(id) => *id,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens (creating if needed) the database file and applies pending migrations.
    pub async fn new(db_path: impl AsRef<Path>) -> Result<Self> {
        let db_path = db_path.as_ref();
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// Single-connection in-memory database, migrated.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn migrate(&self) -> Result<()> {
        debug!("Running database migrations");
        apply_migrations(&self.pool).await?;
        Ok(())
    }

    pub async fn rollback(&self, version: i32) -> Result<()> {
        let applied = self.get_applied_migrations().await?;
        for migration in applied.iter().rev().filter(|v| **v > version) {
            rollback_migration(&self.pool, *migration).await?;
        }
        Ok(())
    }

    pub async fn get_applied_migrations(&self) -> Result<Vec<i32>> {
        Ok(get_applied_migrations(&self.pool)
            .await?
            .into_iter()
            .map(|m| m.version)
            .collect())
    }

    /// Inserts the listing, or overwrites every mutable field of the row with
    /// the same title and city. Concurrent writers never conflict: the last
    /// write wins.
    pub async fn upsert_listing(&self, record: &ListingRecord, now: DateTime<Utc>) -> Result<WriteOutcome> {
        let (id, inserted): (i64, bool) = sqlx::query_as(
            r#"
            INSERT INTO listings (
                title, city, price, bedrooms, bathrooms, sqft, address,
                country, region, description, images, features, lifestyle_tags,
                property_type, status, source, source_url, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(title, city) DO UPDATE SET
                price = excluded.price,
                bedrooms = excluded.bedrooms,
                bathrooms = excluded.bathrooms,
                sqft = excluded.sqft,
                address = excluded.address,
                country = excluded.country,
                region = excluded.region,
                description = excluded.description,
                images = excluded.images,
                features = excluded.features,
                lifestyle_tags = excluded.lifestyle_tags,
                property_type = excluded.property_type,
                status = excluded.status,
                source = excluded.source,
                source_url = excluded.source_url,
                updated_at = excluded.updated_at
            RETURNING id, created_at = updated_at
            "#,
        )
        .bind(&record.title)
        .bind(&record.city)
        .bind(record.price)
        .bind(record.bedrooms)
        .bind(record.bathrooms)
        .bind(record.sqft)
        .bind(&record.address)
        .bind(&record.country)
        .bind(&record.region)
        .bind(&record.description)
        .bind(Json(&record.images))
        .bind(Json(&record.features))
        .bind(Json(&record.lifestyle_tags))
        .bind(record.property_type)
        .bind(record.status)
        .bind(&record.source)
        .bind(&record.source_url)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(WriteOutcome::new(id, inserted))
    }

    pub async fn count_listings(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM listings")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub fn listings(&self) -> ListingQueryBuilder<'_> {
        ListingQueryBuilder::new()
    }

    /// Inserts the item, or overwrites the row with the same title and category.
    pub async fn upsert_item(&self, record: &ItemRecord, now: DateTime<Utc>) -> Result<WriteOutcome> {
        let (id, inserted): (i64, bool) = sqlx::query_as(
            r#"
            INSERT INTO luxury_items (
                title, category, price, description, images, condition,
                provenance, dimensions, auction_house, status, source_url,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(title, category) DO UPDATE SET
                price = excluded.price,
                description = excluded.description,
                images = excluded.images,
                condition = excluded.condition,
                provenance = excluded.provenance,
                dimensions = excluded.dimensions,
                auction_house = excluded.auction_house,
                status = excluded.status,
                source_url = excluded.source_url,
                updated_at = excluded.updated_at
            RETURNING id, created_at = updated_at
            "#,
        )
        .bind(&record.title)
        .bind(&record.category)
        .bind(record.price)
        .bind(&record.description)
        .bind(Json(&record.images))
        .bind(&record.condition)
        .bind(&record.provenance)
        .bind(&record.dimensions)
        .bind(&record.auction_house)
        .bind(record.status)
        .bind(&record.source_url)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(WriteOutcome::new(id, inserted))
    }

    pub fn items(&self) -> ItemQueryBuilder<'_> {
        ItemQueryBuilder::new()
    }
}
