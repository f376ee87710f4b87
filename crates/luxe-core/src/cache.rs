//! Short-TTL read-through cache for IDX listing payloads.
//!
//! Entries live in the `idx_cache` table with millisecond timestamps.
//! An entry is a hit only while `now < expires_at`; expired rows are
//! removed by [`IdxCache::purge_expired`], which callers run after each
//! write pass rather than on a timer.

use crate::Result;
use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use sqlx::sqlite::SqlitePool;
use sqlx::Row;
use tracing::debug;

pub const CACHE_TTL_MINUTES: i64 = 15;
pub const WRITE_BATCH_SIZE: usize = 100;

pub fn cache_ttl() -> Duration {
    Duration::minutes(CACHE_TTL_MINUTES)
}

#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub id: String,
    pub payload: Value,
    pub cached_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(id: impl Into<String>, payload: Value, cached_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            payload,
            cached_at,
            expires_at: cached_at + cache_ttl(),
        }
    }

    pub fn is_fresh_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

#[derive(Clone, Debug)]
pub struct IdxCache {
    pool: SqlitePool,
}

impl IdxCache {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, id: &str) -> Result<Option<Value>> {
        Ok(self.get_at(id, Utc::now()).await?.map(|entry| entry.payload))
    }

    pub async fn get_at(&self, id: &str, now: DateTime<Utc>) -> Result<Option<CacheEntry>> {
        let row = sqlx::query("SELECT id, payload, cached_at, expires_at FROM idx_cache WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let payload: String = row.try_get("payload")?;
        let cached_at = DateTime::from_timestamp_millis(row.try_get("cached_at")?);
        let expires_at = DateTime::from_timestamp_millis(row.try_get("expires_at")?);
        let (Some(cached_at), Some(expires_at)) = (cached_at, expires_at) else {
            return Ok(None);
        };

        let entry = CacheEntry {
            id: row.try_get("id")?,
            payload: serde_json::from_str(&payload)?,
            cached_at,
            expires_at,
        };

        Ok(entry.is_fresh_at(now).then_some(entry))
    }

    pub async fn put(&self, id: &str, payload: Value) -> Result<()> {
        self.put_batch_at(&[(id.to_string(), payload)], Utc::now()).await?;
        Ok(())
    }

    pub async fn put_batch(&self, entries: &[(String, Value)]) -> Result<usize> {
        self.put_batch_at(entries, Utc::now()).await
    }

    /// Writes entries in transactions of at most [`WRITE_BATCH_SIZE`] rows.
    pub async fn put_batch_at(&self, entries: &[(String, Value)], now: DateTime<Utc>) -> Result<usize> {
        let mut written = 0;
        for chunk in entries.chunks(WRITE_BATCH_SIZE) {
            let mut tx = self.pool.begin().await?;
            for (id, payload) in chunk {
                let entry = CacheEntry::new(id.clone(), payload.clone(), now);
                sqlx::query(
                    r#"
                    INSERT INTO idx_cache (id, payload, cached_at, expires_at)
                    VALUES (?, ?, ?, ?)
                    ON CONFLICT(id) DO UPDATE SET
                        payload = excluded.payload,
                        cached_at = excluded.cached_at,
                        expires_at = excluded.expires_at
                    "#,
                )
                .bind(&entry.id)
                .bind(serde_json::to_string(&entry.payload)?)
                .bind(entry.cached_at.timestamp_millis())
                .bind(entry.expires_at.timestamp_millis())
                .execute(&mut *tx)
                .await?;
            }
            tx.commit().await?;
            written += chunk.len();
            debug!(rows = chunk.len(), "Wrote IDX cache batch");
        }
        Ok(written)
    }

    pub async fn purge_expired(&self) -> Result<u64> {
        self.purge_expired_at(Utc::now()).await
    }

    pub async fn purge_expired_at(&self, now: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query("DELETE FROM idx_cache WHERE expires_at < ?")
            .bind(now.timestamp_millis())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
