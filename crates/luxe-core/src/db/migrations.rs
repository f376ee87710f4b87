use sqlx::sqlite::SqlitePool;
use std::fmt;

#[derive(Clone, Debug)]
pub struct Migration {
    pub version: i32,
    up: &'static str,
    down: &'static str,
}

impl Migration {
    pub const fn new(version: i32, up: &'static str, down: &'static str) -> Self {
        Self { version, up, down }
    }
}

impl fmt::Display for Migration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Migration {}", self.version)
    }
}

pub const MIGRATIONS: &[Migration] = &[
    Migration::new(
        1,
        r#"
        CREATE TABLE IF NOT EXISTS listings (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            city TEXT NOT NULL,
            price INTEGER NOT NULL CHECK(price > 0),
            bedrooms INTEGER,
            bathrooms INTEGER,
            sqft INTEGER,
            address TEXT NOT NULL,
            country TEXT NOT NULL,
            region TEXT NOT NULL,
            description TEXT,
            images TEXT NOT NULL DEFAULT '[]',
            features TEXT NOT NULL DEFAULT '[]',
            lifestyle_tags TEXT NOT NULL DEFAULT '["Luxury"]',
            property_type TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'active',
            source TEXT NOT NULL,
            source_url TEXT NOT NULL,
            created_at DATETIME NOT NULL,
            updated_at DATETIME NOT NULL,
            UNIQUE(title, city)
        )
        "#,
        "DROP TABLE IF EXISTS listings",
    ),
    Migration::new(
        2,
        "CREATE INDEX IF NOT EXISTS idx_listings_status_city ON listings(status, city)",
        "DROP INDEX IF EXISTS idx_listings_status_city",
    ),
    Migration::new(
        3,
        r#"
        CREATE TABLE IF NOT EXISTS luxury_items (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            category TEXT NOT NULL,
            price INTEGER NOT NULL CHECK(price > 0),
            description TEXT,
            images TEXT NOT NULL DEFAULT '[]',
            condition TEXT,
            provenance TEXT,
            dimensions TEXT,
            auction_house TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'active',
            source_url TEXT NOT NULL,
            created_at DATETIME NOT NULL,
            updated_at DATETIME NOT NULL,
            UNIQUE(title, category)
        )
        "#,
        "DROP TABLE IF EXISTS luxury_items",
    ),
    Migration::new(
        4,
        r#"
        CREATE TABLE IF NOT EXISTS idx_cache (
            id TEXT PRIMARY KEY,
            payload TEXT NOT NULL,
            cached_at INTEGER NOT NULL,
            expires_at INTEGER NOT NULL
        )
        "#,
        "DROP TABLE IF EXISTS idx_cache",
    ),
    Migration::new(
        5,
        "CREATE INDEX IF NOT EXISTS idx_cache_expires_at ON idx_cache(expires_at)",
        "DROP INDEX IF EXISTS idx_cache_expires_at",
    ),
];

const CREATE_MIGRATIONS_TABLE: &str =
    "CREATE TABLE IF NOT EXISTS migrations (version INTEGER PRIMARY KEY, applied_at DATETIME NOT NULL)";

async fn applied_versions(pool: &SqlitePool) -> Result<Vec<i32>, sqlx::Error> {
    sqlx::query(CREATE_MIGRATIONS_TABLE).execute(pool).await?;
    sqlx::query_scalar("SELECT version FROM migrations ORDER BY version").fetch_all(pool).await
}

/// Applies every pending migration in version order, each in its own transaction.
pub async fn apply_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let applied = applied_versions(pool).await?;

    for migration in MIGRATIONS.iter().filter(|m| !applied.contains(&m.version)) {
        tracing::debug!("Applying {}", migration);
        let mut tx = pool.begin().await?;
        sqlx::query(migration.up).execute(&mut *tx).await?;
        sqlx::query("INSERT INTO migrations (version, applied_at) VALUES (?, ?)")
            .bind(migration.version)
            .bind(chrono::Utc::now())
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
    }

    Ok(())
}

/// Reverts a single migration. Unknown versions are a decode error.
pub async fn rollback_migration(pool: &SqlitePool, version: i32) -> Result<(), sqlx::Error> {
    let Some(migration) = MIGRATIONS.iter().find(|m| m.version == version) else {
        return Err(sqlx::Error::Decode(format!("unknown migration version {}", version).into()));
    };

    tracing::debug!("Reverting {}", migration);
    let mut tx = pool.begin().await?;
    sqlx::query(migration.down).execute(&mut *tx).await?;
    sqlx::query("DELETE FROM migrations WHERE version = ?").bind(version).execute(&mut *tx).await?;
    tx.commit().await
}

pub async fn get_applied_migrations(pool: &SqlitePool) -> Result<Vec<Migration>, sqlx::Error> {
    let applied = applied_versions(pool).await?;
    Ok(MIGRATIONS.iter().filter(|m| applied.contains(&m.version)).cloned().collect())
}
