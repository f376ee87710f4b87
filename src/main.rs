use anyhow::Context;
use clap::{Parser, Subcommand};
use luxe_core::db::SortField;
use luxe_core::{
    create_item_table, create_listing_table, export_listings, AppConfig, Database, IdxCache, ListingStatus,
    PropertyType,
};
use luxe_scrapers::{Action, IdxAdapter, IngestJob, InvokeRequest, SourceName};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Database file path, overriding configuration (-d, --database)
    #[arg(short = 'd', long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape a source and upsert the results into the database
    #[command(long_about = "Scrape a source, normalize its listings and upsert them by title and city (or category for auction lots). Prints the run summary as JSON.")]
    Sync(SyncCommand),

    /// Discover candidate listing URLs for a source without fetching them
    Map(MapCommand),

    /// List stored property listings
    #[command(long_about = "List stored property listings with optional filtering and sorting.")]
    List(ListCommand),

    /// List stored luxury items and auction lots
    Items(ItemsCommand),

    /// Look up one IDX listing by id, through the cache
    #[command(long_about = "Look up one IDX listing by its MLS id. Served from the IDX cache when a fresh entry exists, otherwise fetched from the API and cached.")]
    IdxGet(IdxGetCommand),

    /// Export property listings to CSV
    Export(ExportCommand),

    /// Remove expired entries from the IDX cache
    PurgeCache,

    /// Show applied database migrations
    Migrations,

    /// Roll back to a migration version
    Rollback(RollbackCommand),
}

#[derive(Parser)]
struct SyncCommand {
    /// Source to ingest: sothebys, christies, bayut, sothebys-auction or idx (-s, --source)
    #[arg(short = 's', long)]
    source: SourceName,

    /// Follow auction lots through to their detail pages (-f, --fetch-details)
    #[arg(short = 'f', long)]
    fetch_details: bool,

    /// Maximum number of URLs or lots to process (-l, --limit)
    #[arg(short = 'l', long)]
    limit: Option<usize>,
}

#[derive(Parser)]
struct MapCommand {
    /// Source to discover (-s, --source)
    #[arg(short = 's', long)]
    source: SourceName,

    /// Maximum number of URLs to report (-l, --limit)
    #[arg(short = 'l', long)]
    limit: Option<usize>,
}

#[derive(Parser)]
struct ListCommand {
    /// Status to filter by (-S, --status)
    #[arg(short = 'S', long, value_enum)]
    status: Option<ListingStatus>,

    /// City to filter by (-c, --city)
    #[arg(short = 'c', long)]
    city: Option<String>,

    /// Property type to filter by (-t, --property-type)
    #[arg(short = 't', long, value_enum)]
    property_type: Option<PropertyType>,

    /// Minimum price in USD (-p, --min-price)
    #[arg(short = 'p', long)]
    min_price: Option<i64>,

    /// Maximum price in USD (-P, --max-price)
    #[arg(short = 'P', long)]
    max_price: Option<i64>,

    /// Source to filter by (-f, --source)
    #[arg(short = 'f', long)]
    source: Option<String>,

    /// Exact title to filter by (--title)
    #[arg(long)]
    title: Option<String>,

    /// Maximum number of listings to display (-l, --limit)
    #[arg(short = 'l', long, default_value_t = 10)]
    limit: i64,

    /// Number of listings to skip (-o, --offset)
    #[arg(short = 'o', long, default_value_t = 0)]
    offset: i64,

    /// Field to sort by (-s, --sort-by)
    #[arg(short = 's', long, value_enum, default_value_t = SortField::Price)]
    sort_by: SortField,

    /// Sort order (-r, --sort-order)
    #[arg(short = 'r', long, value_enum, default_value_t = SortOrder::Desc)]
    sort_order: SortOrder,
}

#[derive(Parser)]
struct ItemsCommand {
    /// Category to filter by, e.g. Watches (-c, --category)
    #[arg(short = 'c', long)]
    category: Option<String>,

    /// Status to filter by (-S, --status)
    #[arg(short = 'S', long, value_enum)]
    status: Option<ListingStatus>,

    /// Maximum number of items to display (-l, --limit)
    #[arg(short = 'l', long, default_value_t = 10)]
    limit: i64,
}

#[derive(Parser)]
struct IdxGetCommand {
    /// MLS listing id
    id: String,
}

#[derive(Parser)]
struct ExportCommand {
    /// Output file path (-o, --output)
    #[arg(short = 'o', long, default_value = "listings.csv")]
    output: PathBuf,
}

#[derive(Parser)]
struct RollbackCommand {
    /// Keep migrations up to and including this version (-v, --version)
    #[arg(short = 'v', long)]
    version: i32,
}

#[derive(Debug, clap::ValueEnum, Clone, Copy)]
enum SortOrder {
    Asc,
    Desc,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let mut config = AppConfig::load().context("failed to load configuration")?;
    if let Some(database) = cli.database {
        config.database = database;
    }

    let db = Database::new(&config.database)
        .await
        .with_context(|| format!("failed to open database {}", config.database.display()))?;

    match cli.command {
        Commands::Sync(cmd) => {
            let request = InvokeRequest { action: Action::Sync, fetch_details: cmd.fetch_details, limit: cmd.limit };
            let response = IngestJob::new(config, db).invoke(cmd.source, &request).await;
            println!("{}", serde_json::to_string_pretty(&response)?);
            if !response.success {
                anyhow::bail!("sync of {} failed", cmd.source);
            }
        }
        Commands::Map(cmd) => {
            let request = InvokeRequest { action: Action::Map, fetch_details: false, limit: cmd.limit };
            let response = IngestJob::new(config, db).invoke(cmd.source, &request).await;
            println!("{}", serde_json::to_string_pretty(&response)?);
            if !response.success {
                anyhow::bail!("discovery for {} failed", cmd.source);
            }
        }
        Commands::List(cmd) => {
            let mut query = db
                .listings()
                .with_price_range(cmd.min_price, cmd.max_price)
                .order_by(cmd.sort_by, matches!(cmd.sort_order, SortOrder::Desc))
                .with_limit(Some(cmd.limit))
                .with_offset(Some(cmd.offset));
            if let Some(status) = cmd.status {
                query = query.with_status(status);
            }
            if let Some(city) = cmd.city.as_deref() {
                query = query.with_city(city);
            }
            if let Some(property_type) = cmd.property_type {
                query = query.with_property_type(property_type);
            }
            if let Some(source) = cmd.source.as_deref() {
                query = query.with_source(source);
            }
            if let Some(title) = cmd.title.as_deref() {
                query = query.with_title(title);
            }

            let listings = query.execute(db.pool()).await?;
            println!("{}", create_listing_table(&listings));
            println!("Showing {} of {} stored listings", listings.len(), db.count_listings().await?);
        }
        Commands::Items(cmd) => {
            let mut query = db.items().order_by(SortField::Price, true).with_limit(Some(cmd.limit));
            if let Some(category) = cmd.category.as_deref() {
                query = query.with_category(category);
            }
            if let Some(status) = cmd.status {
                query = query.with_status(status);
            }
            let items = query.execute(db.pool()).await?;
            println!("{}", create_item_table(&items));
        }
        Commands::IdxGet(cmd) => {
            let adapter = IdxAdapter::new(&config, &db).context("IDX source is not configured")?;
            match adapter.get_listing(&cmd.id).await? {
                Some(listing) => println!("{}", serde_json::to_string_pretty(&listing)?),
                None => anyhow::bail!("IDX listing {} has no usable title or price", cmd.id),
            }
        }
        Commands::Export(cmd) => {
            let listings = db.listings().order_by(SortField::Price, true).execute(db.pool()).await?;
            export_listings(&listings, &cmd.output)
                .with_context(|| format!("failed to write {}", cmd.output.display()))?;
            info!(count = listings.len(), output = %cmd.output.display(), "Exported listings");
        }
        Commands::PurgeCache => {
            let purged = IdxCache::new(db.pool().clone()).purge_expired().await?;
            info!(purged, "Purged expired IDX cache entries");
        }
        Commands::Migrations => {
            let applied = db.get_applied_migrations().await?;
            if applied.is_empty() {
                println!("No migrations applied");
            }
            for version in applied {
                println!("Applied migration version {}", version);
            }
        }
        Commands::Rollback(cmd) => {
            db.rollback(cmd.version).await?;
            info!(version = cmd.version, "Rolled back migration");
        }
    }

    Ok(())
}
