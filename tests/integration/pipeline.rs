use crate::test_config;
use luxe_core::{Database, ItemRecord, ScrapedRecord, Synchronizer};
use luxe_scrapers::{
    bayut, AdapterFactory, IngestJob, InvokeRequest, PageContent, SourceName, StaticScrapeApi,
};
use std::sync::Arc;
use tempfile::tempdir;

fn detail_url(id: u32) -> String {
    format!("https://www.bayut.com/property/details-{}.html", id)
}

fn detail_page(id: u32, price: &str) -> PageContent {
    PageContent::from_markdown(format!(
        "# Signature Villa {id}\n\n{price}\n\n5 Beds | 6 Baths | 8,000 sqft\n\nLocation: Emirates Hills, Dubai\n\n\
         Set on the golf course, this villa offers a private garden, pool and views across the lake.",
        id = id,
        price = price
    ))
}

/// One Bayut seed page linking `prices.len()` detail pages.
fn bayut_api(prices: &[&str]) -> Arc<StaticScrapeApi> {
    let index = (1..=prices.len() as u32)
        .map(|id| format!("[Villa {}]({})", id, detail_url(id)))
        .collect::<Vec<_>>()
        .join("\n");

    let mut api = StaticScrapeApi::new().with_page(bayut::seed_urls()[0].clone(), PageContent::from_markdown(index));
    for (id, price) in (1..).zip(prices) {
        api = api.with_page(detail_url(id), detail_page(id, price));
    }
    Arc::new(api)
}

#[tokio::test]
async fn test_second_run_updates_instead_of_inserting() {
    let temp_dir = tempdir().unwrap();
    let db = Database::new(temp_dir.path().join("luxe.db")).await.unwrap();
    let config = test_config();
    let job = IngestJob::new(config.clone(), db.clone());
    let api = bayut_api(&["AED 5,000,000", "AED 7,500,000", "AED 12,000,000"]);
    let adapter = AdapterFactory::create_with_api(SourceName::Bayut, &config, &db, api).unwrap();

    let first = job.run(adapter.as_ref(), &InvokeRequest::default()).await;
    assert!(first.success);
    assert_eq!((first.inserted, first.updated), (3, 0));

    let second = job.run(adapter.as_ref(), &InvokeRequest::default()).await;
    assert!(second.success);
    assert_eq!((second.inserted, second.updated), (0, first.inserted));
    assert_eq!(db.count_listings().await.unwrap(), 3);
}

#[tokio::test]
async fn test_priceless_candidates_never_reach_storage() {
    let db = Database::in_memory().await.unwrap();
    let config = test_config();
    let job = IngestJob::new(config.clone(), db.clone());

    let prices = [
        "AED 5,000,000",
        "Price on request",
        "AED 6,000,000",
        "AED 7,000,000",
        "Contact agent",
        "AED 8,000,000",
        "AED 9,000,000",
        "AED 0",
        "AED 10,000,000",
        "AED 11,000,000",
    ];
    let adapter = AdapterFactory::create_with_api(SourceName::Bayut, &config, &db, bayut_api(&prices)).unwrap();

    let response = job.run(adapter.as_ref(), &InvokeRequest::default()).await;
    assert!(response.success);
    assert_eq!(response.urls_found, Some(10));
    assert_eq!(response.scraped, 7);
    assert_eq!((response.inserted, response.updated, response.failed), (7, 0, 0));

    let stored = db.listings().execute(db.pool()).await.unwrap();
    assert_eq!(stored.len(), 7);
    assert!(stored.iter().all(|listing| listing.record.price > 0));
    assert!(stored.iter().all(|listing| listing.record.lifestyle_tags.contains(&"Golf".to_string())));
}

#[tokio::test]
async fn test_page_without_price_emits_nothing() {
    let db = Database::in_memory().await.unwrap();
    let config = test_config();
    let job = IngestJob::new(config.clone(), db.clone());
    let adapter =
        AdapterFactory::create_with_api(SourceName::Bayut, &config, &db, bayut_api(&["Price on application"])).unwrap();

    let response = job.run(adapter.as_ref(), &InvokeRequest::default()).await;
    assert!(response.success);
    assert_eq!(response.scraped, 0);
    assert_eq!(response.inserted, 0);
    assert_eq!(db.count_listings().await.unwrap(), 0);
}

#[tokio::test]
async fn test_limit_caps_discovery() {
    let db = Database::in_memory().await.unwrap();
    let config = test_config();
    let job = IngestJob::new(config.clone(), db.clone());
    let api = bayut_api(&["AED 5,000,000", "AED 6,000,000", "AED 7,000,000", "AED 8,000,000"]);
    let adapter = AdapterFactory::create_with_api(SourceName::Bayut, &config, &db, api).unwrap();

    let request = InvokeRequest { limit: Some(2), ..Default::default() };
    let response = job.run(adapter.as_ref(), &request).await;
    assert_eq!(response.urls_found, Some(2));
    assert_eq!(response.inserted, 2);
}

#[tokio::test]
async fn test_items_upsert_by_title_and_category() {
    let db = Database::in_memory().await.unwrap();
    let sync = Synchronizer::new(db.clone());

    let item = |price: i64| ItemRecord {
        title: "Hermès Birkin 25".to_string(),
        price,
        category: "Handbags".to_string(),
        description: None,
        images: Vec::new(),
        condition: Some("Pristine".to_string()),
        provenance: None,
        dimensions: Some("25 x 20 x 13 cm".to_string()),
        auction_house: "Sotheby's".to_string(),
        status: Default::default(),
        source_url: "https://www.sothebys.com/en/buy/luxury/handbags/bag/birkin-25".to_string(),
    };

    let first = sync.sync(&[ScrapedRecord::Item(item(40_000))]).await;
    assert_eq!(first.inserted, 1);
    let second = sync.sync(&[ScrapedRecord::Item(item(42_000))]).await;
    assert_eq!(second.updated, 1);

    let items = db.items().execute(db.pool()).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].record.price, 42_000);
}
