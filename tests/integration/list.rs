use crate::listing;
use luxe_core::db::SortField;
use luxe_core::{Database, ListingStatus, PropertyType, ScrapedRecord, Synchronizer};

async fn seeded_db() -> Database {
    let db = Database::in_memory().await.unwrap();
    let records: Vec<ScrapedRecord> = vec![
        listing("Frond Villa", "Dubai", 4_000_000, PropertyType::Villa, "bayut").into(),
        listing("Marina Penthouse", "Dubai", 2_500_000, PropertyType::Penthouse, "sothebys").into(),
        listing("Bay Island Mansion", "Dubai", 30_000_000, PropertyType::Mansion, "christies").into(),
        listing("Ocean Drive Estate", "Miami", 9_000_000, PropertyType::House, "idx").into(),
    ];
    let report = Synchronizer::new(db.clone()).sync(&records).await;
    assert_eq!(report.inserted, 4);
    db
}

#[tokio::test]
async fn test_list_with_filters() {
    let db = seeded_db().await;

    let in_range = db.listings().with_price_range(Some(3_000_000), Some(10_000_000)).execute(db.pool()).await.unwrap();
    assert_eq!(in_range.len(), 2);

    let dubai = db.listings().with_city("Dubai").execute(db.pool()).await.unwrap();
    assert_eq!(dubai.len(), 3);

    let villas = db.listings().with_property_type(PropertyType::Villa).execute(db.pool()).await.unwrap();
    assert_eq!(villas.len(), 1);
    assert_eq!(villas[0].record.title, "Frond Villa");

    let idx = db.listings().with_source("idx").execute(db.pool()).await.unwrap();
    assert_eq!(idx[0].record.city, "Miami");
}

#[tokio::test]
async fn test_list_sorting_and_paging() {
    let db = seeded_db().await;

    let page = db
        .listings()
        .order_by(SortField::Price, true)
        .with_limit(Some(2))
        .with_offset(Some(1))
        .execute(db.pool())
        .await
        .unwrap();
    let prices: Vec<i64> = page.iter().map(|l| l.record.price).collect();
    assert_eq!(prices, vec![9_000_000, 4_000_000]);
}

#[tokio::test]
async fn test_list_by_status() {
    let db = seeded_db().await;
    let mut sold = listing("Marina Penthouse", "Dubai", 2_500_000, PropertyType::Penthouse, "sothebys");
    sold.status = ListingStatus::Sold;
    let report = Synchronizer::new(db.clone()).sync(&[sold.into()]).await;
    assert_eq!(report.updated, 1);

    let active = db.listings().with_status(ListingStatus::Active).execute(db.pool()).await.unwrap();
    assert_eq!(active.len(), 3);
    let sold = db.listings().with_status(ListingStatus::Sold).execute(db.pool()).await.unwrap();
    assert_eq!(sold.len(), 1);
    assert_eq!(sold[0].record.title, "Marina Penthouse");
}
