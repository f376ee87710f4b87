use crate::listing;
use luxe_core::{export_listings, Database, PropertyType, ScrapedRecord, Synchronizer};
use tempfile::tempdir;

#[tokio::test]
async fn test_export_to_csv() {
    let temp_dir = tempdir().unwrap();
    let db = Database::new(temp_dir.path().join("luxe.db")).await.unwrap();
    let export_path = temp_dir.path().join("export.csv");

    let records: Vec<ScrapedRecord> = vec![
        listing("Frond Villa", "Dubai", 4_000_000, PropertyType::Villa, "bayut").into(),
        listing("Marina Penthouse", "Dubai", 2_500_000, PropertyType::Penthouse, "sothebys").into(),
    ];
    Synchronizer::new(db.clone()).sync(&records).await;

    let listings = db.listings().execute(db.pool()).await.unwrap();
    export_listings(&listings, &export_path).unwrap();

    let content = std::fs::read_to_string(&export_path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("ID,Title,Price (USD)"));
    assert!(content.contains("Frond Villa,4000000,4,5"));
    assert!(content.contains("Marina Penthouse,2500000"));
}
