use luxe_core::db::migrations::MIGRATIONS;
use luxe_core::Database;
use tempfile::tempdir;

#[tokio::test]
async fn test_all_migrations_applied_on_open() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = tempdir()?;
    let db = Database::new(temp_dir.path().join("luxe.db")).await?;

    let applied = db.get_applied_migrations().await?;
    let expected: Vec<i32> = MIGRATIONS.iter().map(|m| m.version).collect();
    assert_eq!(applied, expected);

    // Re-running is a no-op.
    db.migrate().await?;
    assert_eq!(db.get_applied_migrations().await?, expected);
    Ok(())
}

#[tokio::test]
async fn test_rollback_to_v1() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = tempdir()?;
    let db = Database::new(temp_dir.path().join("luxe.db")).await?;

    db.rollback(1).await?;
    assert_eq!(db.get_applied_migrations().await?, vec![1]);

    db.migrate().await?;
    assert_eq!(db.get_applied_migrations().await?.len(), MIGRATIONS.len());
    Ok(())
}

#[tokio::test]
async fn test_reopening_keeps_data() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = tempdir()?;
    let path = temp_dir.path().join("luxe.db");

    {
        let db = Database::new(&path).await?;
        let record = crate::listing("Frond Villa", "Dubai", 4_000_000, luxe_core::PropertyType::Villa, "bayut");
        db.upsert_listing(&record, chrono::Utc::now()).await?;
    }

    let db = Database::new(&path).await?;
    assert_eq!(db.count_listings().await?, 1);
    Ok(())
}
