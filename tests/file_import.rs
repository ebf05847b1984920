//! Tests for importing dump files into a file-backed store.

use dump_import::{import_file, Catalog, ImportError};
use tempfile::TempDir;

#[path = "helpers.rs"]
mod helpers;

use helpers::{create_test_store_with_path, orders_dump, LOGISTICS_DUMP};

#[tokio::test]
async fn test_import_file_persists_across_reopen() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("logistics.db");
    let dump_path = temp_dir.path().join("legacy.sql");
    std::fs::write(&dump_path, LOGISTICS_DUMP).unwrap();

    {
        let store = create_test_store_with_path(&db_path).await;
        let report = import_file(&store, &dump_path, &Catalog::default())
            .await
            .unwrap();
        assert_eq!(report.inserted.get("customers"), Some(&3));
        store.pool().close().await;
    }

    let reopened = create_test_store_with_path(&db_path).await;
    assert_eq!(reopened.counter_value("customers").await.unwrap(), Some(7));
    assert_eq!(reopened.allocate_id("customers").await.unwrap(), 8);
}

#[tokio::test]
async fn test_import_file_missing_path() {
    let temp_dir = TempDir::new().unwrap();
    let store = create_test_store_with_path(&temp_dir.path().join("db.sqlite")).await;

    let err = import_file(&store, &temp_dir.path().join("nope.sql"), &Catalog::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ImportError::Io(_)));
    assert!(!err.is_client_error());
}

#[tokio::test]
async fn test_second_file_import_keeps_first_counters() {
    let temp_dir = TempDir::new().unwrap();
    let store = create_test_store_with_path(&temp_dir.path().join("db.sqlite")).await;

    let first = temp_dir.path().join("first.sql");
    std::fs::write(&first, orders_dump(30)).unwrap();
    import_file(&store, &first, &Catalog::default()).await.unwrap();

    let again = import_file(&store, &first, &Catalog::default())
        .await
        .unwrap_err();
    assert!(again.is_duplicate());
    assert_eq!(store.counter_value("orders").await.unwrap(), Some(30));
}
