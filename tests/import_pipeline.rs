//! End-to-end tests for the dump import pipeline.

use dump_import::storage::{QueryParams, ScanParams};
use dump_import::{import_dump, Catalog, EntityKind, ImportError, Key, StorageError};
use serde_json::json;

#[path = "helpers.rs"]
mod helpers;

use helpers::{create_test_store, orders_dump, LOGISTICS_DUMP};

#[tokio::test]
async fn test_logistics_dump_imports_all_mapped_tables() {
    let store = create_test_store().await;
    let report = import_dump(&store, LOGISTICS_DUMP, &Catalog::default())
        .await
        .expect("import should succeed");

    assert_eq!(report.inserted.get("customers"), Some(&3));
    assert_eq!(report.inserted.get("shipments"), Some(&2));
    assert_eq!(report.counters.get("customers"), Some(&7));
    assert_eq!(report.counters.get("shipments"), Some(&11));
    assert_eq!(report.skipped_tables, vec!["migrations".to_string()]);

    let acme = store
        .get("customers", &Key::from(3))
        .await
        .unwrap()
        .expect("customer 3 stored");
    assert_eq!(acme["name"], json!("Acme; Inc."));
    assert_eq!(acme["is_active"], json!(true));
    assert_eq!(acme["address"], json!({"city": "Oslo", "zip": "0150"}));

    let obrien = store.get("customers", &Key::from(7)).await.unwrap().unwrap();
    assert_eq!(obrien["name"], json!("O'Brien (Shipping)"));
    assert_eq!(obrien["is_active"], json!(false));

    let broken = store.get("customers", &Key::from(5)).await.unwrap().unwrap();
    assert_eq!(broken["name"], json!("Line\nBreak"));
    assert_eq!(broken["is_active"], json!(true));
    assert_eq!(broken["address"], json!("[broken"));
}

#[tokio::test]
async fn test_legacy_flag_and_generic_flags_on_shipments() {
    let store = create_test_store().await;
    import_dump(&store, LOGISTICS_DUMP, &Catalog::default())
        .await
        .unwrap();

    let delivered = store
        .query_all(QueryParams::new("shipments", "isDelivered", json!(true)))
        .await
        .unwrap();
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0]["id"], json!(10));

    let fragile = store
        .query_all(QueryParams::new("shipments", "fragile", json!(true)))
        .await
        .unwrap();
    assert_eq!(fragile.len(), 1);
    assert_eq!(fragile[0]["id"], json!(11));
}

#[tokio::test]
async fn test_allocation_continues_above_imported_ids() {
    let store = create_test_store().await;
    import_dump(&store, LOGISTICS_DUMP, &Catalog::default())
        .await
        .unwrap();

    assert_eq!(
        store.allocate_id(EntityKind::Customers.as_str()).await.unwrap(),
        8
    );
    assert_eq!(
        store.allocate_id(EntityKind::Shipments.as_str()).await.unwrap(),
        12
    );
}

#[tokio::test]
async fn test_reimport_fails_with_duplicate_key() {
    let store = create_test_store().await;
    import_dump(&store, LOGISTICS_DUMP, &Catalog::default())
        .await
        .unwrap();

    let err = import_dump(&store, LOGISTICS_DUMP, &Catalog::default())
        .await
        .expect_err("second import must not double-insert");
    assert!(matches!(
        err,
        ImportError::Storage(StorageError::DuplicateKey { .. })
    ));

    let customers = store
        .scan_all(ScanParams::new("customers"))
        .await
        .unwrap();
    assert_eq!(customers.len(), 3);
}

#[tokio::test]
async fn test_large_entity_is_paginated_back_in_order() {
    let store = create_test_store().await;
    let report = import_dump(&store, &orders_dump(53), &Catalog::default())
        .await
        .unwrap();
    assert_eq!(report.inserted.get("orders"), Some(&53));
    assert_eq!(report.counters.get("orders"), Some(&53));

    let first_page = store
        .scan_page(&ScanParams::new("orders").with_limit(20))
        .await
        .unwrap();
    assert_eq!(first_page.items.len(), 20);
    assert!(first_page.last_evaluated_key.is_some());

    let all = store
        .scan_all(ScanParams::new("orders").with_limit(20))
        .await
        .unwrap();
    let ids: Vec<i64> = all.iter().filter_map(|o| o["id"].as_i64()).collect();
    assert_eq!(ids, (1..=53).collect::<Vec<_>>());
    assert_eq!(all[52]["total"], json!(530.5));
}

#[tokio::test]
async fn test_custom_catalog_maps_extra_table() {
    let store = create_test_store().await;
    let catalog = Catalog::default()
        .with_table("legacy_clients", EntityKind::Customers)
        .with_boolean_column("vip");
    let dump = "INSERT INTO `legacy_clients` (`id`, `vip`) VALUES (41, 'TRUE'), (42, 'no');";

    let report = import_dump(&store, dump, &catalog).await.unwrap();
    assert_eq!(report.inserted.get("customers"), Some(&2));

    let vip = store.get("customers", &Key::from(41)).await.unwrap().unwrap();
    assert_eq!(vip["vip"], json!(true));
    let regular = store.get("customers", &Key::from(42)).await.unwrap().unwrap();
    assert_eq!(regular["vip"], json!(false));
}
