// Shared test helpers for store setup and dump fixtures.
//
// This module provides common utilities used across multiple test files to reduce duplication.

use std::path::Path;

use dump_import::{Store, StoreOptions};

/// Creates an in-memory store with migrations applied.
#[allow(dead_code)] // Used by other test files
pub async fn create_test_store() -> Store {
    Store::in_memory(StoreOptions::default())
        .await
        .expect("Failed to create test store")
}

/// Opens (or creates) a file-backed store.
/// If the database file already exists, it is reused.
#[allow(dead_code)] // Used by other test files
pub async fn create_test_store_with_path(db_path: &Path) -> Store {
    Store::connect(db_path, StoreOptions::default())
        .await
        .expect("Failed to open test store")
}

/// Dump with a schema-backed table, an explicit-column table, an unmapped
/// table and string literals full of separators.
#[allow(dead_code)] // Used by other test files
pub const LOGISTICS_DUMP: &str = r#"-- MySQL dump 10.13  Distrib 8.0.36
/*!40101 SET NAMES utf8mb4 */;

DROP TABLE IF EXISTS `customers`;
CREATE TABLE `customers` (
  `id` int(11) NOT NULL AUTO_INCREMENT,
  `name` varchar(255) NOT NULL,
  `is_active` tinyint(1) NOT NULL DEFAULT '1',
  `address` json DEFAULT NULL,
  PRIMARY KEY (`id`)
) ENGINE=InnoDB AUTO_INCREMENT=8 DEFAULT CHARSET=utf8mb4;

LOCK TABLES `customers` WRITE;
INSERT INTO `customers` VALUES (3,'Acme; Inc.',1,'{\"city\":\"Oslo\",\"zip\":\"0150\"}'),(7,'O''Brien (Shipping)',0,NULL),(5,'Line\nBreak','true','[broken');
UNLOCK TABLES;

CREATE TABLE `shipment` (
  `id` int NOT NULL,
  `order_id` int,
  `isDelivered` tinyint(1),
  `fragile` tinyint(1)
) ENGINE=InnoDB;

INSERT INTO `shipment` (`id`, `order_id`, `isDelivered`, `fragile`) VALUES (10, 1, 1, 0), (11, 2, 0, '1');
INSERT INTO `migrations` VALUES (1,'2019_01_01_create_users');
"#;

/// Builds a dump with `count` orders whose ids run from 1 to `count`.
#[allow(dead_code)] // Used by other test files
pub fn orders_dump(count: usize) -> String {
    let rows: Vec<String> = (1..=count)
        .map(|i| format!("({i}, 'ORD-{i:04}', {}.50)", i * 10))
        .collect();
    format!(
        "INSERT INTO `orders` (`id`, `reference`, `total`) VALUES {};\n",
        rows.join(",")
    )
}
