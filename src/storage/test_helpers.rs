//! Shared test helpers for storage module tests.
//!
//! This module provides common utilities for store setup and test data creation
//! used across storage and import tests.

#[cfg(test)]
use serde_json::{json, Value};

#[cfg(test)]
use crate::config::StoreOptions;
#[cfg(test)]
use crate::storage::{Item, Store, WriteRequest};

/// Creates an in-memory test store with migrations applied and default options.
#[cfg(test)]
pub async fn create_test_store() -> Store {
    create_test_store_with(StoreOptions::default()).await
}

/// Creates an in-memory test store with the given options.
#[cfg(test)]
pub async fn create_test_store_with(options: StoreOptions) -> Store {
    Store::in_memory(options)
        .await
        .expect("Failed to create test store")
}

/// Converts a `json!` object literal into an item.
#[cfg(test)]
pub fn item(value: Value) -> Item {
    match value {
        Value::Object(map) => map,
        other => panic!("test item must be a JSON object, got {other}"),
    }
}

/// Builds one put request per id in the range.
#[cfg(test)]
pub fn puts(ids: std::ops::RangeInclusive<i64>) -> Vec<WriteRequest> {
    ids.map(|id| WriteRequest::Put(item(json!({"id": id, "name": format!("item {id}")}))))
        .collect()
}
