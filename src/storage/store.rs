//! The store handle.
//!
//! A [`Store`] wraps the SQLite pool together with the storage options. It is
//! built once at startup and cloned into every caller; clones share the pool.

use std::path::Path;

use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{query::Query, Row, Sqlite, SqlitePool};
use serde_json::Value;

use crate::config::{StoreOptions, KEY_ATTRIBUTE};
use crate::error_handling::StorageError;
use crate::storage::migrations::run_migrations;
use crate::storage::pool::{init_db_pool_with_path, init_memory_pool};
use crate::storage::types::{Item, Key};

/// Handle to the key-value store.
#[derive(Clone)]
pub struct Store {
    pub(super) pool: SqlitePool,
    pub(super) options: StoreOptions,
}

impl Store {
    /// Wraps an existing pool. Migrations must already be applied.
    pub fn new(pool: SqlitePool, options: StoreOptions) -> Self {
        Store { pool, options }
    }

    /// Opens (creating if needed) the database file and applies migrations.
    pub async fn connect(db_path: &Path, options: StoreOptions) -> Result<Self, StorageError> {
        let pool = init_db_pool_with_path(db_path).await?;
        run_migrations(&pool).await?;
        Ok(Store::new(pool, options))
    }

    /// Opens a private in-memory store with migrations applied.
    pub async fn in_memory(options: StoreOptions) -> Result<Self, StorageError> {
        let pool = init_memory_pool().await?;
        run_migrations(&pool).await?;
        Ok(Store::new(pool, options))
    }

    /// The underlying connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn options(&self) -> &StoreOptions {
        &self.options
    }
}

/// Extracts the key of an item about to be written.
pub(super) fn item_key(table: &str, item: &Item) -> Result<Key, StorageError> {
    Key::of_item(item, KEY_ATTRIBUTE).ok_or_else(|| StorageError::MissingKey {
        table: table.to_string(),
        attribute: KEY_ATTRIBUTE.to_string(),
    })
}

/// Decodes the `body` column of an `items` row.
pub(super) fn decode_body(row: &SqliteRow) -> Result<Item, StorageError> {
    let body: String = row.try_get("body")?;
    Ok(serde_json::from_str(&body)?)
}

/// SQLite JSON path for a top-level attribute.
///
/// The name is double-quoted so attributes containing dots or brackets
/// address a single member.
pub(super) fn json_path(attribute: &str) -> String {
    format!("$.\"{}\"", attribute.replace('"', "\\\""))
}

/// Binds a JSON scalar so it compares equal to what `json_extract` returns.
///
/// `json_extract` yields booleans as 0/1 integers and nested values as JSON
/// text; binding the same representation keeps equality checks in SQL.
pub(super) fn bind_scalar<'q>(
    query: Query<'q, Sqlite, SqliteArguments<'q>>,
    value: &Value,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    match value {
        Value::Null => query.bind(None::<String>),
        Value::Bool(b) => query.bind(i64::from(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => query.bind(i),
            None => query.bind(n.as_f64()),
        },
        Value::String(s) => query.bind(s.clone()),
        other => query.bind(other.to_string()),
    }
}
