//! Single-item operations: get, conditional put, partial update, atomic
//! increment and delete.

use log::debug;
use serde_json::{Number, Value};

use crate::config::KEY_ATTRIBUTE;
use crate::error_handling::StorageError;
use crate::storage::store::{decode_body, item_key, json_path, Store};
use crate::storage::types::{Item, Key};

impl Store {
    /// Fetches one item by key.
    pub async fn get(&self, table: &str, key: &Key) -> Result<Option<Item>, StorageError> {
        let row = sqlx::query("SELECT body FROM items WHERE table_name = ? AND item_key = ?")
            .bind(table)
            .bind(key.encode())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(decode_body).transpose()
    }

    /// Inserts an item unless one with the same key already exists.
    ///
    /// # Errors
    ///
    /// `StorageError::DuplicateKey` if the key is taken; the stored item is
    /// left untouched.
    pub async fn put(&self, table: &str, item: &Item) -> Result<(), StorageError> {
        let key = item_key(table, item)?;
        let result = sqlx::query(
            "INSERT INTO items (table_name, item_key, body) VALUES (?, ?, ?)
             ON CONFLICT(table_name, item_key) DO NOTHING",
        )
        .bind(table)
        .bind(key.encode())
        .bind(serde_json::to_string(item)?)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::DuplicateKey {
                table: table.to_string(),
                key: key.encode(),
            });
        }
        Ok(())
    }

    /// Sets the given attributes on an item, creating it if absent.
    ///
    /// Attributes passed as `None` are left alone. If every attribute is
    /// `None` nothing is written and `None` is returned; otherwise the full
    /// item after the update is returned.
    pub async fn update(
        &self,
        table: &str,
        key: &Key,
        attributes: &[(&str, Option<Value>)],
    ) -> Result<Option<Item>, StorageError> {
        let defined: Vec<(&str, &Value)> = attributes
            .iter()
            .filter_map(|(name, value)| value.as_ref().map(|v| (*name, v)))
            .filter(|(name, _)| *name != KEY_ATTRIBUTE)
            .collect();
        if defined.is_empty() {
            debug!("update on {table}/{key} skipped: no defined attributes");
            return Ok(None);
        }

        let mut initial = Item::new();
        initial.insert(KEY_ATTRIBUTE.to_string(), key.value().clone());
        for (name, value) in &defined {
            initial.insert((*name).to_string(), (*value).clone());
        }

        // json_set(items.body, path1, json(value1), path2, json(value2), ...)
        let set_args = vec!["?, json(?)"; defined.len()].join(", ");
        let sql = format!(
            "INSERT INTO items (table_name, item_key, body) VALUES (?, ?, ?)
             ON CONFLICT(table_name, item_key) DO UPDATE SET body = json_set(items.body, {set_args})
             RETURNING body"
        );

        let mut query = sqlx::query(&sql)
            .bind(table)
            .bind(key.encode())
            .bind(serde_json::to_string(&initial)?);
        for (name, value) in &defined {
            query = query.bind(json_path(name)).bind(value.to_string());
        }

        let row = query.fetch_one(&self.pool).await?;
        decode_body(&row).map(Some)
    }

    /// Atomically adds the given amounts to numeric attributes.
    ///
    /// Missing attributes count as zero and a missing item is created. Zero
    /// amounts are skipped; if nothing remains, nothing is written and `None`
    /// is returned.
    pub async fn increment(
        &self,
        table: &str,
        key: &Key,
        amounts: &[(&str, Number)],
    ) -> Result<Option<Item>, StorageError> {
        let nonzero: Vec<(&str, &Number)> = amounts
            .iter()
            .filter(|(name, amount)| *name != KEY_ATTRIBUTE && amount.as_f64() != Some(0.0))
            .map(|(name, amount)| (*name, amount))
            .collect();
        if nonzero.is_empty() {
            debug!("increment on {table}/{key} skipped: nothing to add");
            return Ok(None);
        }

        let mut initial = Item::new();
        initial.insert(KEY_ATTRIBUTE.to_string(), key.value().clone());
        for (name, amount) in &nonzero {
            initial.insert((*name).to_string(), Value::Number((*amount).clone()));
        }

        let set_args =
            vec!["?, coalesce(json_extract(items.body, ?), 0) + ?"; nonzero.len()].join(", ");
        let sql = format!(
            "INSERT INTO items (table_name, item_key, body) VALUES (?, ?, ?)
             ON CONFLICT(table_name, item_key) DO UPDATE SET body = json_set(items.body, {set_args})
             RETURNING body"
        );

        let mut query = sqlx::query(&sql)
            .bind(table)
            .bind(key.encode())
            .bind(serde_json::to_string(&initial)?);
        for (name, amount) in &nonzero {
            let path = json_path(name);
            query = query.bind(path.clone()).bind(path);
            query = match amount.as_i64() {
                Some(i) => query.bind(i),
                None => query.bind(amount.as_f64()),
            };
        }

        let row = query.fetch_one(&self.pool).await?;
        decode_body(&row).map(Some)
    }

    /// Removes an item. Returns whether anything was deleted.
    pub async fn delete(&self, table: &str, key: &Key) -> Result<bool, StorageError> {
        let result = sqlx::query("DELETE FROM items WHERE table_name = ? AND item_key = ?")
            .bind(table)
            .bind(key.encode())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
