//! Paginated scans and indexed queries.
//!
//! Pages are ordered by insertion sequence. `*_all` variants follow
//! `last_evaluated_key` until the table is exhausted and accumulate every
//! page in memory, which is fine at this application's data scale but is
//! unbounded for very large tables.

use sqlx::Row;

use crate::error_handling::StorageError;
use crate::storage::store::{bind_scalar, decode_body, json_path, Store};
use crate::storage::types::{page_limit, Item, Page, QueryParams, ScanParams};

impl Store {
    /// Reads one page of a table, optionally filtered on one attribute.
    pub async fn scan_page(&self, params: &ScanParams) -> Result<Page, StorageError> {
        let filter_clause = match &params.filter {
            Some((_, serde_json::Value::Null)) => " AND json_extract(body, ?) IS NULL",
            Some(_) => " AND json_extract(body, ?) = ?",
            None => "",
        };
        let limit = page_limit(params.limit);
        let sql = format!(
            "SELECT seq, body FROM items
             WHERE table_name = ? AND seq > ?{filter_clause}
             ORDER BY seq
             LIMIT ?"
        );

        let mut query = sqlx::query(&sql)
            .bind(&params.table)
            .bind(params.exclusive_start_key.unwrap_or(0));
        if let Some((attribute, value)) = &params.filter {
            query = query.bind(json_path(attribute));
            if !value.is_null() {
                query = bind_scalar(query, value);
            }
        }
        let rows = query
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await?;

        to_page(rows, limit)
    }

    /// Scans a whole table, following pagination until exhausted.
    pub async fn scan_all(&self, params: ScanParams) -> Result<Vec<Item>, StorageError> {
        let mut params = params;
        let mut items = Vec::new();
        loop {
            let page = self.scan_page(&params).await?;
            items.extend(page.items);
            match page.last_evaluated_key {
                Some(last) => params.exclusive_start_key = Some(last),
                None => return Ok(items),
            }
        }
    }

    /// Reads one page of items whose `attribute` equals `value`.
    pub async fn query_page(&self, params: &QueryParams) -> Result<Page, StorageError> {
        let condition = if params.value.is_null() {
            "json_extract(body, ?) IS NULL"
        } else {
            "json_extract(body, ?) = ?"
        };
        let limit = page_limit(params.limit);
        let sql = format!(
            "SELECT seq, body FROM items
             WHERE table_name = ? AND {condition} AND seq > ?
             ORDER BY seq
             LIMIT ?"
        );

        let mut query = sqlx::query(&sql)
            .bind(&params.table)
            .bind(json_path(&params.attribute));
        if !params.value.is_null() {
            query = bind_scalar(query, &params.value);
        }
        let rows = query
            .bind(params.exclusive_start_key.unwrap_or(0))
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await?;

        to_page(rows, limit)
    }

    /// Runs a query to completion, following pagination until exhausted.
    pub async fn query_all(&self, params: QueryParams) -> Result<Vec<Item>, StorageError> {
        let mut params = params;
        let mut items = Vec::new();
        loop {
            let page = self.query_page(&params).await?;
            items.extend(page.items);
            match page.last_evaluated_key {
                Some(last) => params.exclusive_start_key = Some(last),
                None => return Ok(items),
            }
        }
    }
}

/// A full page may be followed by more rows, so it carries its last sequence.
fn to_page(rows: Vec<sqlx::sqlite::SqliteRow>, limit: u32) -> Result<Page, StorageError> {
    let full = rows.len() as u64 >= u64::from(limit);
    let mut last_seq = None;
    let mut items = Vec::with_capacity(rows.len());
    for row in &rows {
        last_seq = Some(row.try_get::<i64, _>("seq")?);
        items.push(decode_body(row)?);
    }
    Ok(Page {
        items,
        last_evaluated_key: if full { last_seq } else { None },
    })
}
