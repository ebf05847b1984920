//! Storage data types.
//!
//! Items are schemaless JSON objects. Every item is keyed by its
//! [`KEY_ATTRIBUTE`](crate::config::KEY_ATTRIBUTE) value.

use std::collections::BTreeMap;

use serde_json::{Map, Number, Value};

use crate::config::DEFAULT_PAGE_SIZE;

/// A stored record: attribute name to JSON value.
pub type Item = Map<String, Value>;

/// Write requests grouped by logical table name.
pub type RequestsByTable = BTreeMap<String, Vec<WriteRequest>>;

/// Key of a stored item.
///
/// Integral numbers encode identically whether they arrived as `7` or `7.0`,
/// so an id read from a dump matches the same id written by the application.
#[derive(Debug, Clone, PartialEq)]
pub struct Key(Value);

impl Key {
    /// Wraps a JSON value as a key. Only strings and numbers make sense as keys.
    pub fn new(value: Value) -> Self {
        Key(value)
    }

    /// Extracts the key from an item, if it carries one.
    pub fn of_item(item: &Item, attribute: &str) -> Option<Self> {
        match item.get(attribute) {
            Some(Value::Null) | None => None,
            Some(value) => Some(Key(value.clone())),
        }
    }

    /// The JSON value the key was built from.
    pub fn value(&self) -> &Value {
        &self.0
    }

    /// Canonical text stored in the `item_key` column.
    pub fn encode(&self) -> String {
        match &self.0 {
            Value::Number(n) => match integral(n) {
                Some(i) => i.to_string(),
                None => n.to_string(),
            },
            other => other.to_string(),
        }
    }
}

fn integral(n: &Number) -> Option<i64> {
    if let Some(i) = n.as_i64() {
        return Some(i);
    }
    n.as_f64()
        .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
        .map(|f| f as i64)
}

impl From<i64> for Key {
    fn from(id: i64) -> Self {
        Key(Value::from(id))
    }
}

impl From<&str> for Key {
    fn from(id: &str) -> Self {
        Key(Value::from(id))
    }
}

impl From<String> for Key {
    fn from(id: String) -> Self {
        Key(Value::from(id))
    }
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.encode())
    }
}

/// One entry of a batch write.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteRequest {
    /// Conditional insert: fails if the key is already present
    Put(Item),
    /// Removes the item if present
    Delete(Key),
}

/// Result of a single batch call.
#[derive(Debug, Default)]
pub struct BatchWriteOutput {
    /// Requests the backend did not get to; must be resubmitted
    pub unprocessed: RequestsByTable,
}

/// Counts the requests across all tables.
pub fn request_count(requests: &RequestsByTable) -> usize {
    requests.values().map(Vec::len).sum()
}

/// One page of a scan or query.
#[derive(Debug, Default)]
pub struct Page {
    pub items: Vec<Item>,
    /// Present when more items may follow; pass it back as `exclusive_start_key`
    pub last_evaluated_key: Option<i64>,
}

/// Parameters for a full-table scan.
#[derive(Debug, Clone)]
pub struct ScanParams {
    pub table: String,
    /// Items per page
    pub limit: u32,
    pub exclusive_start_key: Option<i64>,
    /// Optional attribute equality filter applied to every page
    pub filter: Option<(String, Value)>,
}

impl ScanParams {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            limit: DEFAULT_PAGE_SIZE,
            exclusive_start_key: None,
            filter: None,
        }
    }

    /// Sets the page size. Zero falls back to [`DEFAULT_PAGE_SIZE`].
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = page_limit(limit);
        self
    }

    pub fn with_filter(mut self, attribute: impl Into<String>, value: Value) -> Self {
        self.filter = Some((attribute.into(), value));
        self
    }
}

/// Page size used for `limit`; zero means the default.
pub(crate) fn page_limit(limit: u32) -> u32 {
    if limit == 0 {
        DEFAULT_PAGE_SIZE
    } else {
        limit
    }
}

/// Parameters for an indexed equality query on one attribute.
#[derive(Debug, Clone)]
pub struct QueryParams {
    pub table: String,
    pub attribute: String,
    pub value: Value,
    /// Items per page
    pub limit: u32,
    pub exclusive_start_key: Option<i64>,
}

impl QueryParams {
    pub fn new(table: impl Into<String>, attribute: impl Into<String>, value: Value) -> Self {
        Self {
            table: table.into(),
            attribute: attribute.into(),
            value,
            limit: DEFAULT_PAGE_SIZE,
            exclusive_start_key: None,
        }
    }

    /// Sets the page size. Zero falls back to [`DEFAULT_PAGE_SIZE`].
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = page_limit(limit);
        self
    }
}
