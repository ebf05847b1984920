//! Row normalization: tokenized rows to typed entity records.

use std::collections::HashMap;

use serde_json::Value;

use crate::config::KEY_ATTRIBUTE;
use crate::dump::catalog::{Catalog, EntityKind};
use crate::dump::extract::{InsertStatement, TableSchema};
use crate::dump::tokenize::tokenize_values;
use crate::dump::value::{integral_value, parse_number, ParsedValue};
use crate::error_handling::DumpError;
use crate::storage::Item;

/// One row ready to be written under its entity.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRecord {
    pub entity: EntityKind,
    pub attributes: Item,
}

impl NormalizedRecord {
    /// The record's `id` as an integer, if it has an integral numeric id.
    pub fn numeric_id(&self) -> Option<i64> {
        match self.attributes.get(KEY_ATTRIBUTE) {
            Some(Value::Number(n)) => integral_value(n),
            _ => None,
        }
    }
}

/// Turns one INSERT statement into entity records.
///
/// Returns `Ok(None)` when the table is not in the catalog; such tables are
/// skipped. Columns come from the statement's own list, else from the
/// table's `CREATE TABLE`. Missing trailing values become null and values
/// beyond the last column are dropped.
///
/// # Errors
///
/// `DumpError::MissingColumns` if neither source names the columns.
pub fn normalize_statement(
    insert: &InsertStatement<'_>,
    schemas: &HashMap<String, TableSchema>,
    catalog: &Catalog,
) -> Result<Option<Vec<NormalizedRecord>>, DumpError> {
    let Some(entity) = catalog.resolve_entity(&insert.table) else {
        log::debug!("skipping rows for unmapped table {}", insert.table);
        return Ok(None);
    };

    let columns = resolve_columns(insert, schemas)?;

    let records = tokenize_values(insert.values)
        .into_iter()
        .map(|row| {
            if row.len() > columns.len() {
                log::debug!(
                    "{}: dropping {} value(s) beyond the column list",
                    insert.table,
                    row.len() - columns.len()
                );
            }
            let mut values = row.into_iter();
            let attributes: Item = columns
                .iter()
                .map(|column| {
                    let raw = values.next().unwrap_or(ParsedValue::Null);
                    let value = coerce(entity, column, raw.into(), catalog);
                    (column.clone(), value)
                })
                .collect();
            NormalizedRecord { entity, attributes }
        })
        .collect();

    Ok(Some(records))
}

fn resolve_columns<'s>(
    insert: &'s InsertStatement<'_>,
    schemas: &'s HashMap<String, TableSchema>,
) -> Result<&'s [String], DumpError> {
    if let Some(columns) = insert.columns.as_deref().filter(|c| !c.is_empty()) {
        return Ok(columns);
    }
    schemas
        .get(&insert.table)
        .map(|schema| schema.columns.as_slice())
        .filter(|columns| !columns.is_empty())
        .ok_or_else(|| DumpError::MissingColumns {
            table: insert.table.clone(),
        })
}

fn coerce(entity: EntityKind, column: &str, value: Value, catalog: &Catalog) -> Value {
    if column == KEY_ATTRIBUTE {
        return coerce_id(value);
    }
    if catalog.is_boolean_column(entity, column) {
        return Value::Bool(coerce_flag(&value));
    }
    if catalog.is_json_column(column) {
        return coerce_json(column, value);
    }
    value
}

fn coerce_id(value: Value) -> Value {
    match value {
        Value::Number(n) => match integral_value(&n) {
            Some(i) => Value::from(i),
            None => Value::Number(n),
        },
        Value::String(s) => match parse_number(s.trim()) {
            Some(n) => coerce_id(Value::Number(n)),
            None => Value::String(s),
        },
        other => other,
    }
}

/// `1`, `"1"` and `"true"` in any case are true; booleans keep their value;
/// everything else is false.
pub fn coerce_flag(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => integral_value(n) == Some(1),
        Value::String(s) => {
            let s = s.trim();
            s == "1" || s.eq_ignore_ascii_case("true")
        }
        _ => false,
    }
}

fn coerce_json(column: &str, value: Value) -> Value {
    let Value::String(text) = value else {
        return value;
    };
    let trimmed = text.trim_start();
    if !(trimmed.starts_with('{') || trimmed.starts_with('[')) {
        return Value::String(text);
    }
    match serde_json::from_str(&text) {
        Ok(parsed) => parsed,
        Err(e) => {
            log::debug!("keeping {column} as text, not valid JSON: {e}");
            Value::String(text)
        }
    }
}
