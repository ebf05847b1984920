//! Dump import pipeline.
//!
//! Parsing is pure and finishes before anything is written, so a dump with
//! an unresolvable table fails without touching storage. Loading then writes
//! entity by entity and counters are raised to the imported maxima.

mod counters;
mod loader;

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use log::{error, info};
use serde::Serialize;

use crate::dump::{
    extract_inserts, extract_schemas, normalize_statement, parse_insert, Catalog,
    NormalizedRecord,
};
use crate::error_handling::ImportError;
use crate::storage::Store;

pub use counters::{max_ids, reconcile_counters};
pub use loader::{load_records, BatchLoader, EntityLoad, LoadFailure};

/// Outcome of a successful import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    /// Records inserted per entity key
    pub inserted: BTreeMap<String, usize>,
    /// Counter value per entity key; entities without numeric ids are absent
    pub counters: BTreeMap<String, i64>,
    /// Dump tables that map to no entity
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped_tables: Vec<String>,
}

/// Records parsed from a dump, not yet written.
#[derive(Debug, Clone, Default)]
pub struct ParsedDump {
    pub records: Vec<NormalizedRecord>,
    pub skipped_tables: Vec<String>,
}

/// Parses a dump into normalized records.
///
/// # Errors
///
/// `EmptyDump` for blank input, `NoInsertStatements` if the dump has no
/// INSERT, and `Dump` for malformed statements or unresolvable columns.
pub fn parse_dump(dump: &str, catalog: &Catalog) -> Result<ParsedDump, ImportError> {
    if dump.trim().is_empty() {
        return Err(ImportError::EmptyDump);
    }

    let schemas = extract_schemas(dump);
    let statements = extract_inserts(dump);
    if statements.is_empty() {
        return Err(ImportError::NoInsertStatements);
    }
    info!(
        "Found {} INSERT statement(s) and {} table definition(s)",
        statements.len(),
        schemas.len()
    );

    let mut records = Vec::new();
    let mut skipped = BTreeSet::new();
    for statement in statements {
        let insert = parse_insert(statement.text)?;
        match normalize_statement(&insert, &schemas, catalog)? {
            Some(rows) => records.extend(rows),
            None => {
                skipped.insert(insert.table);
            }
        }
    }

    Ok(ParsedDump {
        records,
        skipped_tables: skipped.into_iter().collect(),
    })
}

/// Imports a dump held in memory.
///
/// On a storage failure the counters of everything already committed are
/// still reconciled before the error is returned, so later id allocations
/// never collide with imported rows.
pub async fn import_dump(
    store: &Store,
    dump: &str,
    catalog: &Catalog,
) -> Result<ImportReport, ImportError> {
    let parsed = parse_dump(dump, catalog)?;
    info!("Loading {} record(s)", parsed.records.len());

    let loads = match load_records(store, parsed.records).await {
        Ok(loads) => loads,
        Err(LoadFailure { loads, source }) => {
            error!("Import aborted: {source}");
            if let Err(e) = reconcile_counters(store, &max_ids(&loads)).await {
                error!("Failed to reconcile counters after aborted import: {e}");
            }
            return Err(source.into());
        }
    };

    let counters = reconcile_counters(store, &max_ids(&loads)).await?;

    let report = ImportReport {
        inserted: loads
            .iter()
            .map(|load| (load.entity.as_str().to_string(), load.inserted))
            .collect(),
        counters: counters
            .into_iter()
            .map(|(entity, value)| (entity.as_str().to_string(), value))
            .collect(),
        skipped_tables: parsed.skipped_tables,
    };
    info!(
        "Import complete: {} record(s) across {} entity type(s)",
        report.inserted.values().sum::<usize>(),
        report.inserted.len()
    );
    Ok(report)
}

/// Imports a dump from raw bytes, which must be UTF-8.
pub async fn import_bytes(
    store: &Store,
    bytes: &[u8],
    catalog: &Catalog,
) -> Result<ImportReport, ImportError> {
    if bytes.is_empty() {
        return Err(ImportError::EmptyDump);
    }
    let dump = std::str::from_utf8(bytes).map_err(|_| ImportError::InvalidEncoding)?;
    import_dump(store, dump, catalog).await
}

/// Reads a dump file and imports it.
pub async fn import_file(
    store: &Store,
    path: &Path,
    catalog: &Catalog,
) -> Result<ImportReport, ImportError> {
    let bytes = tokio::fs::read(path).await?;
    info!("Read {} byte(s) from {}", bytes.len(), path.display());
    import_bytes(store, &bytes, catalog).await
}
