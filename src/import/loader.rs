//! Batch loading of normalized records.
//!
//! Records are grouped per entity in order of first appearance, then written
//! in chunks of at most [`BATCH_WRITE_LIMIT`] puts. Chunks are written one
//! after another so `max_id` only ever reflects committed rows.

use std::collections::HashMap;

use log::info;

use crate::config::BATCH_WRITE_LIMIT;
use crate::dump::{EntityKind, NormalizedRecord};
use crate::error_handling::StorageError;
use crate::storage::{Item, RequestsByTable, Store, WriteRequest};

/// What was written for one entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityLoad {
    pub entity: EntityKind,
    /// Records committed
    pub inserted: usize,
    /// Size of each committed batch, in submission order
    pub batch_sizes: Vec<usize>,
    /// Highest integral `id` among committed records
    pub max_id: Option<i64>,
}

impl EntityLoad {
    fn new(entity: EntityKind) -> Self {
        EntityLoad {
            entity,
            inserted: 0,
            batch_sizes: Vec::new(),
            max_id: None,
        }
    }
}

/// A load that stopped at a storage error.
///
/// `loads` describes everything committed before the failure, including the
/// entity that failed.
#[derive(Debug)]
pub struct LoadFailure {
    pub loads: Vec<EntityLoad>,
    pub source: StorageError,
}

/// Writes normalized records through [`Store::batch_write_all`].
pub struct BatchLoader<'a> {
    store: &'a Store,
    batch_size: usize,
}

impl<'a> BatchLoader<'a> {
    pub fn new(store: &'a Store) -> Self {
        BatchLoader {
            store,
            batch_size: BATCH_WRITE_LIMIT,
        }
    }

    /// Overrides the chunk size. Values below 1 are treated as 1.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Loads every record, entity by entity.
    ///
    /// The first storage error stops the load. Batches committed before it
    /// stay committed and are reported in the [`LoadFailure`].
    pub async fn load(
        &self,
        records: Vec<NormalizedRecord>,
    ) -> Result<Vec<EntityLoad>, LoadFailure> {
        let mut loads = Vec::new();

        for (entity, items) in group_by_entity(records) {
            let mut load = EntityLoad::new(entity);
            let total = items.len();
            let mut items = items.into_iter().peekable();

            while items.peek().is_some() {
                let chunk: Vec<(Option<i64>, Item)> =
                    items.by_ref().take(self.batch_size).collect();
                let chunk_len = chunk.len();
                let chunk_max = chunk.iter().filter_map(|(id, _)| *id).max();

                let requests: RequestsByTable = [(
                    entity.as_str().to_string(),
                    chunk
                        .into_iter()
                        .map(|(_, item)| WriteRequest::Put(item))
                        .collect(),
                )]
                .into_iter()
                .collect();

                if let Err(source) = self.store.batch_write_all(requests).await {
                    log::error!(
                        "{entity}: batch {} failed after {} of {total} record(s): {source}",
                        load.batch_sizes.len() + 1,
                        load.inserted
                    );
                    loads.push(load);
                    return Err(LoadFailure { loads, source });
                }

                load.inserted += chunk_len;
                load.batch_sizes.push(chunk_len);
                load.max_id = load.max_id.max(chunk_max);
            }

            info!(
                "{entity}: inserted {} record(s) in {} batch(es)",
                load.inserted,
                load.batch_sizes.len()
            );
            loads.push(load);
        }

        Ok(loads)
    }
}

/// Loads records with the default batch size.
pub async fn load_records(
    store: &Store,
    records: Vec<NormalizedRecord>,
) -> Result<Vec<EntityLoad>, LoadFailure> {
    BatchLoader::new(store).load(records).await
}

/// Groups records per entity, keeping first-appearance order of entities and
/// arrival order within each entity.
fn group_by_entity(records: Vec<NormalizedRecord>) -> Vec<(EntityKind, Vec<(Option<i64>, Item)>)> {
    let mut groups: Vec<(EntityKind, Vec<(Option<i64>, Item)>)> = Vec::new();
    let mut index: HashMap<EntityKind, usize> = HashMap::new();

    for record in records {
        let id = record.numeric_id();
        let slot = *index.entry(record.entity).or_insert_with(|| {
            groups.push((record.entity, Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push((id, record.attributes));
    }
    groups
}
