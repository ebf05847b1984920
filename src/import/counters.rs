//! Counter reconciliation after a load.

use std::collections::BTreeMap;

use log::info;

use crate::dump::EntityKind;
use crate::error_handling::StorageError;
use crate::import::loader::EntityLoad;
use crate::storage::Store;

/// Collects the highest committed id per entity, skipping entities without
/// positive numeric ids.
pub fn max_ids(loads: &[EntityLoad]) -> BTreeMap<EntityKind, i64> {
    loads
        .iter()
        .filter_map(|load| load.max_id.filter(|id| *id > 0).map(|id| (load.entity, id)))
        .collect()
}

/// Raises each entity's counter to its imported maximum id.
///
/// Entities missing from `max_ids` are left untouched. Returns the counter
/// value stored for each entity, which is above the imported maximum if the
/// counter had already moved past it.
pub async fn reconcile_counters(
    store: &Store,
    max_ids: &BTreeMap<EntityKind, i64>,
) -> Result<BTreeMap<EntityKind, i64>, StorageError> {
    let mut counters = BTreeMap::new();
    for (&entity, &max_id) in max_ids {
        if max_id <= 0 {
            continue;
        }
        let stored = store.set_counter(entity.as_str(), max_id).await?;
        info!("{entity}: counter set to {stored}");
        counters.insert(entity, stored);
    }
    Ok(counters)
}
