//! Application initialization and resource setup.
//!
//! This module provides functions to initialize the shared resources:
//! - Logger
//! - Storage (SQLite pool with migrations applied)

mod logger;

use crate::config::Config;
use crate::error_handling::InitializationError;
use crate::storage::Store;

// Re-export public API
pub use logger::init_logger_with;

/// Opens the store described by `config`.
///
/// Creates the database file if needed, enables WAL mode and applies pending
/// migrations. The returned store is meant to be built once at startup and
/// handed to every caller.
pub async fn init_store(config: &Config) -> Result<Store, InitializationError> {
    let store = Store::connect(&config.db_path, config.store.clone()).await?;
    Ok(store)
}
