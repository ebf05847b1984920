//! Upload server data structures.

use serde::Serialize;
use std::sync::Arc;

use crate::dump::Catalog;
use crate::storage::Store;

/// Shared state for the upload server
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub catalog: Arc<Catalog>,
}

impl AppState {
    pub fn new(store: Store, catalog: Catalog) -> Self {
        AppState {
            store,
            catalog: Arc::new(catalog),
        }
    }
}

/// JSON body of every failed request
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
