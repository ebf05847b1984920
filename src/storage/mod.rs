// storage/mod.rs
// Key-value storage access layer over SQLite

mod batch;
mod counter;
pub mod migrations;
pub mod pool;
mod scan;
mod store;
mod table;
pub mod test_helpers;
mod types;

// Re-export commonly used items
pub use batch::retry_delays;
pub use migrations::run_migrations;
pub use store::Store;
pub use types::{
    request_count, BatchWriteOutput, Item, Key, Page, QueryParams, RequestsByTable, ScanParams,
    WriteRequest,
};
