//! dump_import library: bulk import of legacy SQL dumps into a key-value store
//!
//! This library parses MySQL-style dumps (`CREATE TABLE` and `INSERT INTO`
//! statements), normalizes the rows into the logistics entities, and writes
//! them through a storage layer with conditional batched writes and atomic
//! id counters.
//!
//! # Example
//!
//! ```no_run
//! use dump_import::{import_dump, Catalog, Store, StoreOptions};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Store::connect("logistics.db".as_ref(), StoreOptions::default()).await?;
//! let dump = std::fs::read_to_string("legacy.sql")?;
//!
//! let report = import_dump(&store, &dump, &Catalog::default()).await?;
//! for (entity, count) in &report.inserted {
//!     println!("{entity}: {count} record(s)");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your application
//! or ensure you're calling library functions within an async context.

pub mod config;
pub mod dump;
pub mod error_handling;
pub mod import;
pub mod initialization;
pub mod server;
pub mod storage;

// Re-export public API
pub use config::{Config, LogFormat, LogLevel, RetryPolicy, StoreOptions};
pub use dump::{Catalog, EntityKind};
pub use error_handling::{DumpError, ImportError, InitializationError, StorageError};
pub use import::{import_bytes, import_dump, import_file, ImportReport};
pub use storage::{Item, Key, Store, WriteRequest};
