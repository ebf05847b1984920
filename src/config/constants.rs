//! Configuration constants.
//!
//! This module defines the operational limits used throughout the import
//! pipeline and the storage layer: batch sizes, retry policy, and defaults.

use std::time::Duration;

/// Default SQLite database path
pub const DB_PATH: &str = "./dump_import.db";

/// Environment variable that overrides the database path
pub const DB_PATH_ENV: &str = "DUMP_IMPORT_DB_PATH";

/// Attribute every stored item is keyed by
pub const KEY_ATTRIBUTE: &str = "id";

// Batched writes
/// Maximum number of write requests submitted in one batch call.
/// The storage backend processes at most this many requests per call and
/// reports the rest as unprocessed.
pub const BATCH_WRITE_LIMIT: usize = 25;

// Retry strategy for unprocessed batch items
/// Delay in milliseconds before the first resubmission of unprocessed items
pub const UNPROCESSED_RETRY_DELAY_MS: u64 = 200;
/// Maximum delay between resubmissions in seconds
pub const RETRY_MAX_DELAY_SECS: u64 = 5;
/// Maximum number of resubmissions after the initial batch call.
/// Once exhausted the batch fails instead of looping forever.
pub const RETRY_MAX_ATTEMPTS: usize = 8;

// Pagination
/// Default number of items returned per scan/query page
pub const DEFAULT_PAGE_SIZE: u32 = 100;

// SQLite connection
/// How long a connection waits on a locked database before failing
pub const SQLITE_BUSY_TIMEOUT: Duration = Duration::from_secs(5);
/// Maximum number of pooled SQLite connections
pub const SQLITE_MAX_CONNECTIONS: u32 = 8;

// Upload server
/// Default port for the upload server
pub const DEFAULT_SERVER_PORT: u16 = 8087;
/// Default bind address for the upload server
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1";
/// Maximum accepted upload size in bytes (64MB)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;
/// Multipart field carrying the dump
pub const UPLOAD_FIELD_NAME: &str = "file";
