//! Error handling.
//!
//! Errors are split by layer:
//! - **Storage**: SQL failures, duplicate keys, id allocation, exhausted retries
//! - **Dump**: malformed statements and unresolved columns
//! - **Import**: input problems plus wrapped dump/storage failures
//!
//! Input errors are client-fixable; everything else is a server-side failure.

mod types;

// Re-export public API
pub use types::{DumpError, ImportError, InitializationError, StorageError};
