//! Error type definitions.
//!
//! Each layer has its own error enum: storage, dump parsing, the import
//! pipeline that joins them, and process initialization.

use log::SetLoggerError;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error creating or connecting to the database.
    #[error("Database initialization error: {0}")]
    DatabaseError(#[from] StorageError),
}

/// Error types for storage operations.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Error creating the database file.
    #[error("Database file creation error: {0}")]
    FileCreationError(String),

    /// SQL execution error.
    #[error("SQL error: {0}")]
    SqlError(#[from] sqlx::Error),

    /// Error applying schema migrations.
    #[error("Migration error: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    /// A conditional put found an item already stored under the same key.
    #[error("Item with key {key} already exists in table {table}")]
    DuplicateKey { table: String, key: String },

    /// The item carries no key attribute.
    #[error("Item for table {table} has no '{attribute}' attribute")]
    MissingKey { table: String, attribute: String },

    /// The counter increment did not yield an integer.
    #[error("Failed to allocate id from counter {counter}: {reason}")]
    Allocation { counter: String, reason: String },

    /// Unprocessed batch items remained after the retry budget was spent.
    #[error("{remaining} write request(s) still unprocessed after {attempts} attempts")]
    UnprocessedItems { remaining: usize, attempts: usize },

    /// A stored item body could not be (de)serialized.
    #[error("Item serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StorageError {
    /// Returns true if the error is SQLite reporting a busy or locked database.
    ///
    /// Such failures leave nothing committed, so the batch layer reports the
    /// requests as unprocessed rather than failing.
    pub fn is_contention(&self) -> bool {
        match self {
            StorageError::SqlError(sqlx::Error::Database(db_err)) => {
                // SQLITE_BUSY = 5, SQLITE_LOCKED = 6 (extended codes keep the low byte)
                db_err
                    .code()
                    .and_then(|code| code.parse::<i32>().ok())
                    .map(|code| matches!(code & 0xff, 5 | 6))
                    .unwrap_or(false)
            }
            StorageError::SqlError(sqlx::Error::PoolTimedOut) => true,
            _ => false,
        }
    }
}

/// Error types for dump parsing and normalization.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DumpError {
    /// An INSERT statement header could not be parsed.
    #[error("Malformed INSERT statement: {0}")]
    MalformedInsert(String),

    /// Neither the INSERT nor a CREATE TABLE provides column names.
    #[error("Cannot resolve columns for table {table}: no column list and no CREATE TABLE definition")]
    MissingColumns { table: String },
}

/// Error types surfaced by a dump import.
#[derive(Error, Debug)]
pub enum ImportError {
    /// The uploaded file was missing.
    #[error("No dump file was provided")]
    MissingFile,

    /// The dump was empty or whitespace only.
    #[error("The dump file is empty")]
    EmptyDump,

    /// The dump was not valid UTF-8.
    #[error("The dump file is not valid UTF-8 text")]
    InvalidEncoding,

    /// The dump contained no INSERT statements.
    #[error("No INSERT statements found in dump")]
    NoInsertStatements,

    /// A statement could not be parsed or normalized.
    #[error(transparent)]
    Dump(#[from] DumpError),

    /// Writing records or counters failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Reading the dump file failed.
    #[error("Failed to read dump file: {0}")]
    Io(#[from] std::io::Error),
}

impl ImportError {
    /// Returns true for failures the client can fix by changing its input.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ImportError::MissingFile
                | ImportError::EmptyDump
                | ImportError::InvalidEncoding
                | ImportError::NoInsertStatements
                | ImportError::Dump(_)
        )
    }

    /// Returns true if the import ran into data that is already stored.
    pub fn is_duplicate(&self) -> bool {
        matches!(
            self,
            ImportError::Storage(StorageError::DuplicateKey { .. })
        )
    }
}
