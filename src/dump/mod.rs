//! SQL dump parsing.
//!
//! This module turns the text of a MySQL-style dump into typed entity
//! records:
//! - Statement extraction (`CREATE TABLE` schemas, `INSERT` statements)
//! - Tokenization of `VALUES` clauses into typed scalars
//! - Normalization of rows into catalog entities with column coercions
//!
//! Everything here is pure and synchronous; nothing touches storage.

mod catalog;
mod extract;
mod normalize;
mod tokenize;
mod value;

// Re-export public API
pub use catalog::{Catalog, EntityKind};
pub use extract::{
    extract_create_tables, extract_inserts, extract_schemas, parse_insert, InsertStatement,
    RawStatement, StatementKind, TableSchema,
};
pub use normalize::{coerce_flag, normalize_statement, NormalizedRecord};
pub use tokenize::tokenize_values;
pub use value::{integral_value, parse_number, ParsedValue};
