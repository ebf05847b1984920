//! Statement extraction from raw dump text.
//!
//! Two independent passes over the dump:
//! - a regex pass collecting `CREATE TABLE` column lists
//! - a string-aware scanner slicing out every `INSERT INTO ... ;` statement
//!
//! Statements borrow from the dump buffer; nothing is copied until a header
//! is parsed.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::error_handling::DumpError;

const CREATE_TABLE_PATTERN: &str =
    r"(?is)CREATE\s+TABLE\s+(?:IF\s+NOT\s+EXISTS\s+)?`?(\w+)`?\s*\(([^;]*?)\)\s*ENGINE\s*=";
const COLUMN_LINE_PATTERN: &str = r"^\s*`([^`]+)`";
const INSERT_START_PATTERN: &str = r"(?i)\binsert\s+into\b";
const INSERT_HEADER_PATTERN: &str = r"(?is)^\s*insert\s+into\s+(?:`?\w+`?\.)?`?([\w$]+)`?\s*(?:\(([^)]*)\))?\s*values\s*(.*)$";

/// Helper function to safely compile a regex pattern, panicking with a detailed error message
/// if compilation fails. Used for static regex patterns that are compile-time constants.
fn compile_regex_unsafe(pattern: &str, context: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| {
        panic!(
            "Failed to compile regex pattern '{}' in {}: {}. This is a programming error.",
            pattern, context, e
        )
    })
}

static CREATE_TABLE_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_regex_unsafe(CREATE_TABLE_PATTERN, "CREATE_TABLE_RE"));
static COLUMN_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_regex_unsafe(COLUMN_LINE_PATTERN, "COLUMN_LINE_RE"));
static INSERT_START_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_regex_unsafe(INSERT_START_PATTERN, "INSERT_START_RE"));
static INSERT_HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_regex_unsafe(INSERT_HEADER_PATTERN, "INSERT_HEADER_RE"));

/// Kind of statement sliced out of a dump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    CreateTable,
    Insert,
}

/// A statement as it appears in the dump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawStatement<'a> {
    pub kind: StatementKind,
    pub text: &'a str,
}

/// Column names of one table, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    /// Lower-cased table name
    pub table: String,
    pub columns: Vec<String>,
}

/// A parsed INSERT header with the untokenized `VALUES` tail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertStatement<'a> {
    /// Lower-cased table name without backticks or database qualifier
    pub table: String,
    /// Explicit column list, if the statement names one
    pub columns: Option<Vec<String>>,
    /// Text after `VALUES`, trailing `;` removed
    pub values: &'a str,
}

/// Returns every `CREATE TABLE ... ENGINE=` block in the dump.
pub fn extract_create_tables(dump: &str) -> Vec<RawStatement<'_>> {
    CREATE_TABLE_RE
        .find_iter(dump)
        .map(|m| RawStatement {
            kind: StatementKind::CreateTable,
            text: m.as_str(),
        })
        .collect()
}

/// Collects the column list of every `CREATE TABLE` in the dump, keyed by
/// lower-cased table name.
///
/// Only body lines that start with a backtick-quoted identifier are columns;
/// key and constraint lines are ignored. A later definition of the same
/// table replaces an earlier one.
pub fn extract_schemas(dump: &str) -> HashMap<String, TableSchema> {
    let mut schemas = HashMap::new();
    for caps in CREATE_TABLE_RE.captures_iter(dump) {
        let (Some(name), Some(body)) = (caps.get(1), caps.get(2)) else {
            continue;
        };
        let table = name.as_str().to_lowercase();
        let columns: Vec<String> = body
            .as_str()
            .lines()
            .filter_map(|line| COLUMN_LINE_RE.captures(line))
            .filter_map(|c| c.get(1).map(|m| m.as_str().to_string()))
            .collect();
        log::debug!("schema for {table}: {} column(s)", columns.len());
        schemas.insert(table.clone(), TableSchema { table, columns });
    }
    schemas
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Code,
    InString,
}

/// Returns the end (exclusive) of the statement starting at `start`.
///
/// Inside a string `''` is an escaped quote and a backslash escapes the
/// character after it, matching the tokenizer. A `;` outside a string ends
/// the statement and is included.
/// An unterminated statement runs to the end of the input.
fn statement_end(bytes: &[u8], start: usize) -> usize {
    let mut state = ScanState::Code;
    let mut i = start;
    while i < bytes.len() {
        let b = bytes[i];
        match state {
            ScanState::Code => match b {
                b'\'' => state = ScanState::InString,
                b';' => return i + 1,
                _ => {}
            },
            ScanState::InString => match b {
                b'\\' => i += 1,
                b'\'' => {
                    if bytes.get(i + 1) == Some(&b'\'') {
                        i += 1;
                    } else {
                        state = ScanState::Code;
                    }
                }
                _ => {}
            },
        }
        i += 1;
    }
    bytes.len()
}

/// Slices every `INSERT INTO` statement out of the dump, in order.
///
/// Semicolons and parentheses inside quoted strings never end a statement.
///
/// # Example
///
/// ```
/// use dump_import::dump::extract_inserts;
///
/// let dump = "INSERT INTO t (a) VALUES ('a;b');\nINSERT INTO t (a) VALUES ('c');";
/// let statements = extract_inserts(dump);
/// assert_eq!(statements.len(), 2);
/// assert_eq!(statements[0].text, "INSERT INTO t (a) VALUES ('a;b');");
/// ```
pub fn extract_inserts(dump: &str) -> Vec<RawStatement<'_>> {
    let bytes = dump.as_bytes();
    let mut statements = Vec::new();
    let mut cursor = 0;

    while let Some(m) = INSERT_START_RE.find_at(dump, cursor) {
        let start = m.start();
        let end = statement_end(bytes, m.end());
        statements.push(RawStatement {
            kind: StatementKind::Insert,
            text: &dump[start..end],
        });
        cursor = end;
    }
    statements
}

/// Splits an INSERT statement into table name, optional column list and
/// `VALUES` tail.
///
/// # Errors
///
/// `DumpError::MalformedInsert` if the header does not read
/// `INSERT INTO name [(col, ...)] VALUES`.
pub fn parse_insert(statement: &str) -> Result<InsertStatement<'_>, DumpError> {
    let caps = INSERT_HEADER_RE
        .captures(statement)
        .ok_or_else(|| DumpError::MalformedInsert(statement_preview(statement)))?;

    let table = caps
        .get(1)
        .map(|m| m.as_str().to_lowercase())
        .ok_or_else(|| DumpError::MalformedInsert(statement_preview(statement)))?;

    let columns = caps.get(2).map(|m| {
        m.as_str()
            .split(',')
            .map(|c| c.trim().trim_matches('`').trim().to_string())
            .filter(|c| !c.is_empty())
            .collect::<Vec<_>>()
    });

    let values = caps
        .get(3)
        .map(|m| m.as_str().trim_end().trim_end_matches(';').trim_end())
        .unwrap_or_default();

    Ok(InsertStatement {
        table,
        columns,
        values,
    })
}

/// First line of a statement, shortened for error messages.
fn statement_preview(statement: &str) -> String {
    const MAX_PREVIEW_CHARS: usize = 80;
    let first_line = statement.trim().lines().next().unwrap_or_default();
    if first_line.chars().count() > MAX_PREVIEW_CHARS {
        let truncated: String = first_line.chars().take(MAX_PREVIEW_CHARS).collect();
        format!("{truncated}...")
    } else {
        first_line.to_string()
    }
}
