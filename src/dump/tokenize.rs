//! Tokenizer for the `VALUES (...), (...)` tail of an INSERT statement.
//!
//! The tokenizer is a three-state machine:
//! - `OutsideRow`: skipping separators until a `(` opens a row
//! - `InRow`: collecting an unquoted token; `,` ends it, `)` ends the row
//! - `InString`: inside a single-quoted literal, resolving escapes
//!
//! Quoted tokens are always strings. Unquoted tokens go through
//! [`ParsedValue::from_unquoted`].

use std::iter::Peekable;
use std::str::Chars;

use crate::dump::value::ParsedValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenizerState {
    OutsideRow,
    InRow,
    InString,
}

struct Tokenizer {
    state: TokenizerState,
    rows: Vec<Vec<ParsedValue>>,
    row: Vec<ParsedValue>,
    token: String,
    /// The current token contains a quoted literal
    quoted: bool,
}

impl Tokenizer {
    fn new() -> Self {
        Tokenizer {
            state: TokenizerState::OutsideRow,
            rows: Vec::new(),
            row: Vec::new(),
            token: String::new(),
            quoted: false,
        }
    }

    fn finish_token(&mut self) {
        let token = std::mem::take(&mut self.token);
        let value = if self.quoted {
            ParsedValue::Str(token)
        } else {
            ParsedValue::from_unquoted(&token)
        };
        self.row.push(value);
        self.quoted = false;
    }

    fn finish_row(&mut self) {
        self.finish_token();
        self.rows.push(std::mem::take(&mut self.row));
        self.state = TokenizerState::OutsideRow;
    }

    fn step(&mut self, c: char, rest: &mut Peekable<Chars<'_>>) {
        match self.state {
            TokenizerState::OutsideRow => {
                if c == '(' {
                    self.row.clear();
                    self.token.clear();
                    self.quoted = false;
                    self.state = TokenizerState::InRow;
                }
            }
            TokenizerState::InRow => match c {
                '\'' => {
                    // Drop unquoted prefixes such as whitespace or `_binary`
                    if !self.quoted {
                        self.token.clear();
                    }
                    self.quoted = true;
                    self.state = TokenizerState::InString;
                }
                ',' => self.finish_token(),
                ')' => self.finish_row(),
                _ => {
                    // Unquoted text after a closing quote is not part of the literal
                    if !self.quoted {
                        self.token.push(c);
                    }
                }
            },
            TokenizerState::InString => match c {
                '\\' => {
                    if let Some(escaped) = rest.next() {
                        self.token.push(unescape(escaped));
                    }
                }
                '\'' => {
                    if rest.peek() == Some(&'\'') {
                        rest.next();
                        self.token.push('\'');
                    } else {
                        self.state = TokenizerState::InRow;
                    }
                }
                _ => self.token.push(c),
            },
        }
    }
}

/// Maps the character after a backslash to the character it stands for.
fn unescape(c: char) -> char {
    match c {
        'n' => '\n',
        'r' => '\r',
        't' => '\t',
        '0' => '\0',
        // \', \", \\ and any unknown escape stand for the character itself
        other => other,
    }
}

/// Splits a `VALUES` tail into rows of typed scalar tokens.
///
/// `input` is the text after the `VALUES` keyword. A row left open at the
/// end of input is discarded.
///
/// # Example
///
/// ```
/// use dump_import::dump::{tokenize_values, ParsedValue};
///
/// let rows = tokenize_values("(1, 'it''s', NULL), (2, 'b', TRUE)");
/// assert_eq!(rows.len(), 2);
/// assert_eq!(rows[0][1], ParsedValue::Str("it's".into()));
/// assert_eq!(rows[1][2], ParsedValue::Bool(true));
/// ```
pub fn tokenize_values(input: &str) -> Vec<Vec<ParsedValue>> {
    let mut tokenizer = Tokenizer::new();
    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        tokenizer.step(c, &mut chars);
    }

    if tokenizer.state != TokenizerState::OutsideRow {
        log::debug!("discarding unterminated row at end of VALUES clause");
    }
    tokenizer.rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Number;

    fn single(input: &str) -> ParsedValue {
        let rows = tokenize_values(&format!("({input})"));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].len(), 1);
        rows[0][0].clone()
    }

    #[test]
    fn test_doubled_quote_escape() {
        assert_eq!(single("'it''s a test'"), ParsedValue::Str("it's a test".into()));
    }

    #[test]
    fn test_backslash_newline_escape() {
        assert_eq!(
            single(r"'line1\nline2'"),
            ParsedValue::Str("line1\nline2".into())
        );
    }

    #[test]
    fn test_escape_table() {
        assert_eq!(
            single(r#"'a\tb\rc\0d\'e\"f\\g'"#),
            ParsedValue::Str("a\tb\rc\0d'e\"f\\g".into())
        );
        // Unknown escapes keep the escaped character
        assert_eq!(single(r"'100\%'"), ParsedValue::Str("100%".into()));
    }

    #[test]
    fn test_unquoted_coercions() {
        let rows = tokenize_values(r"(NULL, \N, , TRUE, FALSE, 42, 2.75, abc)");
        assert_eq!(
            rows[0],
            vec![
                ParsedValue::Null,
                ParsedValue::Null,
                ParsedValue::Null,
                ParsedValue::Bool(true),
                ParsedValue::Bool(false),
                ParsedValue::Number(Number::from(42)),
                ParsedValue::Number(Number::from_f64(2.75).unwrap()),
                ParsedValue::Str("abc".into()),
            ]
        );
    }

    #[test]
    fn test_quoted_tokens_are_never_coerced() {
        let rows = tokenize_values("('42', 'NULL', '', 'true')");
        assert_eq!(
            rows[0],
            vec![
                ParsedValue::Str("42".into()),
                ParsedValue::Str("NULL".into()),
                ParsedValue::Str("".into()),
                ParsedValue::Str("true".into()),
            ]
        );
    }

    #[test]
    fn test_separators_inside_strings() {
        let rows = tokenize_values("(1, 'a, b) (c', 'x;y')");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][1], ParsedValue::Str("a, b) (c".into()));
        assert_eq!(rows[0][2], ParsedValue::Str("x;y".into()));
    }

    #[test]
    fn test_multiple_rows_with_whitespace() {
        let rows = tokenize_values("(1,'a'),\n  (2,'b') ,(3 , 'c')");
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2][0], ParsedValue::Number(Number::from(3)));
        assert_eq!(rows[2][1], ParsedValue::Str("c".into()));
    }

    #[test]
    fn test_binary_prefix_dropped() {
        assert_eq!(single("_binary 'abc'"), ParsedValue::Str("abc".into()));
    }

    #[test]
    fn test_unterminated_row_discarded() {
        let rows = tokenize_values("(1, 'a'), (2, 'b");
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_empty_input() {
        assert!(tokenize_values("").is_empty());
        assert!(tokenize_values("   ").is_empty());
    }
}
