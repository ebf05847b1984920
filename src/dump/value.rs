//! Scalar values read from a `VALUES` clause.

use serde_json::{Number, Value};

/// One scalar token of an inserted row.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedValue {
    Str(String),
    Number(Number),
    Bool(bool),
    Null,
}

impl ParsedValue {
    /// Coerces an unquoted token.
    ///
    /// Empty text, `NULL` and `\N` become null, `TRUE`/`FALSE` become
    /// booleans, text that parses completely as a finite number becomes a
    /// number, and anything else is kept as trimmed text.
    pub fn from_unquoted(raw: &str) -> Self {
        let token = raw.trim();
        if token.is_empty() || token.eq_ignore_ascii_case("null") || token == "\\N" {
            return ParsedValue::Null;
        }
        if token.eq_ignore_ascii_case("true") {
            return ParsedValue::Bool(true);
        }
        if token.eq_ignore_ascii_case("false") {
            return ParsedValue::Bool(false);
        }
        match parse_number(token) {
            Some(n) => ParsedValue::Number(n),
            None => ParsedValue::Str(token.to_string()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ParsedValue::Null)
    }
}

/// Parses text as an integer, falling back to a finite float.
pub fn parse_number(text: &str) -> Option<Number> {
    if let Ok(i) = text.parse::<i64>() {
        return Some(Number::from(i));
    }
    // f64 parsing accepts "inf" and "NaN"; neither is a number here
    text.parse::<f64>().ok().and_then(Number::from_f64)
}

/// Returns the integer a number represents, accepting integral floats.
pub fn integral_value(n: &Number) -> Option<i64> {
    n.as_i64().or_else(|| {
        n.as_f64()
            .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
            .map(|f| f as i64)
    })
}

impl From<ParsedValue> for Value {
    fn from(value: ParsedValue) -> Self {
        match value {
            ParsedValue::Str(s) => Value::String(s),
            ParsedValue::Number(n) => Value::Number(n),
            ParsedValue::Bool(b) => Value::Bool(b),
            ParsedValue::Null => Value::Null,
        }
    }
}
