//! SQL dialect implementations for Postgres and `SQLite`.
//!
//! Each dialect handles the specific syntax differences between databases:
//! positional parameter style, boolean literals and how an OFFSET without a
//! LIMIT is spelled.

use crate::value::Value;

/// SQL dialect trait for database-specific syntax.
pub trait Dialect: Clone + Copy {
    /// Format a parameter placeholder (e.g., `$1` for Postgres, `?1` for `SQLite`).
    fn param(&self, idx: usize) -> String;

    /// Format a boolean literal.
    fn bool_lit(&self, val: bool) -> &'static str;

    /// LIMIT value meaning "no limit", for dialects that cannot OFFSET alone.
    fn unbounded_limit(&self) -> Option<&'static str>;

    /// Render a value as an escaped SQL literal.
    ///
    /// Strings are single-quoted with embedded quotes doubled. Non-finite
    /// floats are rendered as quoted strings.
    fn literal(&self, value: &Value) -> String {
        match value {
            Value::Null => "NULL".to_string(),
            Value::Bool(b) => self.bool_lit(*b).to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) if f.is_finite() => f.to_string(),
            Value::Float(f) => quote(&f.to_string()),
            Value::String(s) => quote(s),
            Value::Array(items) => {
                let parts: Vec<String> = items.iter().map(|v| self.literal(v)).collect();
                format!("({})", parts.join(", "))
            },
        }
    }
}

fn quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// Postgres dialect.
#[derive(Debug, Clone, Copy, Default)]
#[non_exhaustive]
pub struct Postgres;

impl Dialect for Postgres {
    #[inline]
    fn param(&self, idx: usize) -> String {
        format!("${idx}")
    }

    #[inline]
    fn bool_lit(&self, val: bool) -> &'static str {
        if val { "TRUE" } else { "FALSE" }
    }

    #[inline]
    fn unbounded_limit(&self) -> Option<&'static str> {
        None
    }
}

/// `SQLite` dialect.
#[derive(Debug, Clone, Copy, Default)]
#[non_exhaustive]
pub struct Sqlite;

impl Dialect for Sqlite {
    #[inline]
    fn param(&self, idx: usize) -> String {
        format!("?{idx}")
    }

    #[inline]
    fn bool_lit(&self, val: bool) -> &'static str {
        if val { "1" } else { "0" }
    }

    #[inline]
    fn unbounded_limit(&self) -> Option<&'static str> {
        // SQLite only accepts OFFSET after a LIMIT clause
        Some("-1")
    }
}
