//! Identifier and field-reference validation.

/// Maximum length for SQL identifiers (`PostgreSQL` limit is 63).
const MAX_IDENTIFIER_LENGTH: usize = 63;

/// Qualifier separator between an alias and a column.
pub(crate) const QUALIFIER: char = '.';

/// Validate that a string is a safe SQL identifier.
///
/// A valid SQL identifier:
/// - Starts with a letter (a-z, A-Z) or underscore
/// - Contains only letters, digits (0-9), and underscores
/// - Is not empty and not longer than 63 characters
///
/// # Examples
///
/// ```
/// use querysieve::is_valid_sql_identifier;
///
/// assert!(is_valid_sql_identifier("users"));
/// assert!(is_valid_sql_identifier("_private"));
///
/// assert!(!is_valid_sql_identifier(""));           // empty
/// assert!(!is_valid_sql_identifier("123abc"));     // starts with digit
/// assert!(!is_valid_sql_identifier("user.id"));    // contains dot
/// assert!(!is_valid_sql_identifier("user; DROP")); // contains special chars
/// ```
#[inline]
#[must_use]
pub fn is_valid_sql_identifier(s: &str) -> bool {
    if s.is_empty() || s.len() > MAX_IDENTIFIER_LENGTH {
        return false;
    }

    let mut chars = s.chars();

    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {},
        _ => return false,
    }

    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Validate a field reference: either `column` or `alias.column`.
///
/// Each side of the separator must be a valid SQL identifier; at most one
/// separator is allowed.
///
/// ```
/// use querysieve::is_valid_field_reference;
///
/// assert!(is_valid_field_reference("id"));
/// assert!(is_valid_field_reference("author.id"));
/// assert!(!is_valid_field_reference("a.b.c"));
/// assert!(!is_valid_field_reference(".id"));
/// assert!(!is_valid_field_reference("author."));
/// ```
#[must_use]
pub fn is_valid_field_reference(s: &str) -> bool {
    match s.split_once(QUALIFIER) {
        None => is_valid_sql_identifier(s),
        Some((alias, column)) => {
            is_valid_sql_identifier(alias) && is_valid_sql_identifier(column)
        },
    }
}
