//! Join-condition expression validation.

/// Upper bound on condition length.
const MAX_EXPRESSION_LENGTH: usize = 1000;

/// Keywords and functions that never belong in a join condition.
const DANGEROUS_KEYWORDS: &[&str] = &[
    // DML/DDL statements
    "select",
    "insert",
    "update",
    "delete",
    "drop",
    "truncate",
    "alter",
    "create",
    "grant",
    "revoke",
    "exec",
    "execute",
    "union",
    "into",
    "from",
    "where",
    "having",
    "group",
    "order",
    "limit",
    "offset",
    "fetch",
    "returning",
    // Timing and DoS functions
    "sleep",
    "benchmark",
    "waitfor",
    "pg_sleep",
    "dbms_lock",
    // File operations
    "load_file",
    "into_outfile",
    "into_dumpfile",
    // Encoding functions that could smuggle keywords
    "chr",
    "char",
    "ascii",
    "unicode",
    "hex",
    "unhex",
    "convert",
    "cast",
    "encode",
    "decode",
];

/// Validate a SQL expression used as a join condition.
///
/// Conditions are inserted verbatim after `ON`, so this rejects the usual
/// injection shapes. It is a safety net, not a security boundary: only pass
/// conditions written in code, never ones assembled from request input.
///
/// Rejected:
/// - Comments: `--`, `/*`, `*/`
/// - Statement terminators: `;`
/// - Backticks
/// - Statement keywords (`SELECT`, `UNION`, `DROP`, ...) as whole words
/// - System catalog access (`pg_`, `sqlite_`, `information_schema`)
/// - Hex escapes
///
/// # Examples
///
/// ```
/// use querysieve::is_valid_sql_expression;
///
/// assert!(is_valid_sql_expression("c.post_id = p.id"));
/// assert!(is_valid_sql_expression("t.owner_id = u.id AND t.archived = FALSE"));
///
/// assert!(!is_valid_sql_expression("1; DROP TABLE users"));
/// assert!(!is_valid_sql_expression("c.id = p.id -- comment"));
/// assert!(!is_valid_sql_expression("c.id IN (SELECT id FROM admins)"));
/// ```
#[must_use]
pub fn is_valid_sql_expression(s: &str) -> bool {
    if s.trim().is_empty() || s.len() > MAX_EXPRESSION_LENGTH {
        return false;
    }

    if s.contains("--") || s.contains("/*") || s.contains("*/") {
        return false;
    }

    if s.contains(';') || s.contains('`') {
        return false;
    }

    let lower = s.to_ascii_lowercase();

    if DANGEROUS_KEYWORDS
        .iter()
        .any(|keyword| contains_sql_keyword(&lower, keyword))
    {
        return false;
    }

    if lower.contains("pg_")
        || lower.contains("sqlite_")
        || lower.contains("information_schema")
        || lower.contains("sys.")
    {
        return false;
    }

    if lower.contains("0x") || lower.contains("\\x") {
        return false;
    }

    true
}

/// Check if a string contains a SQL keyword as a whole word.
///
/// Avoids false positives like "update" in "`last_updated`".
fn contains_sql_keyword(haystack: &str, keyword: &str) -> bool {
    let bytes = haystack.as_bytes();
    let kw_bytes = keyword.as_bytes();
    let kw_len = kw_bytes.len();

    if kw_len == 0 || bytes.len() < kw_len {
        return false;
    }

    let is_word_byte = |b: u8| b.is_ascii_alphanumeric() || b == b'_';

    (0..=(bytes.len() - kw_len)).any(|i| {
        if bytes.get(i..i + kw_len) != Some(kw_bytes) {
            return false;
        }
        let before_ok = i == 0 || bytes.get(i - 1).is_some_and(|&b| !is_word_byte(b));
        let after_ok = bytes.get(i + kw_len).is_none_or(|&b| !is_word_byte(b));
        before_ok && after_ok
    })
}
