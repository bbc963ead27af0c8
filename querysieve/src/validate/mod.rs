//! Injection guards for names and expressions that end up verbatim in SQL.
//!
//! Filter values are always bound or escaped, but field names, aliases, join
//! targets and join conditions are spliced into the query text. Everything
//! of that kind passes through here first.
//!
//! # Example
//!
//! ```
//! use querysieve::{is_valid_field_reference, is_valid_sql_expression, is_valid_sql_identifier};
//!
//! assert!(is_valid_sql_identifier("created_at"));
//! assert!(is_valid_field_reference("author.name"));
//! assert!(!is_valid_field_reference("name; DROP TABLE posts"));
//! assert!(is_valid_sql_expression("c.post_id = p.id"));
//! ```

mod column;
mod expression;

pub(crate) use column::QUALIFIER;
pub use column::{is_valid_field_reference, is_valid_sql_identifier};
pub use expression::is_valid_sql_expression;
