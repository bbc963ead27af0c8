// =============================================================================
// CRATE-LEVEL QUALITY LINTS (following Tokio/Serde standards)
// =============================================================================
#![forbid(unsafe_code)]
#![deny(unused_must_use)]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![warn(rust_2018_idioms)]
#![warn(unreachable_pub)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::broken_intra_doc_links)]
// =============================================================================
// CLIPPY CONFIGURATION
// =============================================================================
#![allow(clippy::doc_markdown)] // Code items in docs - extensive doc changes needed
#![allow(clippy::missing_errors_doc)] // # Errors sections - doc-heavy
#![allow(clippy::missing_panics_doc)] // # Panics sections - doc-heavy
#![allow(clippy::module_name_repetitions)] // Type names matching module - acceptable
#![allow(clippy::return_self_not_must_use)] // Builder pattern methods return Self
#![allow(clippy::must_use_candidate)] // Builder methods - fluent API doesn't need must_use
#![allow(clippy::match_same_arms)] // Kept apart where each arm documents a case
#![allow(clippy::format_push_string)] // String building style preference
#![allow(clippy::double_must_use)] // Functions returning must_use types can have their own docs

//! # querysieve - Declarative filters compiled onto query builders
//!
//! Turns a flat option map (page size, page, sort order, field filters,
//! per-field operators, grouping) into clauses on a query builder:
//! WHERE predicates with bound parameters, ORDER BY, GROUP BY, LIMIT and
//! OFFSET.
//!
//! ## Quick Start
//!
//! ```
//! # use querysieve::prelude::*;
//! use serde_json::json;
//!
//! let query = postgres("posts", "post").unwrap();
//! let query = compile(&json!({
//!     "items": 20,
//!     "page": 3,
//!     "filters": {"status": ["draft", "review"], "author.id": 7},
//!     "operators": {"status": "in"},
//!     "order": [{"by": "created_at", "dir": "desc"}],
//! }), query).unwrap();
//!
//! let result = query.to_sql().unwrap();
//! assert_eq!(
//!     result.sql,
//!     "SELECT post.* FROM posts post \
//!      WHERE post.status IN ('draft', 'review') AND author.id = $1 \
//!      ORDER BY post.created_at DESC LIMIT 20 OFFSET 40"
//! );
//! assert_eq!(result.params, vec![Value::Int(7)]);
//! ```
//!
//! ## `SQLite` Dialect
//!
//! Use `sqlite()` for `SQLite` syntax (?1, ?2 instead of $1, $2):
//!
//! ```
//! # use querysieve::prelude::*;
//! # use serde_json::json;
//! let query = compile(&json!({"filters": {"active": true}}), sqlite("users", "u").unwrap()).unwrap();
//! assert!(query.to_sql().unwrap().sql.contains("u.active = ?1"));
//! ```
//!
//! ## Supported Operators
//!
//! | Tag | SQL | Value |
//! |-----|-----|-------|
//! | `eq` (default) | `=` | bound parameter |
//! | `neq` | `<>` | bound parameter |
//! | `lt` / `lte` / `gt` / `gte` | `<` / `<=` / `>` / `>=` | bound parameter |
//! | `isNull` / `isNotNull` | `IS NULL` / `IS NOT NULL` | ignored |
//! | `like` / `notLike` | `LIKE '%v%'` / `NOT LIKE '%v%'` | escaped literal |
//! | `in` / `notIn` | `IN (..)` / `NOT IN (..)` | escaped literals, entities become ids |
//! | `between` | `BETWEEN :f_from AND :f_to` | two-element list, no nulls |
//!
//! `like` values have their quotes escaped, but wildcards in the value are
//! not escaped: `%` and `_` inside it still match any text.
//!
//! ## Field Names
//!
//! Bare fields (`created_at`) are qualified with the query's root alias.
//! Qualified fields (`author.name`) are used as written. Parameter names
//! replace the dot with an underscore (`author_name`). Two filters that
//! would share a parameter name (`author.name` and `author_name`) fail with
//! [`Error::InvalidFilterField`].
//!
//! ## Custom Field Logic
//!
//! Register a [`HandlerRegistry`] entry to replace the generic operator
//! dispatch for a field, typically to join a related table with
//! [`QueryBuilder::ensure_join`].

mod compiler;
mod config;
mod dialect;
mod error;
mod field;
mod operator;
mod query;
mod repository;
mod validate;
mod value;

pub use compiler::{FieldHandler, FilterCompiler, HandlerRegistry, compile_with};
pub use config::{
    ConfigurationBuilder, DEFAULT_ITEMS, DEFAULT_PAGE, FilterConfiguration, OrderBy, SortDir,
};
pub use dialect::{Dialect, Postgres, Sqlite};
pub use error::{Error, Result};
pub use field::{FieldRef, handler_key, resolve_alias};
pub use operator::{Operator, OperatorClass, OperatorTable};
pub use query::{Join, JoinKind, Predicate, QueryBuilder, QueryResult, SelectQuery};
pub use repository::{EntitySource, EntityTable, compile, short_name, tableize};
pub use validate::{is_valid_field_reference, is_valid_sql_expression, is_valid_sql_identifier};
pub use value::{EntityRef, FilterValue, Identifiable, JsonEntity, Value};

/// Start a Postgres query over `table` aliased as `alias`.
pub fn postgres(table: &str, alias: &str) -> Result<SelectQuery<Postgres>> {
    SelectQuery::new(Postgres, table, Some(alias))
}

/// Start a `SQLite` query over `table` aliased as `alias`.
pub fn sqlite(table: &str, alias: &str) -> Result<SelectQuery<Sqlite>> {
    SelectQuery::new(Sqlite, table, Some(alias))
}

/// Prelude module for convenient imports.
///
/// ```
/// use querysieve::prelude::*;
/// let config = FilterConfiguration::builder().items(5).build().unwrap();
/// let query = FilterCompiler::new(postgres("users", "u").unwrap(), &config).build().unwrap();
/// assert_eq!(query.to_sql().unwrap().sql, "SELECT u.* FROM users u LIMIT 5 OFFSET 0");
/// ```
pub mod prelude {
    pub use crate::{
        Dialect, EntityRef, EntitySource, EntityTable, Error, FieldRef, FilterCompiler,
        FilterConfiguration, FilterValue, HandlerRegistry, Identifiable, Join, JoinKind, Operator,
        OperatorTable, Postgres, Predicate, QueryBuilder, QueryResult, SelectQuery, SortDir,
        Sqlite, Value, compile, postgres, sqlite,
    };
}


// ============================================================================
// API Contract Tests (compile-time assertions)
// ============================================================================

#[cfg(test)]
mod api_contracts {
    use static_assertions::assert_impl_all;

    // ========================================================================
    // Configuration types
    // ========================================================================

    // FilterConfiguration is Clone, Debug, PartialEq, Send, Sync
    assert_impl_all!(crate::FilterConfiguration: Clone, std::fmt::Debug, PartialEq, Send, Sync);

    // OrderBy is Clone, Debug, PartialEq, Eq
    assert_impl_all!(crate::OrderBy: Clone, std::fmt::Debug, PartialEq, Eq);

    // OperatorTable is Clone, Debug, PartialEq, Eq, Default
    assert_impl_all!(crate::OperatorTable: Clone, std::fmt::Debug, PartialEq, Eq, Default);

    // ========================================================================
    // Value types
    // ========================================================================

    // Value is Clone, Debug, PartialEq (no Eq because of Float)
    assert_impl_all!(crate::Value: Clone, std::fmt::Debug, PartialEq);

    // FilterValue is Clone, Debug, PartialEq, Send, Sync
    assert_impl_all!(crate::FilterValue: Clone, std::fmt::Debug, PartialEq, Send, Sync);

    // EntityRef is Clone, Debug, PartialEq, Send, Sync
    assert_impl_all!(crate::EntityRef: Clone, std::fmt::Debug, PartialEq, Send, Sync);

    // FieldRef is Clone, Debug, Eq, Ord, Hash
    assert_impl_all!(crate::FieldRef: Clone, std::fmt::Debug, Eq, Ord, std::hash::Hash);

    // ========================================================================
    // Query types
    // ========================================================================

    // QueryResult is Clone, Debug, PartialEq
    assert_impl_all!(crate::QueryResult: Clone, std::fmt::Debug, PartialEq);

    // Predicate is Clone, Debug, PartialEq
    assert_impl_all!(crate::Predicate: Clone, std::fmt::Debug, PartialEq);

    // Join is Clone, Debug, PartialEq, Eq
    assert_impl_all!(crate::Join: Clone, std::fmt::Debug, PartialEq, Eq);

    // SelectQuery is Clone, Debug, Send, Sync
    assert_impl_all!(crate::SelectQuery<crate::Postgres>: Clone, std::fmt::Debug, Send, Sync);

    // HandlerRegistry is Send, Sync, Default
    assert_impl_all!(crate::HandlerRegistry<crate::SelectQuery<crate::Sqlite>>: Send, Sync, Default);

    // ========================================================================
    // Enum types
    // ========================================================================

    // Operator is Copy, Clone, Debug, PartialEq, Eq, Hash
    assert_impl_all!(crate::Operator: Copy, Clone, std::fmt::Debug, PartialEq, Eq, std::hash::Hash);

    // SortDir is Copy, Clone, Debug, PartialEq, Eq, Default
    assert_impl_all!(crate::SortDir: Copy, Clone, std::fmt::Debug, PartialEq, Eq, Default);

    // JoinKind is Copy, Clone, Debug, PartialEq, Eq
    assert_impl_all!(crate::JoinKind: Copy, Clone, std::fmt::Debug, PartialEq, Eq);

    // ========================================================================
    // Error types
    // ========================================================================

    // Error is Clone, Debug, PartialEq, Eq, Send, Sync, std::error::Error
    assert_impl_all!(crate::Error: Clone, std::fmt::Debug, PartialEq, Eq, Send, Sync, std::error::Error);
}
