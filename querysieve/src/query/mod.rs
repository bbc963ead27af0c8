//! The query-builder seam.
//!
//! The compiler never generates SQL itself: it drives a [`QueryBuilder`],
//! which accumulates clauses and named parameters. [`SelectQuery`] is the
//! in-crate implementation that renders parameterized SQL; adapters for
//! other builders implement the same trait.

mod expr;
mod select;

use std::fmt;

use tracing::debug;

use crate::config::SortDir;
use crate::error::{Error, Result};
use crate::validate::{is_valid_field_reference, is_valid_sql_expression, is_valid_sql_identifier};
use crate::value::Value;

pub use expr::Predicate;
pub use select::{QueryResult, SelectQuery};

/// Join flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JoinKind {
    /// `INNER JOIN`
    Inner,
    /// `LEFT JOIN`
    Left,
}

impl JoinKind {
    /// SQL keyword.
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Inner => "INNER JOIN",
            Self::Left => "LEFT JOIN",
        }
    }
}

impl fmt::Display for JoinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// A joined table (or association path) with its alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Join {
    /// Join flavour.
    pub kind: JoinKind,
    /// Target table, `schema.table`, or association path such as `post.author`.
    pub table: String,
    /// Alias the joined rows are selected as.
    pub alias: String,
    /// Optional `ON` condition.
    pub condition: Option<String>,
}

impl Join {
    /// Inner join without a condition.
    pub fn inner(table: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            kind: JoinKind::Inner,
            table: table.into(),
            alias: alias.into(),
            condition: None,
        }
    }

    /// Left join without a condition.
    pub fn left(table: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            kind: JoinKind::Left,
            table: table.into(),
            alias: alias.into(),
            condition: None,
        }
    }

    /// Attach an `ON` condition.
    pub fn on(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    /// Reject targets, aliases and conditions that are unsafe to splice into SQL.
    pub fn validate(&self) -> Result<()> {
        if !is_valid_field_reference(&self.table) {
            return Err(Error::InvalidJoin {
                reason: format!("invalid join target `{}`", self.table),
            });
        }
        if !is_valid_sql_identifier(&self.alias) {
            return Err(Error::InvalidJoin {
                reason: format!("invalid join alias `{}`", self.alias),
            });
        }
        if let Some(condition) = &self.condition
            && !is_valid_sql_expression(condition)
        {
            return Err(Error::InvalidJoin {
                reason: format!("unsafe join condition `{condition}`"),
            });
        }
        Ok(())
    }
}

/// Operations the compiler needs from a query builder.
///
/// Implementations accumulate state; every `and_where` call adds one more
/// AND-ed predicate. A builder is used by one compilation at a time.
pub trait QueryBuilder {
    /// Alias of the root entity/table, used to qualify bare fields.
    fn root_alias(&self) -> Option<&str>;

    /// AND a predicate onto the WHERE clause.
    fn and_where(&mut self, predicate: Predicate);

    /// Append an ORDER BY term.
    fn add_order_by(&mut self, field: &str, dir: SortDir);

    /// Set the GROUP BY clause.
    fn group_by(&mut self, field: &str);

    /// Set the first row to return.
    fn set_offset(&mut self, offset: u64);

    /// Set the maximum number of rows to return.
    fn set_limit(&mut self, limit: u64);

    /// Bind a named parameter (name without the colon).
    fn bind(&mut self, name: &str, value: Value);

    /// Whether a parameter called `name` has been bound.
    fn is_bound(&self, name: &str) -> bool;

    /// Render `value` as an escaped literal for inlining.
    fn literal(&self, value: &Value) -> String;

    /// Joins already on the query.
    fn joins(&self) -> &[Join];

    /// Add a join unconditionally.
    fn add_join(&mut self, join: Join);

    /// Add an expression to the SELECT list.
    fn add_select(&mut self, expr: &str);

    /// Whether a join on `table` is already present.
    fn is_joined(&self, table: &str) -> bool {
        self.joins().iter().any(|join| join.table == table)
    }

    /// Add `join` (and select `alias.*`) unless `join.table` is already joined.
    ///
    /// Returns whether the join was added. Repeating the call with the same
    /// table is a no-op.
    fn ensure_join(&mut self, join: Join) -> Result<bool> {
        join.validate()?;
        if self.is_joined(&join.table) {
            debug!(table = %join.table, "join already present, skipping");
            return Ok(false);
        }
        self.add_select(&format!("{}.*", join.alias));
        self.add_join(join);
        Ok(true)
    }
}

impl<Q: QueryBuilder + ?Sized> QueryBuilder for &mut Q {
    fn root_alias(&self) -> Option<&str> {
        (**self).root_alias()
    }

    fn and_where(&mut self, predicate: Predicate) {
        (**self).and_where(predicate);
    }

    fn add_order_by(&mut self, field: &str, dir: SortDir) {
        (**self).add_order_by(field, dir);
    }

    fn group_by(&mut self, field: &str) {
        (**self).group_by(field);
    }

    fn set_offset(&mut self, offset: u64) {
        (**self).set_offset(offset);
    }

    fn set_limit(&mut self, limit: u64) {
        (**self).set_limit(limit);
    }

    fn bind(&mut self, name: &str, value: Value) {
        (**self).bind(name, value);
    }

    fn is_bound(&self, name: &str) -> bool {
        (**self).is_bound(name)
    }

    fn literal(&self, value: &Value) -> String {
        (**self).literal(value)
    }

    fn joins(&self) -> &[Join] {
        (**self).joins()
    }

    fn add_join(&mut self, join: Join) {
        (**self).add_join(join);
    }

    fn add_select(&mut self, expr: &str) {
        (**self).add_select(expr);
    }
}
