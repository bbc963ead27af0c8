//! SELECT query that records compiled clauses and renders them as SQL.

use std::collections::HashMap;
use std::fmt::Write as _;

use crate::config::SortDir;
use crate::dialect::Dialect;
use crate::error::{Error, Result};
use crate::validate::{is_valid_field_reference, is_valid_sql_identifier};
use crate::value::Value;

use super::{Join, Predicate, QueryBuilder};

/// Query result with SQL string and positional parameters.
#[derive(Debug, Clone, PartialEq)]
#[must_use = "QueryResult must be used to execute the query"]
pub struct QueryResult {
    /// Rendered SQL with positional placeholders.
    pub sql: String,
    /// Values for the placeholders, in order.
    pub params: Vec<Value>,
}

/// SELECT query over a root table with an optional alias.
///
/// Predicates reference parameters by name; [`to_sql`](Self::to_sql) turns
/// them into the dialect's positional placeholders in order of first use.
///
/// ```
/// use querysieve::{Postgres, Predicate, QueryBuilder, SelectQuery, Value};
///
/// let mut query = SelectQuery::new(Postgres::default(), "posts", Some("post")).unwrap();
/// query.and_where(Predicate::compare("post.id", querysieve::Operator::Eq, "id"));
/// query.bind("id", Value::Int(7));
///
/// let result = query.to_sql().unwrap();
/// assert_eq!(result.sql, "SELECT post.* FROM posts post WHERE post.id = $1");
/// assert_eq!(result.params, vec![Value::Int(7)]);
/// ```
#[derive(Debug, Clone)]
pub struct SelectQuery<D: Dialect> {
    dialect: D,
    table: String,
    alias: Option<String>,
    selects: Vec<String>,
    joins: Vec<Join>,
    predicates: Vec<Predicate>,
    params: Vec<(String, Value)>,
    order: Vec<(String, SortDir)>,
    group_by: Option<String>,
    limit: Option<u64>,
    offset: Option<u64>,
}

impl<D: Dialect> SelectQuery<D> {
    /// Create a query over `table`, selecting `alias.*` when an alias is given.
    ///
    /// An empty alias counts as none.
    pub fn new(dialect: D, table: impl Into<String>, alias: Option<&str>) -> Result<Self> {
        let table = table.into();
        if !is_valid_field_reference(&table) {
            return Err(Error::config("table", format!("invalid table name `{table}`")));
        }
        let alias = alias.filter(|a| !a.is_empty());
        if let Some(alias) = alias
            && !is_valid_sql_identifier(alias)
        {
            return Err(Error::config("alias", format!("invalid alias `{alias}`")));
        }
        Ok(Self {
            dialect,
            table,
            alias: alias.map(str::to_string),
            selects: alias.map(|a| format!("{a}.*")).into_iter().collect(),
            joins: Vec::new(),
            predicates: Vec::new(),
            params: Vec::new(),
            order: Vec::new(),
            group_by: None,
            limit: None,
            offset: None,
        })
    }

    /// Root table.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// SELECT list; `*` is rendered when empty.
    pub fn selects(&self) -> &[String] {
        &self.selects
    }

    /// WHERE predicates in the order they were added.
    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    /// Bound parameters in binding order.
    pub fn parameters(&self) -> &[(String, Value)] {
        &self.params
    }

    /// Value bound to `name`, if any.
    pub fn parameter(&self, name: &str) -> Option<&Value> {
        self.params
            .iter()
            .find(|(bound, _)| bound == name)
            .map(|(_, value)| value)
    }

    /// ORDER BY terms.
    pub fn order_terms(&self) -> &[(String, SortDir)] {
        &self.order
    }

    /// GROUP BY expression.
    pub fn grouping(&self) -> Option<&str> {
        self.group_by.as_deref()
    }

    /// Row limit.
    pub const fn limit(&self) -> Option<u64> {
        self.limit
    }

    /// Row offset.
    pub const fn offset(&self) -> Option<u64> {
        self.offset
    }

    /// Render SQL and positional parameters.
    ///
    /// Fails with [`Error::UnboundParameter`] when a predicate references a
    /// name that was never bound.
    pub fn to_sql(&self) -> Result<QueryResult> {
        let mut sql = String::new();
        let mut slots = Slots::default();

        let select_str = if self.selects.is_empty() {
            "*".to_string()
        } else {
            self.selects.join(", ")
        };
        let _ = write!(sql, "SELECT {select_str} FROM {}", self.table);
        if let Some(alias) = &self.alias {
            let _ = write!(sql, " {alias}");
        }

        for join in &self.joins {
            let _ = write!(sql, " {} {} {}", join.kind, join.table, join.alias);
            if let Some(condition) = &join.condition {
                let _ = write!(sql, " ON {condition}");
            }
        }

        if !self.predicates.is_empty() {
            let conditions = self
                .predicates
                .iter()
                .map(|p| self.render_predicate(p, &mut slots))
                .collect::<Result<Vec<_>>>()?;
            let _ = write!(sql, " WHERE {}", conditions.join(" AND "));
        }

        if let Some(group_by) = &self.group_by {
            let _ = write!(sql, " GROUP BY {group_by}");
        }

        if !self.order.is_empty() {
            let terms: Vec<String> = self
                .order
                .iter()
                .map(|(field, dir)| format!("{field} {}", dir.as_sql()))
                .collect();
            let _ = write!(sql, " ORDER BY {}", terms.join(", "));
        }

        match (self.limit, self.offset, self.dialect.unbounded_limit()) {
            (Some(limit), _, _) => {
                let _ = write!(sql, " LIMIT {limit}");
            },
            (None, Some(_), Some(unbounded)) => {
                let _ = write!(sql, " LIMIT {unbounded}");
            },
            _ => {},
        }
        if let Some(offset) = self.offset {
            let _ = write!(sql, " OFFSET {offset}");
        }

        Ok(QueryResult {
            sql,
            params: slots.values,
        })
    }

    fn render_predicate(&self, predicate: &Predicate, slots: &mut Slots) -> Result<String> {
        Ok(match predicate {
            Predicate::Compare { field, op, param } => {
                let idx = slots.slot(param, &self.params)?;
                format!("{field} {} {}", op.sql(), self.dialect.param(idx))
            },
            Predicate::Null { field, negated } => {
                if *negated {
                    format!("{field} IS NOT NULL")
                } else {
                    format!("{field} IS NULL")
                }
            },
            Predicate::Like {
                field,
                negated,
                pattern,
            } => {
                let not = if *negated { "NOT " } else { "" };
                format!("{field} {not}LIKE {pattern}")
            },
            // Empty lists match nothing / everything
            Predicate::In { negated, values, .. } if values.is_empty() => {
                let always = if *negated { "1=1" } else { "1=0" };
                always.to_string()
            },
            Predicate::In {
                field,
                negated,
                values,
            } => {
                let not = if *negated { "NOT " } else { "" };
                let items: Vec<String> = values.iter().map(|v| self.dialect.literal(v)).collect();
                format!("{field} {not}IN ({})", items.join(", "))
            },
            Predicate::Between { field, low, high } => {
                let low = slots.slot(low, &self.params)?;
                let high = slots.slot(high, &self.params)?;
                format!(
                    "{field} BETWEEN {} AND {}",
                    self.dialect.param(low),
                    self.dialect.param(high)
                )
            },
        })
    }
}

/// Named-to-positional parameter mapping built while rendering.
#[derive(Default)]
struct Slots {
    index: HashMap<String, usize>,
    values: Vec<Value>,
}

impl Slots {
    fn slot(&mut self, name: &str, bound: &[(String, Value)]) -> Result<usize> {
        if let Some(&idx) = self.index.get(name) {
            return Ok(idx);
        }
        let value = bound
            .iter()
            .find(|(bound_name, _)| bound_name == name)
            .map(|(_, value)| value.clone())
            .ok_or_else(|| Error::UnboundParameter {
                name: name.to_string(),
            })?;
        self.values.push(value);
        let idx = self.values.len();
        self.index.insert(name.to_string(), idx);
        Ok(idx)
    }
}

impl<D: Dialect> QueryBuilder for SelectQuery<D> {
    fn root_alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    fn and_where(&mut self, predicate: Predicate) {
        self.predicates.push(predicate);
    }

    fn add_order_by(&mut self, field: &str, dir: SortDir) {
        self.order.push((field.to_string(), dir));
    }

    fn group_by(&mut self, field: &str) {
        self.group_by = Some(field.to_string());
    }

    fn set_offset(&mut self, offset: u64) {
        self.offset = Some(offset);
    }

    fn set_limit(&mut self, limit: u64) {
        self.limit = Some(limit);
    }

    fn bind(&mut self, name: &str, value: Value) {
        match self.params.iter_mut().find(|(bound, _)| bound == name) {
            Some((_, slot)) => *slot = value,
            None => self.params.push((name.to_string(), value)),
        }
    }

    fn is_bound(&self, name: &str) -> bool {
        self.parameter(name).is_some()
    }

    fn literal(&self, value: &Value) -> String {
        self.dialect.literal(value)
    }

    fn joins(&self) -> &[Join] {
        &self.joins
    }

    fn add_join(&mut self, join: Join) {
        self.joins.push(join);
    }

    fn add_select(&mut self, expr: &str) {
        self.selects.push(expr.to_string());
    }
}
