//! Compiles a [`FilterConfiguration`] onto a [`QueryBuilder`].
//!
//! Four phases always run in the same order: filters, order, group, limit.
//! Every phase works on the same accumulating query.
//!
//! ```
//! use querysieve::{FilterCompiler, FilterConfiguration, Postgres, SelectQuery, Value};
//! use serde_json::json;
//!
//! let config = FilterConfiguration::normalize(&json!({
//!     "items": 10,
//!     "page": 2,
//!     "filters": {"status": "published"},
//!     "order": [{"by": "created_at", "dir": "desc"}],
//! })).unwrap();
//!
//! let query = SelectQuery::new(Postgres::default(), "posts", Some("post")).unwrap();
//! let query = FilterCompiler::new(query, &config).build().unwrap();
//! let result = query.to_sql().unwrap();
//!
//! assert_eq!(
//!     result.sql,
//!     "SELECT post.* FROM posts post WHERE post.status = $1 \
//!      ORDER BY post.created_at DESC LIMIT 10 OFFSET 10"
//! );
//! assert_eq!(result.params, vec![Value::String("published".into())]);
//! ```

mod handlers;

use std::collections::HashMap;
use std::fmt;

use tracing::{debug, trace};

use crate::config::FilterConfiguration;
use crate::error::{Error, Result};
use crate::field::FieldRef;
use crate::operator::{Operator, OperatorClass, OperatorTable};
use crate::query::{Predicate, QueryBuilder};
use crate::value::{FilterValue, Value};

pub use handlers::{FieldHandler, HandlerRegistry};

/// Drives one query builder through the four build phases.
///
/// A compiler owns its query for one `build()`. Create one compiler per
/// query; nothing is shared between compilations.
pub struct FilterCompiler<'c, Q: QueryBuilder> {
    query: Q,
    config: &'c FilterConfiguration,
    operators: OperatorTable,
    handlers: HandlerRegistry<Q>,
    // parameter name -> field that bound it
    claims: HashMap<String, FieldRef>,
}

impl<'c, Q: QueryBuilder> FilterCompiler<'c, Q> {
    /// Compiler for `query` using the operator table from `config`.
    pub fn new(query: Q, config: &'c FilterConfiguration) -> Self {
        Self {
            query,
            config,
            operators: config.operators().clone(),
            handlers: HandlerRegistry::new(),
            claims: HashMap::new(),
        }
    }

    /// Use `handlers` for per-field filter logic.
    pub fn with_handlers(mut self, handlers: HandlerRegistry<Q>) -> Self {
        self.handlers = handlers;
        self
    }

    /// Replace the operator table.
    ///
    /// Tags are not checked here; an unknown tag fails the build with
    /// [`Error::UnknownOperator`] when its field is compiled.
    pub fn set_operators(&mut self, operators: OperatorTable) -> &mut Self {
        self.operators = operators;
        self
    }

    /// The active operator table.
    pub const fn operators(&self) -> &OperatorTable {
        &self.operators
    }

    /// The configuration being compiled.
    pub const fn config(&self) -> &'c FilterConfiguration {
        self.config
    }

    /// The query built so far.
    pub const fn query(&self) -> &Q {
        &self.query
    }

    /// Run all phases and hand back the query.
    ///
    /// On error the query may already carry clauses from earlier entries
    /// and is dropped with the compiler.
    pub fn build(mut self) -> Result<Q> {
        debug!(
            filters = self.config.filters().len(),
            order = self.config.order().len(),
            items = self.config.items(),
            offset = ?self.config.offset(),
            "compiling filter configuration"
        );
        self.build_filters()?;
        self.build_order()?;
        self.build_group();
        self.build_limit();
        Ok(self.query)
    }

    /// Add one predicate per filter entry, in declared order.
    pub fn build_filters(&mut self) -> Result<()> {
        let config = self.config;
        for (field, value) in config.filters() {
            if config.skip_null_values() && value.is_null() {
                debug!(field = %field, "skipping null filter value");
                continue;
            }
            if let Some(handler) = self.handlers.get(field.as_str()) {
                trace!(field = %field, "custom filter handler");
                handler(&mut self.query, field, value)?;
                continue;
            }
            let op = self.operators.resolve(field.as_str())?;
            trace!(field = %field, op = %op, "compiling filter");
            self.apply(field, op, value)?;
        }
        Ok(())
    }

    /// Add ORDER BY terms, alias-qualified, in declared order.
    pub fn build_order(&mut self) -> Result<()> {
        for entry in self.config.order() {
            let column = entry.by.resolve(self.query.root_alias())?;
            self.query.add_order_by(&column, entry.dir);
        }
        Ok(())
    }

    /// Set GROUP BY exactly as configured.
    pub fn build_group(&mut self) {
        if let Some(group_by) = self.config.group_by() {
            self.query.group_by(group_by.as_str());
        }
    }

    /// Apply offset and limit unless `items` is `0`.
    pub fn build_limit(&mut self) {
        if let Some(offset) = self.config.offset() {
            self.query.set_offset(offset);
            self.query.set_limit(u64::from(self.config.items()));
        }
    }

    /// Generic dispatch for one entry. The value is checked before anything
    /// is added to the query.
    fn apply(&mut self, field: &FieldRef, op: Operator, value: &FilterValue) -> Result<()> {
        let column = field.resolve(self.query.root_alias())?;
        match op.class() {
            OperatorClass::Comparison => {
                let param = field.placeholder();
                self.claim(field, &param)?;
                self.query.bind(&param, value.to_param());
                self.query.and_where(Predicate::compare(column, op, param));
            },
            OperatorClass::NullCheck => {
                let predicate = if op == Operator::IsNull {
                    Predicate::is_null(column)
                } else {
                    Predicate::is_not_null(column)
                };
                self.query.and_where(predicate);
            },
            OperatorClass::Pattern => {
                let text = pattern_text(field, value)?;
                let pattern = self.query.literal(&Value::String(format!("%{text}%")));
                let predicate = if op == Operator::Like {
                    Predicate::like(column, pattern)
                } else {
                    Predicate::not_like(column, pattern)
                };
                self.query.and_where(predicate);
            },
            OperatorClass::Membership => {
                let values = membership_values(field, value)?;
                let predicate = if op == Operator::In {
                    Predicate::in_list(column, values)
                } else {
                    Predicate::not_in_list(column, values)
                };
                self.query.and_where(predicate);
            },
            OperatorClass::Range => {
                let (low, high) = range_bounds(field, value)?;
                let param = field.placeholder();
                let (from, to) = (format!("{param}_from"), format!("{param}_to"));
                self.check_unbound(field, &from)?;
                self.check_unbound(field, &to)?;
                self.claim(field, &from)?;
                self.claim(field, &to)?;
                self.query.bind(&from, low);
                self.query.bind(&to, high);
                self.query.and_where(Predicate::between(column, from, to));
            },
        }
        Ok(())
    }

    /// Reserve parameter `name` for `field`. Two filters sharing a name
    /// would overwrite each other's value, so a second claim is an error.
    fn claim(&mut self, field: &FieldRef, name: &str) -> Result<()> {
        self.check_unbound(field, name)?;
        self.claims.insert(name.to_string(), field.clone());
        Ok(())
    }

    fn check_unbound(&self, field: &FieldRef, name: &str) -> Result<()> {
        if let Some(owner) = self.claims.get(name) {
            return Err(Error::field(
                field.as_str(),
                format!("parameter `{name}` is already bound for filter `{owner}`"),
            ));
        }
        if self.query.is_bound(name) {
            return Err(Error::field(
                field.as_str(),
                format!("parameter `{name}` is already bound on the query"),
            ));
        }
        Ok(())
    }
}

impl<Q: QueryBuilder + fmt::Debug> fmt::Debug for FilterCompiler<'_, Q> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterCompiler")
            .field("query", &self.query)
            .field("operators", &self.operators)
            .field("handlers", &self.handlers)
            .finish_non_exhaustive()
    }
}

/// Compile `config` onto `query` with no custom handlers.
pub fn compile_with<Q: QueryBuilder>(config: &FilterConfiguration, query: Q) -> Result<Q> {
    FilterCompiler::new(query, config).build()
}

fn pattern_text(field: &FieldRef, value: &FilterValue) -> Result<String> {
    match value {
        FilterValue::String(s) => Ok(s.clone()),
        FilterValue::Int(i) => Ok(i.to_string()),
        FilterValue::Float(f) => Ok(f.to_string()),
        FilterValue::Bool(b) => Ok(b.to_string()),
        FilterValue::Null | FilterValue::List(_) | FilterValue::Entity(_) => Err(Error::value(
            field.as_str(),
            "pattern operators need a string, number or boolean",
        )),
    }
}

/// IN-list members; entities become their ids and a lone scalar becomes a
/// one-element list.
fn membership_values(field: &FieldRef, value: &FilterValue) -> Result<Vec<Value>> {
    match value {
        FilterValue::List(items) => items
            .iter()
            .map(|item| match item {
                FilterValue::List(_) => Err(Error::value(
                    field.as_str(),
                    "list members must not be lists",
                )),
                other => Ok(other.to_param()),
            })
            .collect(),
        other => Ok(vec![other.to_param()]),
    }
}

fn range_bounds(field: &FieldRef, value: &FilterValue) -> Result<(Value, Value)> {
    match value {
        FilterValue::List(items) => match items.as_slice() {
            [FilterValue::Null, _] | [_, FilterValue::Null] => Err(Error::value(
                field.as_str(),
                "between bounds must not be null",
            )),
            [low, high] if !is_list(low) && !is_list(high) => Ok((low.to_param(), high.to_param())),
            _ => Err(Error::value(
                field.as_str(),
                "between needs exactly two scalar bounds",
            )),
        },
        _ => Err(Error::value(
            field.as_str(),
            "between needs a two-element list",
        )),
    }
}

const fn is_list(value: &FilterValue) -> bool {
    matches!(value, FilterValue::List(_))
}
