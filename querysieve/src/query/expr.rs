//! Boolean expressions added to a query's WHERE clause.

use crate::operator::Operator;
use crate::value::Value;

/// A single WHERE predicate. Predicates added to a query are AND-ed.
///
/// Field names are expected to be resolved (alias-qualified) already.
/// Parameter names are stored without the leading colon.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Predicate {
    /// `field <op> :param` for `=`, `<>`, `<`, `<=`, `>`, `>=`.
    Compare {
        /// Resolved field.
        field: String,
        /// Comparison operator.
        op: Operator,
        /// Bound parameter name.
        param: String,
    },
    /// `field IS NULL` / `field IS NOT NULL`.
    Null {
        /// Resolved field.
        field: String,
        /// `true` for `IS NOT NULL`.
        negated: bool,
    },
    /// `field [NOT] LIKE <literal>`.
    Like {
        /// Resolved field.
        field: String,
        /// `true` for `NOT LIKE`.
        negated: bool,
        /// Already-escaped SQL literal, quotes included.
        pattern: String,
    },
    /// `field [NOT] IN (v1, v2, ...)` with values inlined as literals.
    In {
        /// Resolved field.
        field: String,
        /// `true` for `NOT IN`.
        negated: bool,
        /// Inlined values.
        values: Vec<Value>,
    },
    /// `field BETWEEN :low AND :high`.
    Between {
        /// Resolved field.
        field: String,
        /// Lower-bound parameter name.
        low: String,
        /// Upper-bound parameter name.
        high: String,
    },
}

impl Predicate {
    /// Binary comparison against a bound parameter.
    pub fn compare(field: impl Into<String>, op: Operator, param: impl Into<String>) -> Self {
        Self::Compare {
            field: field.into(),
            op,
            param: param.into(),
        }
    }

    /// `field IS NULL`.
    pub fn is_null(field: impl Into<String>) -> Self {
        Self::Null {
            field: field.into(),
            negated: false,
        }
    }

    /// `field IS NOT NULL`.
    pub fn is_not_null(field: impl Into<String>) -> Self {
        Self::Null {
            field: field.into(),
            negated: true,
        }
    }

    /// `field LIKE pattern`, `pattern` being an escaped literal.
    pub fn like(field: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::Like {
            field: field.into(),
            negated: false,
            pattern: pattern.into(),
        }
    }

    /// `field NOT LIKE pattern`, `pattern` being an escaped literal.
    pub fn not_like(field: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::Like {
            field: field.into(),
            negated: true,
            pattern: pattern.into(),
        }
    }

    /// `field IN (values)`.
    pub fn in_list(field: impl Into<String>, values: Vec<Value>) -> Self {
        Self::In {
            field: field.into(),
            negated: false,
            values,
        }
    }

    /// `field NOT IN (values)`.
    pub fn not_in_list(field: impl Into<String>, values: Vec<Value>) -> Self {
        Self::In {
            field: field.into(),
            negated: true,
            values,
        }
    }

    /// `field BETWEEN :low AND :high`.
    pub fn between(
        field: impl Into<String>,
        low: impl Into<String>,
        high: impl Into<String>,
    ) -> Self {
        Self::Between {
            field: field.into(),
            low: low.into(),
            high: high.into(),
        }
    }

    /// The field this predicate tests.
    pub fn field(&self) -> &str {
        match self {
            Self::Compare { field, .. }
            | Self::Null { field, .. }
            | Self::Like { field, .. }
            | Self::In { field, .. }
            | Self::Between { field, .. } => field,
        }
    }

    /// Names of the parameters this predicate references, in order.
    pub fn params(&self) -> Vec<&str> {
        match self {
            Self::Compare { param, .. } => vec![param.as_str()],
            Self::Between { low, high, .. } => vec![low.as_str(), high.as_str()],
            Self::Null { .. } | Self::Like { .. } | Self::In { .. } => Vec::new(),
        }
    }
}
