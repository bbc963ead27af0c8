//! Comparison operators and the per-field operator table.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::error::{Error, Result};

/// Comparison operators a filter entry can use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "&'static str")]
pub enum Operator {
    /// Equal: `=`
    Eq,
    /// Not equal: `<>`
    Neq,
    /// Less than: `<`
    Lt,
    /// Less than or equal: `<=`
    Lte,
    /// Greater than: `>`
    Gt,
    /// Greater than or equal: `>=`
    Gte,
    /// `IS NULL`, ignores the value
    IsNull,
    /// `IS NOT NULL`, ignores the value
    IsNotNull,
    /// `LIKE '%value%'`
    Like,
    /// `NOT LIKE '%value%'`
    NotLike,
    /// `IN (...)`
    In,
    /// `NOT IN (...)`
    NotIn,
    /// `BETWEEN low AND high`
    Between,
}

/// How an operator is compiled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorClass {
    /// Binary comparison against one bound parameter.
    Comparison,
    /// Unary null check, no parameter.
    NullCheck,
    /// Wildcard pattern embedded as an escaped literal.
    Pattern,
    /// Inline value list.
    Membership,
    /// Two bound parameters.
    Range,
}

impl Operator {
    /// Every operator, in tag-table order.
    pub const ALL: [Self; 13] = [
        Self::Eq,
        Self::Neq,
        Self::Like,
        Self::NotLike,
        Self::Between,
        Self::Gt,
        Self::Gte,
        Self::Lt,
        Self::Lte,
        Self::In,
        Self::NotIn,
        Self::IsNull,
        Self::IsNotNull,
    ];

    /// Parse an operator tag (`eq`, `notLike`, `isNull`, ...).
    ///
    /// The legacy spelling `notin` is accepted for `notIn`.
    ///
    /// ```
    /// use querysieve::Operator;
    ///
    /// assert_eq!(Operator::from_tag("gte"), Some(Operator::Gte));
    /// assert_eq!(Operator::from_tag("notin"), Some(Operator::NotIn));
    /// assert_eq!(Operator::from_tag("regex"), None);
    /// ```
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "eq" => Some(Self::Eq),
            "neq" => Some(Self::Neq),
            "lt" => Some(Self::Lt),
            "lte" => Some(Self::Lte),
            "gt" => Some(Self::Gt),
            "gte" => Some(Self::Gte),
            "isNull" => Some(Self::IsNull),
            "isNotNull" => Some(Self::IsNotNull),
            "like" => Some(Self::Like),
            "notLike" => Some(Self::NotLike),
            "in" => Some(Self::In),
            "notIn" | "notin" => Some(Self::NotIn),
            "between" => Some(Self::Between),
            _ => None,
        }
    }

    /// Canonical tag.
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Neq => "neq",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::IsNull => "isNull",
            Self::IsNotNull => "isNotNull",
            Self::Like => "like",
            Self::NotLike => "notLike",
            Self::In => "in",
            Self::NotIn => "notIn",
            Self::Between => "between",
        }
    }

    /// Compilation class of the operator.
    pub const fn class(self) -> OperatorClass {
        match self {
            Self::Eq | Self::Neq | Self::Lt | Self::Lte | Self::Gt | Self::Gte => {
                OperatorClass::Comparison
            },
            Self::IsNull | Self::IsNotNull => OperatorClass::NullCheck,
            Self::Like | Self::NotLike => OperatorClass::Pattern,
            Self::In | Self::NotIn => OperatorClass::Membership,
            Self::Between => OperatorClass::Range,
        }
    }

    /// SQL spelling of the operator.
    pub const fn sql(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Neq => "<>",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::IsNull => "IS NULL",
            Self::IsNotNull => "IS NOT NULL",
            Self::Like => "LIKE",
            Self::NotLike => "NOT LIKE",
            Self::In => "IN",
            Self::NotIn => "NOT IN",
            Self::Between => "BETWEEN",
        }
    }
}

impl From<Operator> for &'static str {
    fn from(op: Operator) -> Self {
        op.tag()
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Field name to operator tag mapping; unmapped fields use `eq`.
///
/// Tags are stored as written. The configuration normalizer only lets known
/// tags in, but [`OperatorTable::insert_tag`] and
/// `FilterCompiler::set_operators` do not check, so an unknown tag is
/// reported by [`OperatorTable::resolve`] when the field is compiled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct OperatorTable {
    entries: BTreeMap<String, String>,
}

impl OperatorTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Map `field` to `op`.
    pub fn insert(&mut self, field: impl Into<String>, op: Operator) {
        self.entries.insert(field.into(), op.tag().to_string());
    }

    /// Map `field` to a raw tag without checking it.
    pub fn insert_tag(&mut self, field: impl Into<String>, tag: impl Into<String>) {
        self.entries.insert(field.into(), tag.into());
    }

    /// The raw tag mapped to `field`, if any.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.entries.get(field).map(String::as_str)
    }

    /// Resolve the operator for `field`, defaulting to [`Operator::Eq`].
    pub fn resolve(&self, field: &str) -> Result<Operator> {
        match self.get(field) {
            None => Ok(Operator::Eq),
            Some(tag) => Operator::from_tag(tag).ok_or_else(|| Error::UnknownOperator {
                field: field.to_string(),
                tag: tag.to_string(),
            }),
        }
    }

    /// Iterate `(field, tag)` pairs in field order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of mapped fields.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no field is mapped.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for OperatorTable
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
