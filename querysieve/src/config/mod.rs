//! Normalized filter configuration.
//!
//! A [`FilterConfiguration`] is built once per request from raw options,
//! validated eagerly, and read-only afterwards.
//!
//! # Raw option shape
//!
//! ```json
//! {
//!   "items": 25,
//!   "page": 1,
//!   "order": [{"by": "created_at", "dir": "desc"}],
//!   "filters": {"status": ["draft", "review"], "author": {"id": 7}},
//!   "operators": {"status": "in"},
//!   "group_by": "post.id",
//!   "skip_null_values": true
//! }
//! ```
//!
//! | Key | Default | Rule |
//! |-----|---------|------|
//! | `items` | `25` | `>= 0`, `0` means unlimited |
//! | `page` | `1` | `>= 1` |
//! | `order` | `[]` | `dir` is `asc`, `desc`, `ASC` or `DESC`, default `asc` |
//! | `filters` | `{}` | keys are field references |
//! | `operators` | `{}` | tags from the fixed operator set |
//! | `group_by` | none | field reference, emitted verbatim |
//! | `skip_null_values` | `true` | skip `null` filter values |

mod builder;
mod normalize;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;

use crate::error::{Error, Result};
use crate::field::FieldRef;
use crate::operator::OperatorTable;
use crate::value::FilterValue;

pub use builder::ConfigurationBuilder;

/// Page size used when `items` is absent.
pub const DEFAULT_ITEMS: u32 = 25;

/// Page used when `page` is absent.
pub const DEFAULT_PAGE: u32 = 1;

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDir {
    /// Ascending (default).
    #[default]
    Asc,
    /// Descending.
    Desc,
}

impl SortDir {
    /// Parse one of the accepted direction tokens: `asc`, `desc`, `ASC`, `DESC`.
    ///
    /// ```
    /// use querysieve::SortDir;
    ///
    /// assert_eq!(SortDir::parse("DESC"), Some(SortDir::Desc));
    /// assert_eq!(SortDir::parse("Desc"), None);
    /// ```
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "asc" | "ASC" => Some(Self::Asc),
            "desc" | "DESC" => Some(Self::Desc),
            _ => None,
        }
    }

    /// SQL keyword.
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// One ORDER BY entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderBy {
    /// Field to sort on, resolved against the root alias at compile time.
    pub by: FieldRef,
    /// Direction.
    pub dir: SortDir,
}

impl OrderBy {
    /// Create an order entry.
    pub const fn new(by: FieldRef, dir: SortDir) -> Self {
        Self { by, dir }
    }
}

/// Validated, defaulted filter options.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterConfiguration {
    items: u32,
    page: u32,
    order: Vec<OrderBy>,
    group_by: Option<FieldRef>,
    filters: Vec<(FieldRef, FilterValue)>,
    operators: OperatorTable,
    skip_null_values: bool,
}

impl Default for FilterConfiguration {
    fn default() -> Self {
        Self {
            items: DEFAULT_ITEMS,
            page: DEFAULT_PAGE,
            order: Vec::new(),
            group_by: None,
            filters: Vec::new(),
            operators: OperatorTable::new(),
            skip_null_values: true,
        }
    }
}

impl FilterConfiguration {
    /// Validate and default a raw option map.
    ///
    /// ```
    /// use querysieve::FilterConfiguration;
    /// use serde_json::json;
    ///
    /// let config = FilterConfiguration::normalize(&json!({
    ///     "items": 10,
    ///     "page": 3,
    ///     "filters": {"status": "published"},
    /// })).unwrap();
    ///
    /// assert_eq!(config.offset(), Some(20));
    /// assert!(config.skip_null_values());
    /// ```
    pub fn normalize(raw: &JsonValue) -> Result<Self> {
        normalize::normalize(raw)
    }

    /// Parse JSON text, then [`normalize`](Self::normalize).
    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: JsonValue = serde_json::from_str(json)
            .map_err(|e| Error::config("$", format!("invalid JSON: {e}")))?;
        Self::normalize(&raw)
    }

    /// Parse a TOML document, then [`normalize`](Self::normalize).
    ///
    /// ```
    /// use querysieve::FilterConfiguration;
    ///
    /// let config = FilterConfiguration::from_toml_str(r#"
    ///     items = 50
    ///     group_by = "post.id"
    ///
    ///     [[order]]
    ///     by = "created_at"
    ///     dir = "desc"
    ///
    ///     [filters]
    ///     status = "published"
    /// "#).unwrap();
    ///
    /// assert_eq!(config.items(), 50);
    /// assert_eq!(config.order().len(), 1);
    /// ```
    pub fn from_toml_str(document: &str) -> Result<Self> {
        let raw: JsonValue = toml::from_str(document)
            .map_err(|e| Error::config("$", format!("invalid TOML: {e}")))?;
        Self::normalize(&raw)
    }

    /// Start a programmatic configuration.
    pub fn builder() -> ConfigurationBuilder {
        ConfigurationBuilder::new()
    }

    /// Page size; `0` means unlimited.
    pub const fn items(&self) -> u32 {
        self.items
    }

    /// 1-based page index.
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Row offset for the current page, `None` when unlimited.
    pub fn offset(&self) -> Option<u64> {
        (self.items > 0).then(|| u64::from(self.items) * u64::from(self.page - 1))
    }

    /// ORDER BY entries in declaration order.
    pub fn order(&self) -> &[OrderBy] {
        &self.order
    }

    /// GROUP BY field, if any.
    pub const fn group_by(&self) -> Option<&FieldRef> {
        self.group_by.as_ref()
    }

    /// Filter entries in declaration order.
    pub fn filters(&self) -> &[(FieldRef, FilterValue)] {
        &self.filters
    }

    /// Value of a single filter entry.
    pub fn filter(&self, field: &str) -> Option<&FilterValue> {
        self.filters
            .iter()
            .find(|(name, _)| name.as_str() == field)
            .map(|(_, value)| value)
    }

    /// Operator table.
    pub const fn operators(&self) -> &OperatorTable {
        &self.operators
    }

    /// Whether `null` filter values are skipped.
    pub const fn skip_null_values(&self) -> bool {
        self.skip_null_values
    }
}

/// Deserializes any self-describing format through the normalizer.
impl<'de> Deserialize<'de> for FilterConfiguration {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = JsonValue::deserialize(deserializer)?;
        Self::normalize(&raw).map_err(serde::de::Error::custom)
    }
}
