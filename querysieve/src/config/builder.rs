//! Programmatic construction of a [`FilterConfiguration`].

use super::{DEFAULT_ITEMS, DEFAULT_PAGE, FilterConfiguration, OrderBy, SortDir};
use crate::error::{Error, Result};
use crate::field::FieldRef;
use crate::operator::{Operator, OperatorTable};
use crate::value::FilterValue;

/// Builder for configurations assembled in code.
///
/// This is the only way to put live [`EntityRef`](crate::EntityRef) values
/// into a configuration. Validation is the same as for raw options and runs
/// in [`build`](Self::build).
///
/// ```
/// use querysieve::{FilterConfiguration, Operator, SortDir};
///
/// let config = FilterConfiguration::builder()
///     .items(10)
///     .page(2)
///     .filter("status", vec!["draft", "review"])
///     .operator("status", Operator::In)
///     .order("created_at", SortDir::Desc)
///     .build()
///     .unwrap();
///
/// assert_eq!(config.offset(), Some(10));
/// ```
#[derive(Debug, Clone)]
#[must_use = "call .build() to get a FilterConfiguration"]
pub struct ConfigurationBuilder {
    items: u32,
    page: u32,
    order: Vec<(String, SortDir)>,
    group_by: Option<String>,
    filters: Vec<(String, FilterValue)>,
    operators: Vec<(String, Operator)>,
    skip_null_values: bool,
}

impl Default for ConfigurationBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigurationBuilder {
    /// Builder with every option at its default.
    pub const fn new() -> Self {
        Self {
            items: DEFAULT_ITEMS,
            page: DEFAULT_PAGE,
            order: Vec::new(),
            group_by: None,
            filters: Vec::new(),
            operators: Vec::new(),
            skip_null_values: true,
        }
    }

    /// Page size, `0` for unlimited.
    pub const fn items(mut self, items: u32) -> Self {
        self.items = items;
        self
    }

    /// 1-based page index.
    pub const fn page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    /// Append an ORDER BY entry.
    pub fn order(mut self, by: impl Into<String>, dir: SortDir) -> Self {
        self.order.push((by.into(), dir));
        self
    }

    /// GROUP BY field.
    pub fn group_by(mut self, field: impl Into<String>) -> Self {
        self.group_by = Some(field.into());
        self
    }

    /// Set a filter entry. Setting the same field again replaces its value
    /// but keeps its original position.
    pub fn filter(mut self, field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        let field = field.into();
        let value = value.into();
        match self.filters.iter_mut().find(|(name, _)| *name == field) {
            Some((_, slot)) => *slot = value,
            None => self.filters.push((field, value)),
        }
        self
    }

    /// Map a field to an operator.
    pub fn operator(mut self, field: impl Into<String>, op: Operator) -> Self {
        self.operators.push((field.into(), op));
        self
    }

    /// Whether `null` filter values are skipped (default `true`).
    pub const fn skip_null_values(mut self, skip: bool) -> Self {
        self.skip_null_values = skip;
        self
    }

    /// Validate and produce the configuration.
    pub fn build(self) -> Result<FilterConfiguration> {
        if self.page == 0 {
            return Err(Error::config("page", "must be positive"));
        }

        let order = self
            .order
            .into_iter()
            .enumerate()
            .map(|(i, (by, dir))| {
                FieldRef::parse(&by)
                    .map(|by| OrderBy::new(by, dir))
                    .map_err(|e| Error::config(format!("order[{i}].by"), e.to_string()))
            })
            .collect::<Result<_>>()?;

        let group_by = match self.group_by {
            None => None,
            Some(field) if field.is_empty() => None,
            Some(field) => Some(
                FieldRef::parse(&field).map_err(|e| Error::config("group_by", e.to_string()))?,
            ),
        };

        let filters = self
            .filters
            .into_iter()
            .map(|(field, value)| Ok((FieldRef::parse(&field)?, value)))
            .collect::<Result<_>>()?;

        let mut operators = OperatorTable::new();
        for (field, op) in self.operators {
            FieldRef::parse(&field)
                .map_err(|e| Error::config(format!("operators.{field}"), e.to_string()))?;
            operators.insert(field, op);
        }

        Ok(FilterConfiguration {
            items: self.items,
            page: self.page,
            order,
            group_by,
            filters,
            operators,
            skip_null_values: self.skip_null_values,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults_match_normalized_defaults() {
        assert_eq!(
            ConfigurationBuilder::new().build().unwrap(),
            FilterConfiguration::default()
        );
    }

    #[test]
    fn test_page_zero_rejected() {
        assert!(matches!(
            ConfigurationBuilder::new().page(0).build(),
            Err(Error::InvalidConfiguration { ref path, .. }) if path == "page"
        ));
    }

    #[test]
    fn test_refiltering_keeps_position() {
        let config = ConfigurationBuilder::new()
            .filter("a", 1)
            .filter("b", 2)
            .filter("a", 3)
            .build()
            .unwrap();
        assert_eq!(
            config.filters(),
            &[
                (FieldRef::parse("a").unwrap(), FilterValue::Int(3)),
                (FieldRef::parse("b").unwrap(), FilterValue::Int(2)),
            ]
        );
    }

    #[test]
    fn test_invalid_names_rejected() {
        assert!(matches!(
            ConfigurationBuilder::new().filter("bad key", 1).build(),
            Err(Error::InvalidFilterField { .. })
        ));
        assert!(matches!(
            ConfigurationBuilder::new().order("x--", SortDir::Asc).build(),
            Err(Error::InvalidConfiguration { ref path, .. }) if path == "order[0].by"
        ));
        assert!(matches!(
            ConfigurationBuilder::new().group_by("a b").build(),
            Err(Error::InvalidConfiguration { ref path, .. }) if path == "group_by"
        ));
        assert!(matches!(
            ConfigurationBuilder::new().operator("", Operator::Eq).build(),
            Err(Error::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_empty_group_by_is_none() {
        let config = ConfigurationBuilder::new().group_by("").build().unwrap();
        assert!(config.group_by().is_none());
    }
}
