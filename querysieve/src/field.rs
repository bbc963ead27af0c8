//! Field references and alias resolution.
//!
//! A field reference is either bare (`created_at`), in which case it is
//! qualified with the query's root alias at compile time, or already
//! qualified (`author.name`) and used as written.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::validate::{QUALIFIER, is_valid_field_reference};

/// A validated `column` or `alias.column` reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct FieldRef(String);

impl FieldRef {
    /// Parse and validate a field reference.
    ///
    /// ```
    /// use querysieve::FieldRef;
    ///
    /// assert!(FieldRef::parse("created_at").is_ok());
    /// assert!(FieldRef::parse("p.created_at").is_ok());
    /// assert!(FieldRef::parse("created_at; --").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(Error::field(s, "field name cannot be empty"));
        }
        if !is_valid_field_reference(s) {
            return Err(Error::field(
                s,
                "expected `column` or `alias.column` made of ASCII letters, digits and underscores",
            ));
        }
        Ok(Self(s.to_string()))
    }

    /// The reference as written.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the reference already names an alias.
    pub fn is_qualified(&self) -> bool {
        self.0.contains(QUALIFIER)
    }

    /// The alias part of a qualified reference.
    pub fn qualifier(&self) -> Option<&str> {
        self.0.split_once(QUALIFIER).map(|(alias, _)| alias)
    }

    /// The column part.
    pub fn column(&self) -> &str {
        self.0
            .split_once(QUALIFIER)
            .map_or(self.0.as_str(), |(_, column)| column)
    }

    /// Qualify with `root_alias` unless already qualified.
    ///
    /// ```
    /// use querysieve::FieldRef;
    ///
    /// let bare = FieldRef::parse("id").unwrap();
    /// assert_eq!(bare.resolve(Some("post")).unwrap(), "post.id");
    ///
    /// let qualified = FieldRef::parse("other.field").unwrap();
    /// assert_eq!(qualified.resolve(Some("post")).unwrap(), "other.field");
    /// assert_eq!(qualified.resolve(None).unwrap(), "other.field");
    /// ```
    pub fn resolve(&self, root_alias: Option<&str>) -> Result<String> {
        resolve_alias(&self.0, root_alias)
    }

    /// Parameter name for this field: separators become underscores.
    ///
    /// ```
    /// use querysieve::FieldRef;
    ///
    /// assert_eq!(FieldRef::parse("other.field").unwrap().placeholder(), "other_field");
    /// assert_eq!(FieldRef::parse("id").unwrap().placeholder(), "id");
    /// ```
    pub fn placeholder(&self) -> String {
        self.0.replace(QUALIFIER, "_")
    }

    /// Key under which a custom handler for this field is registered.
    pub fn handler_key(&self) -> String {
        handler_key(&self.0)
    }
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for FieldRef {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for FieldRef {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for FieldRef {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for FieldRef {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

/// Qualify `field` with `root_alias` unless it already contains a separator.
///
/// Fails with [`Error::MissingRootAlias`] only when qualification is needed
/// and there is no alias to use.
pub fn resolve_alias(field: &str, root_alias: Option<&str>) -> Result<String> {
    if field.contains(QUALIFIER) {
        return Ok(field.to_string());
    }
    match root_alias {
        Some(alias) if !alias.is_empty() => Ok(format!("{alias}{QUALIFIER}{field}")),
        _ => Err(Error::MissingRootAlias),
    }
}

/// Derive a handler key: split on anything that is not ASCII alphanumeric and
/// capitalize the first letter of every piece.
///
/// `created_at`, `createdAt` and `created-at` all yield `CreatedAt`.
///
/// ```
/// use querysieve::handler_key;
///
/// assert_eq!(handler_key("created_at"), "CreatedAt");
/// assert_eq!(handler_key("createdAt"), "CreatedAt");
/// assert_eq!(handler_key("author.name"), "AuthorName");
/// ```
pub fn handler_key(field: &str) -> String {
    field
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            let mut chars = segment.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_ascii_uppercase().to_string() + chars.as_str()
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rejects_bad_references() {
        assert!(matches!(
            FieldRef::parse(""),
            Err(Error::InvalidFilterField { .. })
        ));
        assert!(FieldRef::parse("a.b.c").is_err());
        assert!(FieldRef::parse("1abc").is_err());
        assert!(FieldRef::parse("name'--").is_err());
    }

    #[test]
    fn test_parts() {
        let bare = FieldRef::parse("title").unwrap();
        assert!(!bare.is_qualified());
        assert_eq!(bare.qualifier(), None);
        assert_eq!(bare.column(), "title");

        let qualified = FieldRef::parse("a.title").unwrap();
        assert!(qualified.is_qualified());
        assert_eq!(qualified.qualifier(), Some("a"));
        assert_eq!(qualified.column(), "title");
    }

    #[test]
    fn test_resolve_needs_alias_only_for_bare_fields() {
        let bare = FieldRef::parse("title").unwrap();
        assert_eq!(bare.resolve(None), Err(Error::MissingRootAlias));
        assert_eq!(bare.resolve(Some("")), Err(Error::MissingRootAlias));
        assert_eq!(bare.resolve(Some("p")).unwrap(), "p.title");
    }

    #[test]
    fn test_placeholder() {
        assert_eq!(FieldRef::parse("a.b").unwrap().placeholder(), "a_b");
        assert_eq!(FieldRef::parse("deletedAt").unwrap().placeholder(), "deletedAt");
    }

    #[test]
    fn test_handler_key_variants_collide() {
        assert_eq!(handler_key("created_at"), handler_key("createdAt"));
        assert_eq!(handler_key("created-at"), "CreatedAt");
        assert_eq!(handler_key("id"), "Id");
        assert_eq!(handler_key("__x__"), "X");
        assert_eq!(handler_key(""), "");
    }

    #[test]
    fn test_from_str() {
        let field: FieldRef = "p.id".parse().unwrap();
        assert_eq!(field.to_string(), "p.id");
        assert!(FieldRef::try_from(String::from("bad field")).is_err());
    }
}
