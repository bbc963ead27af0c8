//! Filter values, bound parameters and entity references.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

use crate::error::{Error, Result};

/// A parameter value handed to the query builder (bound or inlined).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Array(Vec<Value>),
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

/// A domain object that can stand in for its identifier.
///
/// Relation filters accept whole entities interchangeably with raw ids:
/// wherever an entity shows up as a filter value, the compiler uses
/// [`id`](Identifiable::id) in its place.
///
/// ```
/// use querysieve::{EntityRef, FilterValue, Identifiable, Value};
///
/// #[derive(Debug)]
/// struct Author {
///     id: i64,
/// }
///
/// impl Identifiable for Author {
///     fn id(&self) -> Value {
///         Value::Int(self.id)
///     }
/// }
///
/// let value = FilterValue::from(EntityRef::new(Author { id: 7 }));
/// assert_eq!(value.to_param(), Value::Int(7));
/// ```
pub trait Identifiable: fmt::Debug + Send + Sync {
    /// The identifier used in place of the entity.
    fn id(&self) -> Value;
}

/// Shared handle to an [`Identifiable`] entity.
#[derive(Clone)]
pub struct EntityRef(Arc<dyn Identifiable>);

impl EntityRef {
    /// Wrap an entity.
    pub fn new(entity: impl Identifiable + 'static) -> Self {
        Self(Arc::new(entity))
    }

    /// The entity's identifier.
    pub fn id(&self) -> Value {
        self.0.id()
    }
}

impl fmt::Debug for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Two references are equal when they identify the same row.
impl PartialEq for EntityRef {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

/// An entity decoded from a JSON object carrying an `id` member.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonEntity {
    id: Value,
    fields: Map<String, JsonValue>,
}

impl JsonEntity {
    /// Entity identified by `id`, carrying the object's members.
    pub fn new(id: impl Into<Value>, fields: Map<String, JsonValue>) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// The members of the object, `id` included.
    pub fn fields(&self) -> &Map<String, JsonValue> {
        &self.fields
    }
}

impl Identifiable for JsonEntity {
    fn id(&self) -> Value {
        self.id.clone()
    }
}

/// The value side of a `field => value` filter entry.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<FilterValue>),
    Entity(EntityRef),
}

impl FilterValue {
    /// Whether this is the null value.
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Whether this is a scalar (not a list, not an entity).
    pub const fn is_scalar(&self) -> bool {
        matches!(
            self,
            Self::Null | Self::Bool(_) | Self::Int(_) | Self::Float(_) | Self::String(_)
        )
    }

    /// Convert to a parameter value, replacing entities by their ids.
    pub fn to_param(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Bool(b) => Value::Bool(*b),
            Self::Int(i) => Value::Int(*i),
            Self::Float(f) => Value::Float(*f),
            Self::String(s) => Value::String(s.clone()),
            Self::List(items) => Value::Array(items.iter().map(Self::to_param).collect()),
            Self::Entity(entity) => entity.id(),
        }
    }

    /// Decode a JSON value found at `path` in the raw options.
    ///
    /// Objects become [`JsonEntity`] references and must carry a scalar `id`.
    pub(crate) fn from_json(path: &str, json: &JsonValue) -> Result<Self> {
        Ok(match json {
            JsonValue::Null => Self::Null,
            JsonValue::Bool(b) => Self::Bool(*b),
            JsonValue::Number(n) => number_to_filter(path, n)?,
            JsonValue::String(s) => Self::String(s.clone()),
            JsonValue::Array(items) => Self::List(
                items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| Self::from_json(&format!("{path}[{i}]"), item))
                    .collect::<Result<_>>()?,
            ),
            JsonValue::Object(fields) => {
                let id = match fields.get("id") {
                    Some(raw @ (JsonValue::Number(_) | JsonValue::String(_))) => {
                        Self::from_json(&format!("{path}.id"), raw)?.to_param()
                    },
                    _ => {
                        return Err(Error::config(
                            path,
                            "object values must carry a scalar `id` member",
                        ));
                    },
                };
                Self::Entity(EntityRef::new(JsonEntity {
                    id,
                    fields: fields.clone(),
                }))
            },
        })
    }
}

fn number_to_filter(path: &str, n: &serde_json::Number) -> Result<FilterValue> {
    if let Some(i) = n.as_i64() {
        Ok(FilterValue::Int(i))
    } else if let Some(f) = n.as_f64() {
        Ok(FilterValue::Float(f))
    } else {
        Err(Error::config(path, format!("number {n} is out of range")))
    }
}

impl From<i64> for FilterValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for FilterValue {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f64> for FilterValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for FilterValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<String> for FilterValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for FilterValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<EntityRef> for FilterValue {
    fn from(v: EntityRef) -> Self {
        Self::Entity(v)
    }
}

impl<T: Into<Self>> From<Vec<T>> for FilterValue {
    fn from(v: Vec<T>) -> Self {
        Self::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Self>> From<Option<T>> for FilterValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug)]
    struct Tag(i64);

    impl Identifiable for Tag {
        fn id(&self) -> Value {
            Value::Int(self.0)
        }
    }

    #[test]
    fn test_entity_to_param_uses_id() {
        let value = FilterValue::from(EntityRef::new(Tag(7)));
        assert_eq!(value.to_param(), Value::Int(7));
        assert!(!value.is_scalar());
    }

    #[test]
    fn test_list_to_param_normalizes_entities() {
        let value = FilterValue::List(vec![EntityRef::new(Tag(7)).into(), 3.into()]);
        assert_eq!(
            value.to_param(),
            Value::Array(vec![Value::Int(7), Value::Int(3)])
        );
    }

    #[test]
    fn test_entity_equality_is_by_id() {
        assert_eq!(EntityRef::new(Tag(1)), EntityRef::new(Tag(1)));
        assert_ne!(EntityRef::new(Tag(1)), EntityRef::new(Tag(2)));
    }

    #[test]
    fn test_from_json_scalars() {
        assert_eq!(
            FilterValue::from_json("f", &json!(null)).unwrap(),
            FilterValue::Null
        );
        assert_eq!(
            FilterValue::from_json("f", &json!(42)).unwrap(),
            FilterValue::Int(42)
        );
        assert_eq!(
            FilterValue::from_json("f", &json!(1.5)).unwrap(),
            FilterValue::Float(1.5)
        );
        assert_eq!(
            FilterValue::from_json("f", &json!("x")).unwrap(),
            FilterValue::String("x".into())
        );
        assert_eq!(
            FilterValue::from_json("f", &json!([1, "a"])).unwrap(),
            FilterValue::List(vec![FilterValue::Int(1), FilterValue::String("a".into())])
        );
    }

    #[test]
    fn test_from_json_object_with_id_is_entity() {
        let value = FilterValue::from_json("author", &json!({"id": 9, "name": "Ada"})).unwrap();
        let FilterValue::Entity(entity) = &value else {
            panic!("expected entity, got {value:?}");
        };
        assert_eq!(entity.id(), Value::Int(9));
    }

    #[test]
    fn test_json_entity_keeps_members() {
        let JsonValue::Object(members) = json!({"id": 3, "slug": "rust"}) else {
            unreachable!();
        };
        let entity = JsonEntity::new(3, members);
        assert_eq!(entity.id(), Value::Int(3));
        assert_eq!(entity.fields().get("slug"), Some(&json!("rust")));
        assert_eq!(
            FilterValue::from(EntityRef::new(entity)).to_param(),
            Value::Int(3)
        );
    }

    #[test]
    fn test_from_json_object_without_id_is_rejected() {
        let err = FilterValue::from_json("filters.author", &json!({"name": "Ada"})).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidConfiguration { ref path, .. } if path == "filters.author"
        ));
    }

    #[test]
    fn test_option_conversion() {
        assert_eq!(FilterValue::from(None::<i64>), FilterValue::Null);
        assert_eq!(FilterValue::from(Some("a")), FilterValue::String("a".into()));
    }

    #[test]
    fn test_value_serializes_untagged() {
        let value = Value::Array(vec![Value::Int(1), Value::Null, Value::String("a".into())]);
        assert_eq!(serde_json::to_string(&value).unwrap(), r#"[1,null,"a"]"#);
    }
}
