//! Per-field filter handlers.

use std::collections::HashMap;
use std::fmt;

use crate::error::Result;
use crate::field::{FieldRef, handler_key};
use crate::value::FilterValue;

/// Custom filter logic for one field.
///
/// Receives the query being built, the filter key and its value. Runs in
/// place of the generic operator dispatch and may add joins, predicates and
/// parameters freely.
pub type FieldHandler<Q> = Box<dyn Fn(&mut Q, &FieldRef, &FilterValue) -> Result<()> + Send + Sync>;

/// Field handlers keyed by [`handler_key`].
///
/// Keys are derived from field names, so `author_name`, `authorName` and
/// `author.name` share one slot.
///
/// ```
/// use querysieve::{HandlerRegistry, Join, Postgres, Predicate, QueryBuilder, SelectQuery};
///
/// let handlers = HandlerRegistry::<SelectQuery<Postgres>>::new().with("author_name", |q, _, value| {
///     q.ensure_join(Join::inner("authors", "a").on("a.id = post.author_id"))?;
///     q.bind("author_name", value.to_param());
///     q.and_where(Predicate::compare("a.name", querysieve::Operator::Eq, "author_name"));
///     Ok(())
/// });
///
/// assert!(handlers.contains("authorName"));
/// ```
pub struct HandlerRegistry<Q> {
    handlers: HashMap<String, FieldHandler<Q>>,
}

impl<Q> HandlerRegistry<Q> {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register `handler` for `field`, replacing any previous one.
    pub fn register<F>(&mut self, field: &str, handler: F) -> &mut Self
    where
        F: Fn(&mut Q, &FieldRef, &FilterValue) -> Result<()> + Send + Sync + 'static,
    {
        self.handlers.insert(handler_key(field), Box::new(handler));
        self
    }

    /// Builder form of [`register`](Self::register).
    pub fn with<F>(mut self, field: &str, handler: F) -> Self
    where
        F: Fn(&mut Q, &FieldRef, &FilterValue) -> Result<()> + Send + Sync + 'static,
    {
        self.register(field, handler);
        self
    }

    /// Handler registered for `field`.
    pub fn get(&self, field: &str) -> Option<&FieldHandler<Q>> {
        self.handlers.get(&handler_key(field))
    }

    /// Whether `field` has a handler.
    pub fn contains(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    /// Number of registered handlers.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether no handler is registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl<Q> Default for HandlerRegistry<Q> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Q> fmt::Debug for HandlerRegistry<Q> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        keys.sort_unstable();
        f.debug_struct("HandlerRegistry")
            .field("fields", &keys)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Log = Vec<String>;

    #[test]
    fn test_keys_are_shared_across_spellings() {
        let mut registry = HandlerRegistry::<Log>::new();
        registry.register("created_at", |log, field, _| {
            log.push(field.to_string());
            Ok(())
        });

        assert!(registry.contains("createdAt"));
        assert!(registry.contains("created-at"));
        assert!(!registry.contains("created"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_register_replaces() {
        let registry = HandlerRegistry::<Log>::new()
            .with("status", |log, _, _| {
                log.push("first".into());
                Ok(())
            })
            .with("status", |log, _, _| {
                log.push("second".into());
                Ok(())
            });
        assert_eq!(registry.len(), 1);

        let mut log = Log::new();
        let field = FieldRef::parse("status").unwrap();
        (registry.get("status").unwrap())(&mut log, &field, &FilterValue::Null).unwrap();
        assert_eq!(log, ["second"]);
    }

    #[test]
    fn test_debug_lists_keys() {
        let registry = HandlerRegistry::<Log>::new()
            .with("b_field", |_, _, _| Ok(()))
            .with("a", |_, _, _| Ok(()));
        assert_eq!(
            format!("{registry:?}"),
            r#"HandlerRegistry { fields: ["A", "BField"] }"#
        );
    }
}
