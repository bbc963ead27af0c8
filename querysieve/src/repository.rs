//! Entry points for code that owns an entity's queries.
//!
//! An [`EntitySource`] knows its entity's type name and how to start a query
//! for it. The root alias comes from the type name: `app::model::BlogPost`
//! is queried as `blog_post`.

use serde_json::Value as JsonValue;

use crate::compiler::{FilterCompiler, HandlerRegistry, compile_with};
use crate::config::FilterConfiguration;
use crate::dialect::Dialect;
use crate::error::Result;
use crate::query::{QueryBuilder, SelectQuery};

/// Normalize `raw` and compile it onto `query`.
///
/// ```
/// use querysieve::{Sqlite, SelectQuery, compile};
/// use serde_json::json;
///
/// let query = SelectQuery::new(Sqlite::default(), "users", Some("u")).unwrap();
/// let query = compile(&json!({"items": 5, "filters": {"active": true}}), query).unwrap();
///
/// assert_eq!(
///     query.to_sql().unwrap().sql,
///     "SELECT u.* FROM users u WHERE u.active = ?1 LIMIT 5 OFFSET 0"
/// );
/// ```
pub fn compile<Q: QueryBuilder>(raw: &JsonValue, query: Q) -> Result<Q> {
    let config = FilterConfiguration::normalize(raw)?;
    compile_with(&config, query)
}

/// Last path segment of a type name, after `::` or `\`.
pub fn short_name(type_name: &str) -> &str {
    let start = type_name
        .rfind("::")
        .map(|i| i + 2)
        .into_iter()
        .chain(type_name.rfind('\\').map(|i| i + 1))
        .max()
        .unwrap_or(0);
    type_name.get(start..).unwrap_or(type_name)
}

/// `CamelCase` to `snake_case`: an underscore goes before every capital that
/// follows a word character, then everything is lowercased.
///
/// ```
/// use querysieve::tableize;
///
/// assert_eq!(tableize("BlogPost"), "blog_post");
/// assert_eq!(tableize("user"), "user");
/// assert_eq!(tableize("HTMLPage"), "h_t_m_l_page");
/// ```
pub fn tableize(word: &str) -> String {
    let mut out = String::with_capacity(word.len() + 4);
    let mut prev_is_word = false;
    for c in word.chars() {
        if c.is_uppercase() && prev_is_word {
            out.push('_');
        }
        out.extend(c.to_lowercase());
        prev_is_word = c.is_alphanumeric() || c == '_';
    }
    out
}

/// Something that can produce filtered queries for one entity type.
///
/// Implement [`entity_name`](Self::entity_name) and
/// [`create_query`](Self::create_query); override
/// [`handlers`](Self::handlers) to give fields custom filter logic.
pub trait EntitySource {
    /// Query builder this source produces.
    type Query: QueryBuilder;

    /// Fully qualified entity type name, e.g. `app::model::BlogPost`.
    fn entity_name(&self) -> &str;

    /// Start a query rooted at `alias`.
    fn create_query(&self, alias: &str) -> Result<Self::Query>;

    /// Alias derived from the entity's short type name.
    fn root_alias(&self) -> String {
        tableize(short_name(self.entity_name()))
    }

    /// Query rooted at [`root_alias`](Self::root_alias).
    fn default_query(&self) -> Result<Self::Query> {
        self.create_query(&self.root_alias())
    }

    /// Per-field handlers used by [`filtered_query`](Self::filtered_query).
    fn handlers(&self) -> HandlerRegistry<Self::Query> {
        HandlerRegistry::new()
    }

    /// Default query with `raw` options compiled onto it.
    fn filtered_query(&self, raw: &JsonValue) -> Result<Self::Query> {
        let query = self.default_query()?;
        self.filtered_query_with(raw, query)
    }

    /// `query` with `raw` options compiled onto it.
    fn filtered_query_with(&self, raw: &JsonValue, query: Self::Query) -> Result<Self::Query> {
        let config = FilterConfiguration::normalize(raw)?;
        FilterCompiler::new(query, &config)
            .with_handlers(self.handlers())
            .build()
    }
}

/// An [`EntitySource`] backed by one SQL table.
///
/// ```
/// use querysieve::{EntitySource, EntityTable, Postgres};
/// use serde_json::json;
///
/// let posts = EntityTable::new(Postgres::default(), "app::model::BlogPost", "blog_posts");
/// assert_eq!(posts.root_alias(), "blog_post");
///
/// let query = posts.filtered_query(&json!({"filters": {"id": 3}})).unwrap();
/// assert_eq!(
///     query.to_sql().unwrap().sql,
///     "SELECT blog_post.* FROM blog_posts blog_post WHERE blog_post.id = $1 LIMIT 25 OFFSET 0"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct EntityTable<D: Dialect> {
    dialect: D,
    entity: String,
    table: String,
}

impl<D: Dialect> EntityTable<D> {
    /// Source for entity type `entity` stored in `table`.
    pub fn new(dialect: D, entity: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            dialect,
            entity: entity.into(),
            table: table.into(),
        }
    }

    /// Backing table.
    pub fn table(&self) -> &str {
        &self.table
    }
}

impl<D: Dialect> EntitySource for EntityTable<D> {
    type Query = SelectQuery<D>;

    fn entity_name(&self) -> &str {
        &self.entity
    }

    fn create_query(&self, alias: &str) -> Result<SelectQuery<D>> {
        SelectQuery::new(self.dialect, self.table.as_str(), Some(alias))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{Postgres, Sqlite};
    use crate::error::Error;
    use crate::operator::Operator;
    use crate::query::{Join, Predicate};
    use crate::value::Value;
    use serde_json::json;

    #[test]
    fn test_short_name() {
        assert_eq!(short_name("app::model::BlogPost"), "BlogPost");
        assert_eq!(short_name(r"App\Entity\BlogPost"), "BlogPost");
        assert_eq!(short_name("BlogPost"), "BlogPost");
        assert_eq!(short_name("a::b\\C"), "C");
        assert_eq!(short_name("a\\b::C"), "C");
    }

    #[test]
    fn test_tableize() {
        assert_eq!(tableize("BlogPost"), "blog_post");
        assert_eq!(tableize("Post"), "post");
        assert_eq!(tableize("OAuth2Client"), "o_auth2_client");
        assert_eq!(tableize("already_snake"), "already_snake");
        assert_eq!(tableize(""), "");
    }

    #[test]
    fn test_root_alias_from_type_name() {
        let source = EntityTable::new(Postgres, "shop::OrderLine", "order_lines");
        assert_eq!(source.root_alias(), "order_line");
    }

    #[test]
    fn test_invalid_alias_surfaces_from_default_query() {
        let source = EntityTable::new(Postgres, "Vec<u8>", "bytes");
        assert!(matches!(
            source.default_query(),
            Err(Error::InvalidConfiguration { ref path, .. }) if path == "alias"
        ));
    }

    #[test]
    fn test_filtered_query_uses_root_alias() {
        let source = EntityTable::new(Sqlite, "shop::OrderLine", "order_lines");
        let query = source
            .filtered_query(&json!({
                "items": 0,
                "filters": {"quantity": 2},
                "operators": {"quantity": "gte"},
                "order": [{"by": "id", "dir": "desc"}],
            }))
            .unwrap();
        assert_eq!(
            query.to_sql().unwrap().sql,
            "SELECT order_line.* FROM order_lines order_line WHERE order_line.quantity >= ?1 \
             ORDER BY order_line.id DESC"
        );
    }

    #[test]
    fn test_filtered_query_with_existing_query() {
        let source = EntityTable::new(Postgres, "BlogPost", "posts");
        let mut base = source.create_query("p").unwrap();
        base.and_where(Predicate::is_null("p.deleted_at"));

        let query = source
            .filtered_query_with(&json!({"filters": {"status": "draft"}}), base)
            .unwrap();
        assert_eq!(
            query.predicates(),
            [
                Predicate::is_null("p.deleted_at"),
                Predicate::compare("p.status", Operator::Eq, "status"),
            ]
        );
    }

    #[test]
    fn test_normalization_errors_propagate() {
        let source = EntityTable::new(Postgres, "BlogPost", "posts");
        assert!(matches!(
            source.filtered_query(&json!({"page": 0})),
            Err(Error::InvalidConfiguration { .. })
        ));
    }

    struct Posts;

    impl EntitySource for Posts {
        type Query = SelectQuery<Postgres>;

        fn entity_name(&self) -> &str {
            "blog::Post"
        }

        fn create_query(&self, alias: &str) -> Result<Self::Query> {
            SelectQuery::new(Postgres, "posts", Some(alias))
        }

        fn handlers(&self) -> HandlerRegistry<Self::Query> {
            HandlerRegistry::<Self::Query>::new().with("author", |q, _, value| {
                q.ensure_join(Join::inner("users", "author").on("author.id = post.author_id"))?;
                q.bind("author_name", value.to_param());
                q.and_where(Predicate::compare("author.name", Operator::Eq, "author_name"));
                Ok(())
            })
        }
    }

    #[test]
    fn test_custom_handlers() {
        let result = Posts
            .filtered_query(&json!({"filters": {"author": "ann"}, "items": 0}))
            .unwrap()
            .to_sql()
            .unwrap();
        assert_eq!(
            result.sql,
            "SELECT post.*, author.* FROM posts post INNER JOIN users author \
             ON author.id = post.author_id WHERE author.name = $1"
        );
        assert_eq!(result.params, vec![Value::String("ann".into())]);
    }

    #[test]
    fn test_compile_free_function() {
        let query = SelectQuery::new(Postgres, "posts", Some("post")).unwrap();
        let query = compile(&json!({"group_by": "post.id", "items": 0}), query).unwrap();
        assert_eq!(query.grouping(), Some("post.id"));
        assert_eq!(query.limit(), None);
    }
}
