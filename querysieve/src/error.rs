//! Error type shared by normalization and compilation.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Everything that can go wrong while normalizing options or compiling them
/// onto a query.
///
/// All variants are programmer or configuration errors. None of them are
/// transient, so nothing here is worth retrying. A `build()` that fails may
/// already have added clauses to the query builder; discard the builder.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum Error {
    /// Raw options failed validation (bad items/page/direction/operator,
    /// unknown key, wrong shape).
    #[error("invalid configuration at `{path}`: {reason}")]
    InvalidConfiguration {
        /// Dotted path of the offending option, e.g. `order[1].dir`.
        path: String,
        /// What was wrong with it.
        reason: String,
    },

    /// A filter key is not a usable field reference.
    #[error("invalid filter field `{field}`: {reason}")]
    InvalidFilterField {
        /// The rejected key, rendered as text.
        field: String,
        /// What was wrong with it.
        reason: String,
    },

    /// An operator tag outside the fixed operator set reached the compiler.
    #[error("unknown operator `{tag}` for field `{field}`")]
    UnknownOperator {
        /// Field the operator was mapped to.
        field: String,
        /// The unrecognised tag.
        tag: String,
    },

    /// The filter value cannot be used with the operator chosen for it.
    #[error("invalid value for filter `{field}`: {reason}")]
    InvalidFilterValue {
        /// Field the value belongs to.
        field: String,
        /// What was wrong with it.
        reason: String,
    },

    /// The query builder has no root alias to qualify bare fields with.
    #[error("query builder has no root alias")]
    MissingRootAlias,

    /// A predicate references a parameter that was never bound.
    #[error("parameter `{name}` is referenced but never bound")]
    UnboundParameter {
        /// Parameter name without the leading colon.
        name: String,
    },

    /// A join target, alias or condition failed validation.
    #[error("invalid join: {reason}")]
    InvalidJoin {
        /// What was wrong with it.
        reason: String,
    },
}

impl Error {
    pub(crate) fn config(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidFilterField {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidFilterValue {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = Error::config("page", "must be positive");
        assert_eq!(
            err.to_string(),
            "invalid configuration at `page`: must be positive"
        );

        let err = Error::UnknownOperator {
            field: "status".into(),
            tag: "regex".into(),
        };
        assert_eq!(err.to_string(), "unknown operator `regex` for field `status`");

        assert_eq!(
            Error::MissingRootAlias.to_string(),
            "query builder has no root alias"
        );
    }

    #[test]
    fn test_errors_compare_by_value() {
        assert_eq!(
            Error::field("0", "keys must be strings"),
            Error::InvalidFilterField {
                field: "0".into(),
                reason: "keys must be strings".into(),
            }
        );
        assert_ne!(Error::value("a", "x"), Error::value("b", "x"));
    }
}
