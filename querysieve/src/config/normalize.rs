//! Raw option map to [`FilterConfiguration`].

use serde_json::{Map, Value as JsonValue};

use super::{DEFAULT_ITEMS, DEFAULT_PAGE, FilterConfiguration, OrderBy, SortDir};
use crate::error::{Error, Result};
use crate::field::FieldRef;
use crate::operator::{Operator, OperatorTable};
use crate::value::FilterValue;

const KNOWN_KEYS: &[&str] = &[
    "items",
    "page",
    "order",
    "filters",
    "operators",
    "group_by",
    "skip_null_values",
];

pub(super) fn normalize(raw: &JsonValue) -> Result<FilterConfiguration> {
    let empty = Map::new();
    let options = match raw {
        JsonValue::Null => &empty,
        JsonValue::Object(map) => map,
        other => {
            return Err(Error::config(
                "$",
                format!("expected an object, got {}", kind(other)),
            ));
        },
    };

    if let Some(unknown) = options.keys().find(|k| !KNOWN_KEYS.contains(&k.as_str())) {
        return Err(Error::config(
            unknown.as_str(),
            format!("unrecognized option, expected one of: {}", KNOWN_KEYS.join(", ")),
        ));
    }

    let option = |key: &str| options.get(key).filter(|v| !v.is_null());

    let items = match option("items") {
        None => DEFAULT_ITEMS,
        Some(v) => {
            let n = integer("items", v)?;
            if n < 0 {
                return Err(Error::config("items", "must be 0 (unlimited) or positive"));
            }
            to_u32("items", n)?
        },
    };

    let page = match option("page") {
        None => DEFAULT_PAGE,
        Some(v) => {
            let n = integer("page", v)?;
            if n <= 0 {
                return Err(Error::config("page", "must be positive"));
            }
            to_u32("page", n)?
        },
    };

    let order = match option("order") {
        None => Vec::new(),
        Some(JsonValue::Array(entries)) => entries
            .iter()
            .enumerate()
            .map(|(i, entry)| order_entry(i, entry))
            .collect::<Result<_>>()?,
        Some(other) => {
            return Err(Error::config(
                "order",
                format!("expected a list, got {}", kind(other)),
            ));
        },
    };

    let filters = match option("filters") {
        None => Vec::new(),
        Some(v) => filters(v)?,
    };

    let operators = match option("operators") {
        None => OperatorTable::new(),
        Some(v) => operators(v)?,
    };

    let group_by = match option("group_by") {
        None => None,
        Some(JsonValue::String(s)) if s.is_empty() => None,
        Some(JsonValue::String(s)) => Some(
            FieldRef::parse(s).map_err(|e| Error::config("group_by", reason_of(&e)))?,
        ),
        Some(other) => {
            return Err(Error::config(
                "group_by",
                format!("expected a string, got {}", kind(other)),
            ));
        },
    };

    let skip_null_values = match option("skip_null_values") {
        None => true,
        Some(JsonValue::Bool(b)) => *b,
        Some(other) => {
            return Err(Error::config(
                "skip_null_values",
                format!("expected a boolean, got {}", kind(other)),
            ));
        },
    };

    Ok(FilterConfiguration {
        items,
        page,
        order,
        group_by,
        filters,
        operators,
        skip_null_values,
    })
}

/// Accept JSON integers and decimal strings (query-string input).
fn integer(path: &str, value: &JsonValue) -> Result<i64> {
    match value {
        JsonValue::Number(n) => n
            .as_i64()
            .ok_or_else(|| Error::config(path, format!("expected an integer, got {n}"))),
        JsonValue::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| Error::config(path, format!("expected an integer, got \"{s}\""))),
        other => Err(Error::config(
            path,
            format!("expected an integer, got {}", kind(other)),
        )),
    }
}

fn to_u32(path: &str, n: i64) -> Result<u32> {
    u32::try_from(n).map_err(|_| Error::config(path, format!("{n} is too large")))
}

fn order_entry(index: usize, entry: &JsonValue) -> Result<OrderBy> {
    let path = format!("order[{index}]");
    let JsonValue::Object(fields) = entry else {
        return Err(Error::config(
            path,
            format!("expected an object with `by` and `dir`, got {}", kind(entry)),
        ));
    };

    if let Some(unknown) = fields.keys().find(|k| *k != "by" && *k != "dir") {
        return Err(Error::config(
            format!("{path}.{unknown}"),
            "unrecognized option, expected `by` or `dir`",
        ));
    }

    let by = match fields.get("by") {
        Some(JsonValue::String(s)) => {
            FieldRef::parse(s).map_err(|e| Error::config(format!("{path}.by"), reason_of(&e)))?
        },
        Some(JsonValue::Null) | None => {
            return Err(Error::config(format!("{path}.by"), "is required"));
        },
        Some(other) => {
            return Err(Error::config(
                format!("{path}.by"),
                format!("expected a string, got {}", kind(other)),
            ));
        },
    };

    let dir = match fields.get("dir") {
        Some(JsonValue::Null) | None => SortDir::Asc,
        Some(JsonValue::String(s)) => SortDir::parse(s).ok_or_else(|| {
            Error::config(format!("{path}.dir"), format!("invalid order direction \"{s}\""))
        })?,
        Some(other) => {
            return Err(Error::config(
                format!("{path}.dir"),
                format!("expected a string, got {}", kind(other)),
            ));
        },
    };

    Ok(OrderBy { by, dir })
}

fn filters(value: &JsonValue) -> Result<Vec<(FieldRef, FilterValue)>> {
    match value {
        JsonValue::Object(entries) => entries
            .iter()
            .map(|(key, raw)| {
                let field = FieldRef::parse(key)?;
                let value = FilterValue::from_json(&format!("filters.{key}"), raw)?;
                Ok((field, value))
            })
            .collect(),
        // `[]` is the usual spelling of "no filters" in loosely typed callers.
        JsonValue::Array(items) if items.is_empty() => Ok(Vec::new()),
        JsonValue::Array(_) => Err(Error::field(
            "0",
            "filter keys must be field names, got a positional list",
        )),
        other => Err(Error::config(
            "filters",
            format!("expected an object, got {}", kind(other)),
        )),
    }
}

fn operators(value: &JsonValue) -> Result<OperatorTable> {
    let entries = match value {
        JsonValue::Object(entries) => entries,
        JsonValue::Array(items) if items.is_empty() => return Ok(OperatorTable::new()),
        other => {
            return Err(Error::config(
                "operators",
                format!("expected an object, got {}", kind(other)),
            ));
        },
    };

    let mut table = OperatorTable::new();
    for (field, raw) in entries {
        let path = format!("operators.{field}");
        FieldRef::parse(field).map_err(|e| Error::config(path.as_str(), reason_of(&e)))?;
        let op = match raw {
            JsonValue::String(tag) => Operator::from_tag(tag)
                .ok_or_else(|| Error::config(path.as_str(), format!("invalid operator \"{tag}\"")))?,
            other => {
                return Err(Error::config(
                    path,
                    format!("expected an operator tag, got {}", kind(other)),
                ));
            },
        };
        table.insert(field.as_str(), op);
    }
    Ok(table)
}

fn reason_of(err: &Error) -> String {
    match err {
        Error::InvalidFilterField { reason, .. } => reason.clone(),
        other => other.to_string(),
    }
}

const fn kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "a list",
        JsonValue::Object(_) => "an object",
    }
}
