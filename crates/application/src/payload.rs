//! Response payload shapes.
//!
//! List endpoints answer `{"data": [...]}`, the store endpoint answers one
//! record object and the delete endpoint a bare array. The helpers accept
//! all three so callers do not care which endpoint they hit.

use remodel_domain::Attributes;
use serde_json::Value;

use crate::error::{QueryError, QueryResult};

const DATA: &str = "data";

/// Extracts a list of records.
pub fn records(body: Value) -> QueryResult<Vec<Attributes>> {
    match body {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => items.into_iter().map(object).collect(),
        Value::Object(mut map) => match map.shift_remove(DATA) {
            Some(data @ (Value::Array(_) | Value::Object(_) | Value::Null)) => records(data),
            Some(other) => {
                map.insert(DATA.to_string(), other);
                Ok(vec![map])
            }
            None => Ok(vec![map]),
        },
        other => Err(malformed("a record list", &other)),
    }
}

/// Extracts a single record.
pub fn record(body: Value) -> QueryResult<Attributes> {
    match body {
        Value::Object(mut map) => match map.shift_remove(DATA) {
            Some(Value::Object(data)) => Ok(data),
            Some(other) => {
                map.insert(DATA.to_string(), other);
                Ok(map)
            }
            None => Ok(map),
        },
        other => Err(malformed("a record object", &other)),
    }
}

fn object(value: Value) -> QueryResult<Attributes> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(malformed("a record object", &other)),
    }
}

fn malformed(expected: &str, found: &Value) -> QueryError {
    QueryError::MalformedPayload(format!("expected {expected}, found {found}"))
}
