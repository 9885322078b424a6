//! Tool argument normalisation helpers.
//!
//! Models are loose with numeric types: proposal IDs arrive as integers,
//! numeric strings, integral floats, or wrapped in an object. Everything is
//! reduced to a `u64` before it reaches a backend.

use crate::types::{Error, Result};
use serde_json::Value;

/// Extract a proposal ID from tool arguments or a bare value.
pub fn normalize_proposal_id(args: &Value) -> Result<u64> {
    let value = match args {
        Value::Object(map) => map.get("proposal_id").unwrap_or(&Value::Null),
        other => other,
    };
    non_negative_integer("proposal_id", value)
}

/// Read a non-negative integer from an integer, integral float or numeric string.
fn non_negative_integer(field: &str, value: &Value) -> Result<u64> {
    let invalid = || Error::validation(format!("{field} must be a non-negative integer, got {value}"));
    match value {
        Value::Null => Err(Error::validation(format!("{field} is missing"))),
        Value::Number(n) => n
            .as_u64()
            .or_else(|| {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && *f >= 0.0 && *f <= u64::MAX as f64)
                    .map(|f| f as u64)
            })
            .ok_or_else(invalid),
        Value::String(s) => s.trim().parse::<u64>().map_err(|_| invalid()),
        _ => Err(invalid()),
    }
}

/// Optional non-negative integer argument.
pub fn optional_u64(args: &Value, field: &str) -> Result<Option<u64>> {
    match args.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => non_negative_integer(field, v).map(Some),
    }
}

/// Optional list-of-strings argument.
pub fn optional_string_list(args: &Value, field: &str) -> Result<Vec<String>> {
    match args.get(field) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| Error::validation(format!("{field} must contain only strings")))
            })
            .collect(),
        Some(v) => Err(Error::validation(format!("{field} must be an array, got {v}"))),
    }
}
