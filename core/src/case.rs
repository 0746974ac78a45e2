//! Field-name case conversion for response payloads.

use serde_json::{Map, Value};

/// Convert a snake/kebab/space separated key to camel case.
///
/// Each run of `_`, `-` or whitespace is dropped and the character after it
/// upper-cased; the first character is lower-cased. Characters that are
/// already upper case stay as they are, and purely numeric keys are returned
/// untouched.
pub fn camelize(key: &str) -> String {
    if is_numeric(key) {
        return key.to_string();
    }

    let mut out = String::with_capacity(key.len());
    let mut upper_next = false;
    for ch in key.chars() {
        if ch == '_' || ch == '-' || ch.is_whitespace() {
            upper_next = true;
        } else if upper_next {
            out.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }

    let mut chars = out.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => out,
    }
}

/// Camelize every object key at every depth, descending through arrays.
/// Scalars and `null` come back unchanged.
pub fn camelize_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (camelize(&k), camelize_keys(v)))
                .collect::<Map<String, Value>>(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(camelize_keys).collect()),
        other => other,
    }
}

fn is_numeric(key: &str) -> bool {
    !key.is_empty() && key.trim().parse::<f64>().is_ok_and(|n| !n.is_nan())
}
