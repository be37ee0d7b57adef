//! Result-shape normalization.
//!
//! Different result producers wrap their rows differently: a bare array, an
//! object with a `rows` array, or an object with a `data` array. These are
//! pure helpers that collapse all of them into one canonical sequence.

use serde_json::Value;

/// Normalizes a loosely-shaped result value into an ordered row sequence.
///
/// Unrecognized shapes yield an empty sequence; there is no failure path.
pub fn normalize_rows(value: &Value) -> Vec<Value> {
    if let Some(rows) = value.as_array() {
        return rows.clone();
    }
    for key in ["rows", "data"] {
        if let Some(rows) = value.get(key).and_then(Value::as_array) {
            return rows.clone();
        }
    }
    Vec::new()
}

/// Collapses repeated `&amp;`-encodings to a plain `&`.
///
/// Warehouse-sourced display strings arrive double- or triple-encoded when
/// upstream loaders escape already-escaped values.
pub fn decode_entities(s: &str) -> String {
    let mut out = s.to_string();
    while out.contains("&amp;") {
        out = out.replace("&amp;", "&");
    }
    out
}
