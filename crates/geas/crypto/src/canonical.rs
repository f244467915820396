//! Deterministic JSON encoding.
//!
//! Object keys are sorted by code point, no insignificant whitespace is
//! emitted, and strings stay UTF-8 (no ASCII escaping). Two documents that are
//! equal as mappings encode to identical bytes regardless of insertion order.

use crate::error::CryptoError;
use serde::Serialize;
use serde_json::{Map, Value};

/// Encode a structured document canonically.
pub fn canonicalize(value: &Value) -> Result<Vec<u8>, CryptoError> {
    Ok(serde_json::to_vec(&sorted(value))?)
}

/// Serialize `value` to a JSON document and encode it canonically.
pub fn canonicalize_serializable<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, CryptoError> {
    let doc = serde_json::to_value(value)?;
    canonicalize(&doc)
}

/// Rebuild the tree with every object's keys inserted in sorted order, so the
/// result does not depend on whether `serde_json` preserves insertion order.
fn sorted(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut out = Map::with_capacity(map.len());
            for key in keys {
                out.insert(key.clone(), sorted(&map[key.as_str()]));
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(sorted).collect()),
        scalar => scalar.clone(),
    }
}
