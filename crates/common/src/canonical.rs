//! Canonical JSON: sorted keys, no indentation, no escaped Unicode.
//!
//! `serde_json`'s `Map` is a `BTreeMap` unless the `preserve_order` feature
//! is enabled (it isn't, here), so round-tripping any `Serialize` value
//! through `serde_json::Value` already yields lexicographically sorted
//! object keys; `to_string` then emits it with no inserted whitespace and
//! passes non-ASCII bytes through unescaped.

use crate::PoolError;
use serde::Serialize;

/// Serializes `value` to its canonical JSON string: sorted keys, compact,
/// Unicode-preserving. This is the exact byte sequence hashed for overlay
/// identity and compared against stored bytes during `validate`.
pub fn canonical_json<T: Serialize>(value: &T) -> Result<String, PoolError> {
    let as_value = serde_json::to_value(value)
        .map_err(|e| PoolError::SchemaMismatch(format!("serialize: {e}")))?;
    serde_json::to_string(&as_value)
        .map_err(|e| PoolError::SchemaMismatch(format!("serialize: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sorts_keys_and_preserves_unicode() {
        let v = json!({"z": 1, "a": "café", "m": {"y": 2, "b": 1}});
        let s = canonical_json(&v).unwrap();
        assert_eq!(s, r#"{"a":"café","m":{"b":1,"y":2},"z":1}"#);
        assert!(!s.contains("\\u"));
        assert!(!s.ends_with('\n'));
    }
}
