//! Canonical, deterministic CBOR encoding.
//!
//! Delta and block bytes participate in content-address hashing, so two
//! replicas encoding the same logical value must produce byte-identical
//! output. `serde`'s derived CBOR encoding is already deterministic for a
//! fixed struct layout, but we go one step further and re-sort every map's
//! keys by their own encoded bytes (the canonical CBOR rule from RFC 8949
//! §4.2.1), so the guarantee holds even across struct shape changes or
//! maps built from unordered collections.

use crate::error::CodecError;
use ciborium::Value;
use serde::{de::DeserializeOwned, Serialize};

/// Encode `value` as canonical CBOR bytes.
pub fn to_canonical_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, CodecError> {
    let raw = Value::serialized(value).map_err(|e| CodecError::Encode(e.to_string()))?;
    let canon = canonicalize(raw);

    let mut buf = Vec::new();
    ciborium::into_writer(&canon, &mut buf).map_err(|e| CodecError::Encode(e.to_string()))?;
    Ok(buf)
}

/// Decode canonical CBOR bytes back into `T`.
pub fn from_canonical_bytes<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, CodecError> {
    ciborium::from_reader(bytes).map_err(|e| CodecError::Decode(e.to_string()))
}

/// Recursively sort every map's entries by the canonical encoding of their
/// keys, matching CBOR's deterministic-encoding map key ordering rule.
fn canonicalize(value: Value) -> Value {
    match value {
        Value::Map(entries) => {
            let mut keyed: Vec<(Vec<u8>, Value, Value)> = entries
                .into_iter()
                .map(|(k, v)| {
                    let k = canonicalize(k);
                    let v = canonicalize(v);
                    let mut kb = Vec::new();
                    ciborium::into_writer(&k, &mut kb).expect("map key always encodes");
                    (kb, k, v)
                })
                .collect();
            keyed.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Map(keyed.into_iter().map(|(_, k, v)| (k, v)).collect())
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::collections::BTreeMap;

    #[derive(Serialize, Deserialize, PartialEq, Debug)]
    struct Example {
        zeta: u64,
        alpha: String,
        parents: Vec<u64>,
    }

    #[test]
    fn roundtrip() {
        let value = Example {
            zeta: 7,
            alpha: "hi".to_string(),
            parents: vec![1, 2, 3],
        };
        let bytes = to_canonical_bytes(&value).unwrap();
        let back: Example = from_canonical_bytes(&bytes).unwrap();
        assert_eq!(value, back);
    }

    #[test]
    fn field_order_does_not_affect_bytes() {
        // Two maps with the same logical entries in different insertion
        // order must canonicalize to identical bytes.
        let mut a = BTreeMap::new();
        a.insert("zeta".to_string(), 1u64);
        a.insert("alpha".to_string(), 2u64);

        let mut b = BTreeMap::new();
        b.insert("alpha".to_string(), 2u64);
        b.insert("zeta".to_string(), 1u64);

        assert_eq!(
            to_canonical_bytes(&a).unwrap(),
            to_canonical_bytes(&b).unwrap()
        );
    }

    #[test]
    fn deterministic_across_calls() {
        let value = Example {
            zeta: 42,
            alpha: "stable".to_string(),
            parents: vec![9, 8, 7],
        };
        let b1 = to_canonical_bytes(&value).unwrap();
        let b2 = to_canonical_bytes(&value).unwrap();
        assert_eq!(b1, b2);
    }
}
