//! Document keys.
//!
//! A `DocKey` is a stable identifier derived from a document's creation-time
//! content. The core treats it as an opaque byte string; it never inspects
//! or parses the bytes beyond using them as a store key component.

use crate::hash::Hasher;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocKey(Vec<u8>);

impl DocKey {
    /// Derive a `DocKey` from the document's creation-time content (the
    /// initial patch bytes). Two documents created with identical initial
    /// content, by the same replica in the same instant, would collide;
    /// callers that need uniqueness should mix in a replica/session nonce
    /// before calling this.
    pub fn from_content(initial_content: &[u8]) -> Self {
        let cid = Hasher::hash(initial_content);
        DocKey(cid.to_multihash_bytes().to_vec())
    }

    /// Wrap an already-opaque byte string as a `DocKey` (e.g. one read back
    /// from the store's key layout).
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        DocKey(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

impl fmt::Debug for DocKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DocKey({})", self.to_hex())
    }
}

impl fmt::Display for DocKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_from_content() {
        let a = DocKey::from_content(b"{\"name\":\"Alice\"}");
        let b = DocKey::from_content(b"{\"name\":\"Alice\"}");
        assert_eq!(a, b);
    }

    #[test]
    fn distinct_content_distinct_key() {
        let a = DocKey::from_content(b"one");
        let b = DocKey::from_content(b"two");
        assert_ne!(a, b);
    }
}
