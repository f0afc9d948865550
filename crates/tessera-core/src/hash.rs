//! Content identifiers for Merkle-DAG blocks.
//!
//! A `ContentId` is a cryptographic hash over a block's canonical encoding,
//! wrapped in a one-byte multihash-style tag so the hash function can change
//! later without touching code that only moves `ContentId`s around.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Multihash function code for SHA2-256, per the multihash table.
const SHA2_256_CODE: u8 = 0x12;
/// Digest length in bytes for SHA2-256.
const SHA2_256_LEN: u8 = 32;

/// A content identifier: `{ code, length, digest }`.
///
/// Two blocks with identical bytes always hash to the same `ContentId`;
/// computing the hash of a block's canonical encoding yields its identity.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct ContentId {
    code: u8,
    digest: [u8; 32],
}

impl ContentId {
    /// Wrap a raw SHA2-256 digest as a `ContentId`.
    pub fn from_digest(digest: [u8; 32]) -> Self {
        ContentId {
            code: SHA2_256_CODE,
            digest,
        }
    }

    /// The raw digest bytes (excludes the multihash tag).
    pub fn digest(&self) -> &[u8; 32] {
        &self.digest
    }

    /// Encode as `[code, length, ...digest]`, the form stored on disk and
    /// used for byte-lexicographic comparison in LWW tie-breaks.
    pub fn to_multihash_bytes(&self) -> [u8; 34] {
        let mut out = [0u8; 34];
        out[0] = self.code;
        out[1] = SHA2_256_LEN;
        out[2..].copy_from_slice(&self.digest);
        out
    }

    /// Parse a multihash-tagged byte string back into a `ContentId`.
    pub fn from_multihash_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != 34 || bytes[0] != SHA2_256_CODE || bytes[1] != SHA2_256_LEN {
            return None;
        }
        let mut digest = [0u8; 32];
        digest.copy_from_slice(&bytes[2..]);
        Some(ContentId {
            code: bytes[0],
            digest,
        })
    }

    /// Hex rendering of the digest, for display and debugging.
    pub fn to_hex(&self) -> String {
        self.digest.iter().map(|b| format!("{:02x}", b)).collect()
    }

    /// Truncated display (first 8 hex chars).
    pub fn short(&self) -> String {
        self.to_hex()[..8].to_string()
    }
}

impl fmt::Debug for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentId({}...)", &self.to_hex()[..8])
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Incremental hasher used to compute `ContentId`s from canonical bytes.
pub struct Hasher {
    inner: Sha256,
}

impl Hasher {
    pub fn new() -> Self {
        Hasher {
            inner: Sha256::new(),
        }
    }

    pub fn update(&mut self, data: &[u8]) {
        self.inner.update(data);
    }

    pub fn finalize(self) -> ContentId {
        let result = self.inner.finalize();
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&result);
        ContentId::from_digest(bytes)
    }

    /// Hash a single byte slice directly.
    pub fn hash(data: &[u8]) -> ContentId {
        let mut hasher = Self::new();
        hasher.update(data);
        hasher.finalize()
    }
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic() {
        let a = Hasher::hash(b"hello world");
        let b = Hasher::hash(b"hello world");
        assert_eq!(a, b);
    }

    #[test]
    fn different_data_different_hash() {
        assert_ne!(Hasher::hash(b"hello"), Hasher::hash(b"world"));
    }

    #[test]
    fn multihash_roundtrip() {
        let cid = Hasher::hash(b"round trip me");
        let bytes = cid.to_multihash_bytes();
        let back = ContentId::from_multihash_bytes(&bytes).unwrap();
        assert_eq!(cid, back);
    }

    #[test]
    fn byte_lexicographic_order_matches_derived_ord() {
        let a = Hasher::hash(b"a");
        let b = Hasher::hash(b"b");
        let ord_derived = a.cmp(&b);
        let ord_bytes = a.to_multihash_bytes().cmp(&b.to_multihash_bytes());
        assert_eq!(ord_derived, ord_bytes);
    }
}
