//! Immutable, content-addressed DAG nodes.

use crate::error::ClockError;
use serde::{Deserialize, Serialize};
use tessera_codec::{from_canonical_bytes, to_canonical_bytes};
use tessera_core::{ContentId, Hasher};

/// `{ delta, parents }`, content-addressed under the canonical codec.
/// Parents are stored sorted and deduplicated so that two blocks built
/// from the same logical parent set always encode to identical bytes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub delta: Vec<u8>,
    pub priority: u64,
    pub parents: Vec<ContentId>,
}

impl Block {
    pub fn new(delta: Vec<u8>, priority: u64, parents: impl IntoIterator<Item = ContentId>) -> Self {
        let mut parents: Vec<ContentId> = parents.into_iter().collect();
        parents.sort();
        parents.dedup();
        Block {
            delta,
            priority,
            parents,
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>, ClockError> {
        Ok(to_canonical_bytes(self)?)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, ClockError> {
        Ok(from_canonical_bytes(bytes)?)
    }

    /// The block's identity: the hash of its own canonical encoding.
    pub fn content_id(&self) -> Result<ContentId, ClockError> {
        Ok(Hasher::hash(&self.encode()?))
    }

    /// Decode `bytes` and verify they hash to `claimed`, rejecting on
    /// mismatch before the block is trusted any further.
    pub fn verify(bytes: &[u8], claimed: ContentId) -> Result<Self, ClockError> {
        let actual = Hasher::hash(bytes);
        if actual != claimed {
            return Err(ClockError::HashMismatch);
        }
        Block::decode(bytes)
    }
}
