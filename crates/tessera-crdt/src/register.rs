//! The register capability every CRDT kind implements.

use crate::error::CrdtError;
use serde::{Deserialize, Serialize};
use tessera_core::ContentId;

/// Which CRDT kind a field is backed by; chosen per-field from the schema.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CrdtKind {
    LwwRegister,
    CompositeDag,
}

/// A CRDT-kind-specific payload plus a logical priority. Not addressable on
/// its own; becomes addressable once a Merkle clock wraps it in a block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Delta {
    /// Longest-path priority, stamped by the clock before the owning block
    /// is hashed. Zero until the clock stamps it.
    pub priority: u64,
    /// Canonically-encoded, kind-specific body.
    pub body: Vec<u8>,
}

/// A CRDT instance bound to one field of one document.
///
/// `set` is pure and must not mutate register state; only `merge` does,
/// and only in response to a delta that has already been committed to a
/// block by the Merkle clock.
pub trait Register: Send + Sync {
    fn kind(&self) -> CrdtKind;

    /// Produce a delta from a local input, without persisting or merging it.
    fn set(&self, input: &[u8]) -> Result<Delta, CrdtError>;

    /// Fold `delta`, authored in the block identified by `block_id`, into
    /// this register's state.
    fn merge(&mut self, delta: &Delta, block_id: ContentId) -> Result<(), CrdtError>;

    /// The register's current materialised value.
    fn value(&self) -> Vec<u8>;

    fn delta_priority(&self, delta: &Delta) -> u64 {
        delta.priority
    }

    fn encode_delta(&self, delta: &Delta) -> Result<Vec<u8>, CrdtError>;

    fn decode_delta(&self, bytes: &[u8]) -> Result<Delta, CrdtError>;
}
