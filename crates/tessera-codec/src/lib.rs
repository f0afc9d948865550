//! Canonical binary encoding for Tessera deltas and Merkle blocks.
//!
//! Everything that gets hashed into a `ContentId` — a delta payload, a
//! block's parent list, a composite document patch — is encoded through
//! this crate first, so two replicas that compute the same logical value
//! always produce the same bytes.

pub mod canonical;
pub mod error;
pub mod priority;

pub use canonical::{from_canonical_bytes, to_canonical_bytes};
pub use error::CodecError;
pub use priority::next_priority;
