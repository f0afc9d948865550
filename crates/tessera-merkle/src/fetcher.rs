//! The external block-fetcher collaborator consumed by `process_node`.

use crate::error::ClockError;
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};
use tessera_core::ContentId;

/// How a caller reaches outside the local store for a block it doesn't
/// have yet. Implementations typically wrap a peer-to-peer transport; the
/// clock only needs this much.
pub trait BlockFetcher: Send + Sync {
    /// Fetch the encoded bytes of `content_id`, respecting `deadline` if given.
    fn fetch(&self, content_id: ContentId, deadline: Option<Instant>) -> Result<Vec<u8>, ClockError>;
}

/// A fetcher with nothing to offer: every ancestor is treated as dangling.
/// Useful for single-replica tests and for `add_delta`, which never needs
/// to fetch (its parents are always already local).
pub struct NullFetcher;

impl BlockFetcher for NullFetcher {
    fn fetch(&self, _content_id: ContentId, _deadline: Option<Instant>) -> Result<Vec<u8>, ClockError> {
        Err(ClockError::DanglingParent)
    }
}

/// An in-memory fetcher backed by a map of known block bytes, standing in
/// for a peer in tests: seed it with another replica's blocks to simulate
/// a gap-repair fetch during `process_node`.
#[derive(Default)]
pub struct MapFetcher {
    blocks: RwLock<HashMap<ContentId, Vec<u8>>>,
}

impl MapFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, content_id: ContentId, bytes: Vec<u8>) {
        self.blocks.write().unwrap().insert(content_id, bytes);
    }
}

impl BlockFetcher for MapFetcher {
    fn fetch(&self, content_id: ContentId, deadline: Option<Instant>) -> Result<Vec<u8>, ClockError> {
        if let Some(deadline) = deadline {
            if Instant::now() > deadline {
                return Err(ClockError::Deadline);
            }
        }
        self.blocks
            .read()
            .unwrap()
            .get(&content_id)
            .cloned()
            .ok_or(ClockError::DanglingParent)
    }
}

/// A generous default for how far back `process_node` will chase parents
/// before giving up; resists unbounded recursion from adversarial inputs.
pub const DEFAULT_MAX_FETCH_DEPTH: u32 = 1024;

/// Convenience for tests that want a short, explicit deadline.
pub fn deadline_in(duration: Duration) -> Instant {
    Instant::now() + duration
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_core::Hasher;

    #[test]
    fn null_fetcher_always_reports_dangling() {
        let fetcher = NullFetcher;
        let result = fetcher.fetch(Hasher::hash(b"x"), None);
        assert!(matches!(result, Err(ClockError::DanglingParent)));
    }

    #[test]
    fn map_fetcher_returns_seeded_bytes() {
        let fetcher = MapFetcher::new();
        let cid = Hasher::hash(b"block-bytes");
        fetcher.seed(cid, b"block-bytes".to_vec());
        assert_eq!(fetcher.fetch(cid, None).unwrap(), b"block-bytes");
    }

    #[test]
    fn map_fetcher_reports_dangling_for_unseeded_block() {
        let fetcher = MapFetcher::new();
        assert!(matches!(
            fetcher.fetch(Hasher::hash(b"missing"), None),
            Err(ClockError::DanglingParent)
        ));
    }
}
