//! Merkle clock: content-addressed blocks, head tracking, and causal
//! local/remote apply for one field's DAG.
//!
//! ```
//! use tessera_crdt::{LwwRegister, Register};
//! use tessera_merkle::MerkleClock;
//! use tessera_store::MemoryStore;
//!
//! let store = MemoryStore::new();
//! let clock = MerkleClock::new("posts", b"doc1".to_vec(), "title");
//! let mut register = LwwRegister::new();
//!
//! let mut txn = store.begin();
//! let delta = register.set(b"hello").unwrap();
//! let cid = clock.add_delta(&mut txn, &mut register, delta).unwrap();
//! txn.commit().unwrap();
//! ```

pub mod block;
pub mod clock;
pub mod error;
pub mod fetcher;

pub use block::Block;
pub use clock::MerkleClock;
pub use error::ClockError;
pub use fetcher::{BlockFetcher, MapFetcher, NullFetcher, DEFAULT_MAX_FETCH_DEPTH};
