//! Transactional, atomic-batch key-value store behind the four logical
//! keyspaces of the Tessera Merkle-CRDT database: Data, Heads, Blocks and
//! System.

pub mod error;
pub mod memory;
pub mod namespace;
pub mod retry;
pub mod store;

pub use error::StoreError;
pub use memory::{MemoryStore, Txn};
pub use namespace::Namespace;
pub use retry::{with_conflict_retry, IsConflict};
pub use store::{Store, StoreTxn};
