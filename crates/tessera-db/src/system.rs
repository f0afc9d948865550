//! Replicator metadata in the System keyspace.
//!
//! Not part of the Merkle-CRDT composition core itself, but tracked
//! alongside collection schemas: the set of peers a collection is
//! configured to replicate to, so an external replication transport has
//! somewhere durable to read its configuration from.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use tessera_store::namespace::{system_key, system_prefix};
use tessera_store::{MemoryStore, Namespace};

const REPLICATOR_CATEGORY: &str = "replicator";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplicatorInfo {
    pub peer_id: String,
    pub collections: Vec<String>,
}

/// Register (or replace) a replicator's collection subscription list.
pub fn register_replicator(store: &MemoryStore, info: &ReplicatorInfo) -> Result<(), Error> {
    let mut txn = store.begin();
    let key = system_key(REPLICATOR_CATEGORY, &info.peer_id);
    let bytes = tessera_codec::to_canonical_bytes(info)?;
    txn.put(Namespace::System, &key, bytes)?;
    txn.commit()?;
    Ok(())
}

/// Remove a replicator's registration entirely.
pub fn remove_replicator(store: &MemoryStore, peer_id: &str) -> Result<(), Error> {
    let mut txn = store.begin();
    let key = system_key(REPLICATOR_CATEGORY, peer_id);
    txn.delete(Namespace::System, &key)?;
    txn.commit()?;
    Ok(())
}

/// List every registered replicator.
pub fn list_replicators(store: &MemoryStore) -> Result<Vec<ReplicatorInfo>, Error> {
    let prefix = system_prefix(REPLICATOR_CATEGORY);
    let entries = store.range(Namespace::System, &prefix)?;
    entries
        .into_iter()
        .map(|(_, bytes)| tessera_codec::from_canonical_bytes(&bytes).map_err(Error::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_then_list_round_trips() {
        let store = MemoryStore::new();
        let info = ReplicatorInfo {
            peer_id: "peer-1".to_string(),
            collections: vec!["posts".to_string()],
        };
        register_replicator(&store, &info).unwrap();
        let listed = list_replicators(&store).unwrap();
        assert_eq!(listed, vec![info]);
    }

    #[test]
    fn remove_drops_the_registration() {
        let store = MemoryStore::new();
        let info = ReplicatorInfo {
            peer_id: "peer-1".to_string(),
            collections: vec!["posts".to_string()],
        };
        register_replicator(&store, &info).unwrap();
        remove_replicator(&store, "peer-1").unwrap();
        assert!(list_replicators(&store).unwrap().is_empty());
    }
}
