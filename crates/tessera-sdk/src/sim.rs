//! In-memory multi-replica sync simulator.
//!
//! Generalises the teacher's `DAGSyncer`/`SyncSimulator` pair to the
//! document dispatcher: rather than syncing a single DAG's heads, each
//! round pulls a replica's composite-DAG heads for one document and lets
//! `apply_remote_composite` chase whatever per-field blocks they link.

use std::collections::HashMap;
use std::sync::Arc;
use tessera_core::ContentId;
use tessera_db::{Dispatcher, Error, SchemaSource, COMPOSITE_FIELD};
use tessera_merkle::MapFetcher;
use tessera_store::namespace::{blocks_key, heads_prefix};
use tessera_store::{MemoryStore, Namespace};

/// Produces a fresh schema source for a new `Dispatcher` instance. The
/// simulator builds a new `Dispatcher` per call (dispatchers are cheap,
/// cloning the underlying `MemoryStore` just clones an `Arc`), so the
/// schema can't be handed in by value once and reused.
pub type SchemaFactory = Arc<dyn Fn() -> Box<dyn SchemaSource> + Send + Sync>;

struct Replica {
    store: MemoryStore,
}

/// Drives N in-memory replicas of the document dispatcher through pairwise
/// and full sync rounds, for exercising the convergence scenarios this
/// crate is tested against end to end.
pub struct ReplicaSimulator {
    replicas: Vec<Replica>,
    schema_factory: SchemaFactory,
}

impl ReplicaSimulator {
    pub fn new(replica_count: usize, schema_factory: SchemaFactory) -> Self {
        let replicas = (0..replica_count)
            .map(|_| Replica {
                store: MemoryStore::new(),
            })
            .collect();
        Self {
            replicas,
            schema_factory,
        }
    }

    pub fn replica_count(&self) -> usize {
        self.replicas.len()
    }

    pub fn store(&self, idx: usize) -> &MemoryStore {
        &self.replicas[idx].store
    }

    fn dispatcher_for(&self, idx: usize, fetcher: MapFetcher) -> Dispatcher {
        Dispatcher::new(self.replicas[idx].store.clone(), (self.schema_factory)(), fetcher)
    }

    /// Apply a local patch directly against one replica.
    pub fn update(
        &self,
        idx: usize,
        collection: &str,
        doc_key: &[u8],
        patch: &HashMap<String, serde_json::Value>,
    ) -> Result<ContentId, Error> {
        self.dispatcher_for(idx, MapFetcher::new()).update(collection, doc_key, patch)
    }

    /// Read materialised field values directly from one replica.
    pub fn get(
        &self,
        idx: usize,
        collection: &str,
        doc_key: &[u8],
        fields: &[String],
    ) -> Result<HashMap<String, serde_json::Value>, Error> {
        self.dispatcher_for(idx, MapFetcher::new()).get(collection, doc_key, fields)
    }

    /// Pull `from`'s current composite heads for one document into `to`,
    /// seeding a fetcher with every block `from` has so transitive
    /// per-field ancestors all resolve within this one round.
    pub fn sync_pair(&self, from: usize, to: usize, collection: &str, doc_key: &[u8]) -> Result<(), Error> {
        let from_store = &self.replicas[from].store;
        let prefix = heads_prefix(collection, doc_key, COMPOSITE_FIELD);
        let heads: Vec<ContentId> = from_store
            .range(Namespace::Heads, &prefix)?
            .into_iter()
            .filter_map(|(key, _)| ContentId::from_multihash_bytes(&key[prefix.len() + 1..]))
            .collect();
        if heads.is_empty() {
            return Ok(());
        }

        let fetcher = MapFetcher::new();
        let block_prefix = blocks_key(b"");
        for (key, bytes) in from_store.range(Namespace::Blocks, &block_prefix)? {
            if let Some(cid) = ContentId::from_multihash_bytes(&key[block_prefix.len()..]) {
                fetcher.seed(cid, bytes);
            }
        }

        let to_dispatcher = self.dispatcher_for(to, fetcher);
        for head in heads {
            let bytes = from_store.get(Namespace::Blocks, &blocks_key(&head.to_multihash_bytes()))?;
            to_dispatcher.apply_remote_composite(collection, doc_key, bytes, head, None)?;
        }
        Ok(())
    }

    /// Sync every ordered pair of replicas once.
    pub fn full_sync_round(&self, collection: &str, doc_key: &[u8]) -> Result<(), Error> {
        let n = self.replicas.len();
        for i in 0..n {
            for j in 0..n {
                if i != j {
                    self.sync_pair(i, j, collection, doc_key)?;
                }
            }
        }
        Ok(())
    }

    /// Whether every replica's materialised value for `fields` agrees.
    pub fn is_converged(&self, collection: &str, doc_key: &[u8], fields: &[String]) -> Result<bool, Error> {
        if self.replicas.len() < 2 {
            return Ok(true);
        }
        let reference = self.get(0, collection, doc_key, fields)?;
        for idx in 1..self.replicas.len() {
            if self.get(idx, collection, doc_key, fields)? != reference {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_crdt::CrdtKind;
    use tessera_db::{CollectionSchema, FieldSchema, StaticSchema};

    const COLLECTION: &str = "notes";

    fn schema_factory() -> SchemaFactory {
        Arc::new(|| {
            let collection = CollectionSchema {
                fields: vec![FieldSchema {
                    name: "body".to_string(),
                    kind: CrdtKind::LwwRegister,
                }],
            };
            Box::new(StaticSchema::new().with_collection(COLLECTION, collection))
        })
    }

    fn patch(value: &str) -> HashMap<String, serde_json::Value> {
        let mut p = HashMap::new();
        p.insert("body".to_string(), serde_json::Value::String(value.to_string()));
        p
    }

    #[test]
    fn two_replicas_converge_after_one_sync_pair() {
        let sim = ReplicaSimulator::new(2, schema_factory());
        sim.update(0, COLLECTION, b"doc1", &patch("hello")).unwrap();

        assert!(!sim.is_converged(COLLECTION, b"doc1", &["body".to_string()]).unwrap());

        sim.sync_pair(0, 1, COLLECTION, b"doc1").unwrap();
        assert!(sim.is_converged(COLLECTION, b"doc1", &["body".to_string()]).unwrap());
    }

    #[test]
    fn full_sync_round_converges_three_concurrent_writers() {
        let sim = ReplicaSimulator::new(3, schema_factory());
        sim.update(0, COLLECTION, b"doc1", &patch("a")).unwrap();
        sim.update(1, COLLECTION, b"doc1", &patch("b")).unwrap();
        sim.update(2, COLLECTION, b"doc1", &patch("c")).unwrap();

        assert!(!sim.is_converged(COLLECTION, b"doc1", &["body".to_string()]).unwrap());
        sim.full_sync_round(COLLECTION, b"doc1").unwrap();
        assert!(sim.is_converged(COLLECTION, b"doc1", &["body".to_string()]).unwrap());
    }

    #[test]
    fn a_replica_with_nothing_to_sync_is_a_no_op() {
        let sim = ReplicaSimulator::new(2, schema_factory());
        sim.sync_pair(0, 1, COLLECTION, b"doc1").unwrap();
        assert!(sim.is_converged(COLLECTION, b"doc1", &["body".to_string()]).unwrap());
    }
}
