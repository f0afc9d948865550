//! The document dispatcher: translates document-level mutations into
//! per-field register calls plus one composite-DAG node tying them
//! together, all under one store transaction.

use crate::error::Error;
use crate::replication::{PersistedEvent, ReplicationBroadcaster, ReplicationSink};
use crate::schema::SchemaSource;
use std::collections::HashMap;
use std::time::Instant;
use tessera_core::ContentId;
use tessera_crdt::{decode_composite_body, encode_composite_input, CompositeRegister, CrdtRegistry};
use tessera_merkle::{BlockFetcher, MerkleClock, DEFAULT_MAX_FETCH_DEPTH};
use tessera_store::{namespace::data_key, with_conflict_retry, MemoryStore, Namespace};

/// The field name under which a document's composite DAG head lives. Not
/// a real schema field: it never appears in `CollectionSchema::fields`.
pub const COMPOSITE_FIELD: &str = "_composite";

const COMMIT_RETRY_BUDGET: u32 = 8;

/// Routes document patches to per-field CRDT registers and the composite
/// register, and applies remote composite nodes by transitively pulling in
/// whatever per-field blocks they link.
pub struct Dispatcher {
    store: MemoryStore,
    registry: CrdtRegistry,
    schema: Box<dyn SchemaSource>,
    fetcher: Box<dyn BlockFetcher>,
    max_fetch_depth: u32,
    replication: ReplicationBroadcaster,
}

impl Dispatcher {
    pub fn new(store: MemoryStore, schema: impl SchemaSource + 'static, fetcher: impl BlockFetcher + 'static) -> Self {
        Self {
            store,
            registry: CrdtRegistry::with_defaults(),
            schema: Box::new(schema),
            fetcher: Box::new(fetcher),
            max_fetch_depth: DEFAULT_MAX_FETCH_DEPTH,
            replication: ReplicationBroadcaster::new(),
        }
    }

    pub fn store(&self) -> &MemoryStore {
        &self.store
    }

    pub fn register_sink(&self, sink: impl ReplicationSink + 'static) {
        self.replication.register(Box::new(sink));
    }

    /// Apply a local document patch: each touched field advances its own
    /// clock, then one composite block links every field's new head.
    /// Either every field and the composite advance, or (on a conflict
    /// that exhausts the retry budget, or a schema mismatch) none do.
    pub fn update(
        &self,
        collection: &str,
        doc_key: &[u8],
        patch: &HashMap<String, serde_json::Value>,
    ) -> Result<ContentId, Error> {
        let schema = self
            .schema
            .get_collection(collection)
            .ok_or_else(|| Error::SchemaMismatch {
                collection: collection.to_string(),
                field: "<collection>".to_string(),
            })?;

        with_conflict_retry(COMMIT_RETRY_BUDGET, || {
            let mut txn = self.store.begin();
            let mut links = Vec::new();

            let mut field_names: Vec<&String> = patch.keys().collect();
            field_names.sort();

            for field_name in field_names {
                let value = &patch[field_name];
                let field_schema = schema.field(field_name).ok_or_else(|| Error::SchemaMismatch {
                    collection: collection.to_string(),
                    field: field_name.clone(),
                })?;
                let mut register = self.registry.instantiate(field_schema.kind).ok_or_else(|| {
                    Error::SchemaMismatch {
                        collection: collection.to_string(),
                        field: field_name.clone(),
                    }
                })?;

                let clock = MerkleClock::new(collection, doc_key.to_vec(), field_name.clone());
                clock.replay(&mut txn, register.as_mut())?;

                let input = tessera_codec::to_canonical_bytes(value)?;
                let delta = register.set(&input)?;
                let cid = clock.add_delta(&mut txn, register.as_mut(), delta)?;
                links.push((field_name.clone(), cid));
            }

            let patch_bytes = tessera_codec::to_canonical_bytes(patch)?;
            let composite_input = encode_composite_input(&patch_bytes, &links)?;
            let composite_clock = MerkleClock::new(collection, doc_key.to_vec(), COMPOSITE_FIELD);
            let mut composite_register = CompositeRegister::new();
            let composite_delta = composite_register.set(&composite_input)?;
            let composite_cid = composite_clock.add_delta(&mut txn, &mut composite_register, composite_delta)?;

            txn.commit()?;

            for (field_name, cid) in &links {
                self.replication.announce(PersistedEvent {
                    collection: collection.to_string(),
                    doc_key: doc_key.to_vec(),
                    field: field_name.clone(),
                    content_id: *cid,
                });
            }
            self.replication.announce(PersistedEvent {
                collection: collection.to_string(),
                doc_key: doc_key.to_vec(),
                field: COMPOSITE_FIELD.to_string(),
                content_id: composite_cid,
            });

            Ok(composite_cid)
        })
    }

    /// Read materialised field values directly; no DAG traversal.
    pub fn get(&self, collection: &str, doc_key: &[u8], fields: &[String]) -> Result<HashMap<String, serde_json::Value>, Error> {
        let mut txn = self.store.begin();
        let mut out = HashMap::new();
        for field in fields {
            let key = data_key(collection, doc_key, field);
            match txn.get(Namespace::Data, &key) {
                Ok(bytes) => {
                    let value: serde_json::Value = tessera_codec::from_canonical_bytes(&bytes)?;
                    out.insert(field.clone(), value);
                }
                Err(tessera_store::StoreError::NotFound) => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(out)
    }

    /// Apply a remotely-received composite block: its own DAG is applied
    /// first, then every per-field link it attests (and, transitively,
    /// theirs) is chased through the block fetcher and folded into that
    /// field's register.
    pub fn apply_remote_composite(
        &self,
        collection: &str,
        doc_key: &[u8],
        bytes: Vec<u8>,
        claimed: ContentId,
        deadline: Option<Instant>,
    ) -> Result<(), Error> {
        let schema = self
            .schema
            .get_collection(collection)
            .ok_or_else(|| Error::SchemaMismatch {
                collection: collection.to_string(),
                field: "<collection>".to_string(),
            })?;

        with_conflict_retry(COMMIT_RETRY_BUDGET, || {
            let mut txn = self.store.begin();
            let composite_clock = MerkleClock::new(collection, doc_key.to_vec(), COMPOSITE_FIELD);
            let mut composite_register = CompositeRegister::new();

            let applied = composite_clock.process_node(
                &mut txn,
                &mut composite_register,
                self.fetcher.as_ref(),
                bytes.clone(),
                claimed,
                self.max_fetch_depth,
                deadline,
            )?;

            let mut persisted = Vec::new();
            for (cid, _) in &applied {
                persisted.push((COMPOSITE_FIELD.to_string(), *cid));
            }

            for (_cid, block) in &applied {
                let delta = tessera_crdt::Delta {
                    priority: block.priority,
                    body: block.delta.clone(),
                };
                let body = decode_composite_body(&delta)?;
                for (field_name, field_cid) in body.links {
                    let field_schema = schema.field(&field_name).ok_or_else(|| Error::SchemaMismatch {
                        collection: collection.to_string(),
                        field: field_name.clone(),
                    })?;
                    let mut register = self.registry.instantiate(field_schema.kind).ok_or_else(|| {
                        Error::SchemaMismatch {
                            collection: collection.to_string(),
                            field: field_name.clone(),
                        }
                    })?;
                    let field_clock = MerkleClock::new(collection, doc_key.to_vec(), field_name.clone());
                    field_clock.replay(&mut txn, register.as_mut())?;
                    let field_applied = field_clock.process_remote(
                        &mut txn,
                        register.as_mut(),
                        self.fetcher.as_ref(),
                        field_cid,
                        self.max_fetch_depth,
                        deadline,
                    )?;
                    for (cid, _) in field_applied {
                        persisted.push((field_name.clone(), cid));
                    }
                }
            }

            txn.commit()?;

            for (field_name, cid) in persisted {
                self.replication.announce(PersistedEvent {
                    collection: collection.to_string(),
                    doc_key: doc_key.to_vec(),
                    field: field_name,
                    content_id: cid,
                });
            }

            Ok(())
        })
    }
}
