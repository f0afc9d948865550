//! High-level client facade over a document dispatcher.

use crate::config::StoreConfig;
use crate::error::SdkError;
use std::collections::HashMap;
use std::time::Instant;
use tessera_core::ContentId;
use tessera_db::{
    list_replicators, register_replicator, remove_replicator, Dispatcher, ReplicationSink,
    ReplicatorInfo, SchemaSource,
};
use tessera_merkle::{BlockFetcher, NullFetcher};
use tessera_store::MemoryStore;

/// A single-process handle onto a Tessera store: owns the in-memory store,
/// the document dispatcher, and the replica's configuration.
///
/// # Example
///
/// ```rust
/// use std::collections::HashMap;
/// use tessera_crdt::CrdtKind;
/// use tessera_db::{CollectionSchema, FieldSchema, StaticSchema};
/// use tessera_sdk::{StoreConfig, TesseraClient};
///
/// let schema = StaticSchema::new().with_collection(
///     "notes",
///     CollectionSchema {
///         fields: vec![FieldSchema { name: "body".to_string(), kind: CrdtKind::LwwRegister }],
///     },
/// );
/// let client = TesseraClient::new(StoreConfig::default(), schema);
///
/// let mut patch = HashMap::new();
/// patch.insert("body".to_string(), serde_json::Value::String("hello".to_string()));
/// client.update("notes", b"doc1", &patch).unwrap();
///
/// let values = client.get("notes", b"doc1", &["body".to_string()]).unwrap();
/// assert_eq!(values["body"], serde_json::Value::String("hello".to_string()));
/// ```
pub struct TesseraClient {
    config: StoreConfig,
    dispatcher: Dispatcher,
}

impl TesseraClient {
    /// Create a client over a fresh, empty in-memory store with no block
    /// fetcher (every dangling ancestor is treated as unreachable — fine
    /// for a client that only ever originates local writes).
    pub fn new(config: StoreConfig, schema: impl SchemaSource + 'static) -> Self {
        Self::with_store(config, schema, MemoryStore::new(), NullFetcher)
    }

    /// Create a client over an existing store and fetcher, for a replica
    /// that also needs to apply remote blocks.
    pub fn with_store(
        config: StoreConfig,
        schema: impl SchemaSource + 'static,
        store: MemoryStore,
        fetcher: impl BlockFetcher + 'static,
    ) -> Self {
        tracing::debug!(replica_id = %config.replica_id, "constructing tessera client");
        Self {
            dispatcher: Dispatcher::new(store, schema, fetcher),
            config,
        }
    }

    pub fn replica_id(&self) -> &str {
        &self.config.replica_id
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn store(&self) -> &MemoryStore {
        self.dispatcher.store()
    }

    /// Register a collaborator to be notified of every committed block, for
    /// wiring up a replication transport.
    pub fn register_sink(&self, sink: impl ReplicationSink + 'static) {
        self.dispatcher.register_sink(sink);
    }

    #[tracing::instrument(skip(self, patch), fields(replica = %self.config.replica_id, collection))]
    pub fn update(
        &self,
        collection: &str,
        doc_key: &[u8],
        patch: &HashMap<String, serde_json::Value>,
    ) -> Result<ContentId, SdkError> {
        let cid = self.dispatcher.update(collection, doc_key, patch)?;
        tracing::debug!(%cid, "update committed");
        Ok(cid)
    }

    #[tracing::instrument(skip(self, fields), fields(replica = %self.config.replica_id, collection))]
    pub fn get(
        &self,
        collection: &str,
        doc_key: &[u8],
        fields: &[String],
    ) -> Result<HashMap<String, serde_json::Value>, SdkError> {
        Ok(self.dispatcher.get(collection, doc_key, fields)?)
    }

    #[tracing::instrument(skip(self, bytes), fields(replica = %self.config.replica_id, collection, %claimed))]
    pub fn apply_remote_composite(
        &self,
        collection: &str,
        doc_key: &[u8],
        bytes: Vec<u8>,
        claimed: ContentId,
        deadline: Option<Instant>,
    ) -> Result<(), SdkError> {
        self.dispatcher.apply_remote_composite(collection, doc_key, bytes, claimed, deadline)?;
        tracing::debug!("remote composite applied");
        Ok(())
    }

    pub fn register_replicator(&self, info: &ReplicatorInfo) -> Result<(), SdkError> {
        Ok(register_replicator(self.store(), info)?)
    }

    pub fn remove_replicator(&self, peer_id: &str) -> Result<(), SdkError> {
        Ok(remove_replicator(self.store(), peer_id)?)
    }

    pub fn list_replicators(&self) -> Result<Vec<ReplicatorInfo>, SdkError> {
        Ok(list_replicators(self.store())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_crdt::CrdtKind;
    use tessera_db::{CollectionSchema, FieldSchema, StaticSchema};

    fn schema() -> StaticSchema {
        let collection = CollectionSchema {
            fields: vec![FieldSchema {
                name: "title".to_string(),
                kind: CrdtKind::LwwRegister,
            }],
        };
        StaticSchema::new().with_collection("posts", collection)
    }

    fn patch(value: &str) -> HashMap<String, serde_json::Value> {
        let mut p = HashMap::new();
        p.insert("title".to_string(), serde_json::Value::String(value.to_string()));
        p
    }

    #[test]
    fn update_then_get_round_trips() {
        let client = TesseraClient::new(StoreConfig::default(), schema());
        client.update("posts", b"doc1", &patch("Hello")).unwrap();
        let values = client.get("posts", b"doc1", &["title".to_string()]).unwrap();
        assert_eq!(values["title"], serde_json::Value::String("Hello".to_string()));
    }

    #[test]
    fn unknown_collection_reports_schema_mismatch() {
        let client = TesseraClient::new(StoreConfig::default(), schema());
        let result = client.update("unknown", b"doc1", &patch("x"));
        assert!(matches!(result, Err(SdkError::Store(tessera_db::Error::SchemaMismatch { .. }))));
    }

    #[test]
    fn replicator_registrations_round_trip() {
        let client = TesseraClient::new(StoreConfig::default(), schema());
        let info = ReplicatorInfo {
            peer_id: "peer-1".to_string(),
            collections: vec!["posts".to_string()],
        };
        client.register_replicator(&info).unwrap();
        assert_eq!(client.list_replicators().unwrap(), vec![info]);
        client.remove_replicator("peer-1").unwrap();
        assert!(client.list_replicators().unwrap().is_empty());
    }
}
