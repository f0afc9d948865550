//! Document dispatcher: routes document patches to per-field CRDT
//! registers and one composite-DAG node, under collection schemas
//! supplied by an external collaborator.

pub mod dispatcher;
pub mod error;
pub mod replication;
pub mod schema;
pub mod system;

pub use dispatcher::{Dispatcher, COMPOSITE_FIELD};
pub use error::Error;
pub use replication::{PersistedEvent, RecordingSink, ReplicationBroadcaster, ReplicationSink};
pub use schema::{CollectionSchema, FieldSchema, SchemaSource, StaticSchema};
pub use system::{list_replicators, register_replicator, remove_replicator, ReplicatorInfo};
