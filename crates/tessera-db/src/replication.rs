//! The replication collaborator a dispatcher produces events for.
//!
//! When a batch commits, every newly-persisted ContentID is announced to
//! each registered sink so an external replicator can push it onward.
//! Delivery is at-least-once: a sink may see the same ContentID again
//! after a retry or a restart, and must treat that as a no-op, exactly
//! like `ProcessNode` already does on the receiving end.

use parking_lot::RwLock;
use tessera_core::ContentId;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PersistedEvent {
    pub collection: String,
    pub doc_key: Vec<u8>,
    pub field: String,
    pub content_id: ContentId,
}

pub trait ReplicationSink: Send + Sync {
    fn on_persisted(&self, event: &PersistedEvent);
}

/// A sink that records every event it sees, for tests and for embedding
/// contexts that want to drain events on their own schedule rather than
/// react to each one immediately.
#[derive(Default)]
pub struct RecordingSink {
    events: RwLock<Vec<PersistedEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drain(&self) -> Vec<PersistedEvent> {
        std::mem::take(&mut self.events.write())
    }

    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }
}

impl ReplicationSink for RecordingSink {
    fn on_persisted(&self, event: &PersistedEvent) {
        self.events.write().push(event.clone());
    }
}

/// Fans a persisted event out to every registered sink. Registration is
/// expected at startup; broadcast is lock-free against other broadcasts
/// beyond the read lock over the registered list.
#[derive(Default)]
pub struct ReplicationBroadcaster {
    sinks: RwLock<Vec<Box<dyn ReplicationSink>>>,
}

impl ReplicationBroadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, sink: Box<dyn ReplicationSink>) {
        self.sinks.write().push(sink);
    }

    pub fn announce(&self, event: PersistedEvent) {
        for sink in self.sinks.read().iter() {
            sink.on_persisted(&event);
        }
    }
}
