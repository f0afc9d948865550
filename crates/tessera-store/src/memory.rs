//! In-memory implementation of the [`Store`] contract.
//!
//! A single [`parking_lot::RwLock`] guards all four keyspaces: the store is
//! deliberately the one serialisation point in the system, so batch commits
//! are single-writer and range scans see a consistent snapshot for the
//! duration of iteration.

use crate::error::StoreError;
use crate::namespace::Namespace;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

#[derive(Clone)]
struct Versioned {
    bytes: Vec<u8>,
    version: u64,
}

#[derive(Default)]
struct Keyspace {
    entries: BTreeMap<Vec<u8>, Versioned>,
}

impl Keyspace {
    fn get(&self, key: &[u8]) -> Option<&Versioned> {
        self.entries.get(key)
    }

    fn range(&self, prefix: &[u8]) -> Vec<(Vec<u8>, Vec<u8>)> {
        self.entries
            .range(prefix.to_vec()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.bytes.clone()))
            .collect()
    }
}

#[derive(Default)]
struct StoreState {
    data: Keyspace,
    heads: Keyspace,
    blocks: Keyspace,
    system: Keyspace,
}

impl StoreState {
    fn keyspace(&self, ns: Namespace) -> &Keyspace {
        match ns {
            Namespace::Data => &self.data,
            Namespace::Heads => &self.heads,
            Namespace::Blocks => &self.blocks,
            Namespace::System => &self.system,
        }
    }

    fn keyspace_mut(&mut self, ns: Namespace) -> &mut Keyspace {
        match ns {
            Namespace::Data => &mut self.data,
            Namespace::Heads => &mut self.heads,
            Namespace::Blocks => &mut self.blocks,
            Namespace::System => &mut self.system,
        }
    }
}

/// A transactional, atomic-batch handle over a [`MemoryStore`].
///
/// Reads are read-your-writes: a key written earlier in the same
/// transaction is visible to a later `get`/`range` in that transaction
/// before it is ever visible to anyone else. Commit is optimistic: if any
/// key this transaction read has been modified by another writer since,
/// commit fails with [`StoreError::Conflict`] and none of this
/// transaction's writes take effect.
pub struct Txn {
    inner: Arc<RwLock<StoreState>>,
    read_versions: HashMap<(Namespace, Vec<u8>), Option<u64>>,
    writes: HashMap<(Namespace, Vec<u8>), Option<Vec<u8>>>,
    closed: bool,
}

impl Txn {
    fn new(inner: Arc<RwLock<StoreState>>) -> Self {
        Txn {
            inner,
            read_versions: HashMap::new(),
            writes: HashMap::new(),
            closed: false,
        }
    }

    pub fn get(&mut self, ns: Namespace, key: &[u8]) -> Result<Vec<u8>, StoreError> {
        self.check_open()?;
        if let Some(write) = self.writes.get(&(ns, key.to_vec())) {
            return write.clone().ok_or(StoreError::NotFound);
        }
        let guard = self.inner.read();
        let found = guard.keyspace(ns).get(key).cloned();
        self.read_versions
            .entry((ns, key.to_vec()))
            .or_insert_with(|| found.as_ref().map(|v| v.version));
        found.map(|v| v.bytes).ok_or(StoreError::NotFound)
    }

    pub fn range(&mut self, ns: Namespace, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StoreError> {
        self.check_open()?;
        let guard = self.inner.read();
        let mut merged: BTreeMap<Vec<u8>, Option<Vec<u8>>> = guard
            .keyspace(ns)
            .range(prefix)
            .into_iter()
            .map(|(k, v)| (k, Some(v)))
            .collect();
        for ((write_ns, key), value) in &self.writes {
            if *write_ns == ns && key.starts_with(prefix) {
                merged.insert(key.clone(), value.clone());
            }
        }
        Ok(merged
            .into_iter()
            .filter_map(|(k, v)| v.map(|bytes| (k, bytes)))
            .collect())
    }

    pub fn put(&mut self, ns: Namespace, key: &[u8], value: Vec<u8>) -> Result<(), StoreError> {
        self.check_open()?;
        self.writes.insert((ns, key.to_vec()), Some(value));
        Ok(())
    }

    pub fn delete(&mut self, ns: Namespace, key: &[u8]) -> Result<(), StoreError> {
        self.check_open()?;
        self.writes.insert((ns, key.to_vec()), None);
        Ok(())
    }

    /// Commit all writes atomically, failing with [`StoreError::Conflict`]
    /// if any key this transaction read has changed since.
    pub fn commit(mut self) -> Result<(), StoreError> {
        self.check_open()?;
        self.closed = true;

        let mut guard = self.inner.write();
        for ((ns, key), expected_version) in &self.read_versions {
            let actual_version = guard.keyspace(*ns).get(key).map(|v| v.version);
            if actual_version != *expected_version {
                return Err(StoreError::Conflict);
            }
        }

        for ((ns, key), value) in self.writes.drain() {
            let keyspace = guard.keyspace_mut(ns);
            match value {
                Some(bytes) => {
                    let version = keyspace.get(&key).map(|v| v.version + 1).unwrap_or(1);
                    keyspace.entries.insert(key, Versioned { bytes, version });
                }
                None => {
                    keyspace.entries.remove(&key);
                }
            }
        }
        Ok(())
    }

    /// Discard all staged writes without applying them.
    pub fn discard(mut self) {
        self.closed = true;
        self.writes.clear();
    }

    fn check_open(&self) -> Result<(), StoreError> {
        if self.closed {
            Err(StoreError::TxnClosed)
        } else {
            Ok(())
        }
    }
}

/// In-memory, thread-safe implementation of the four-keyspace store.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<StoreState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, ns: Namespace, key: &[u8]) -> Result<Vec<u8>, StoreError> {
        self.inner
            .read()
            .keyspace(ns)
            .get(key)
            .map(|v| v.bytes.clone())
            .ok_or(StoreError::NotFound)
    }

    pub fn range(&self, ns: Namespace, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StoreError> {
        Ok(self.inner.read().keyspace(ns).range(prefix))
    }

    /// Open a new transaction (also serves as an atomic batch: commit writes
    /// without ever reading and it behaves as a plain all-or-nothing batch).
    pub fn begin(&self) -> Txn {
        Txn::new(Arc::clone(&self.inner))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_then_get_roundtrips() {
        let store = MemoryStore::new();
        let mut txn = store.begin();
        txn.put(Namespace::Data, b"k1", b"v1".to_vec()).unwrap();
        txn.commit().unwrap();
        assert_eq!(store.get(Namespace::Data, b"k1").unwrap(), b"v1");
    }

    #[test]
    fn get_missing_key_is_not_found() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.get(Namespace::Data, b"missing"),
            Err(StoreError::NotFound)
        ));
    }

    #[test]
    fn read_your_writes_within_a_txn() {
        let store = MemoryStore::new();
        let mut txn = store.begin();
        txn.put(Namespace::Heads, b"h1", b"v1".to_vec()).unwrap();
        assert_eq!(txn.get(Namespace::Heads, b"h1").unwrap(), b"v1");
        txn.discard();
    }

    #[test]
    fn discard_does_not_persist_writes() {
        let store = MemoryStore::new();
        let mut txn = store.begin();
        txn.put(Namespace::Data, b"k1", b"v1".to_vec()).unwrap();
        txn.discard();
        assert!(matches!(
            store.get(Namespace::Data, b"k1"),
            Err(StoreError::NotFound)
        ));
    }

    #[test]
    fn concurrent_writer_causes_conflict() {
        let store = MemoryStore::new();
        let mut txn = store.begin();
        txn.put(Namespace::Data, b"k1", b"v0".to_vec()).unwrap();
        txn.commit().unwrap();

        let mut txn_a = store.begin();
        let _ = txn_a.get(Namespace::Data, b"k1").unwrap();

        let mut txn_b = store.begin();
        txn_b.put(Namespace::Data, b"k1", b"v2".to_vec()).unwrap();
        txn_b.commit().unwrap();

        txn_a.put(Namespace::Data, b"k1", b"v1".to_vec()).unwrap();
        assert!(matches!(txn_a.commit(), Err(StoreError::Conflict)));
        assert_eq!(store.get(Namespace::Data, b"k1").unwrap(), b"v2");
    }

    #[test]
    fn range_scan_respects_prefix_and_pending_writes() {
        let store = MemoryStore::new();
        let mut txn = store.begin();
        txn.put(Namespace::Data, b"/data/a", b"1".to_vec()).unwrap();
        txn.put(Namespace::Data, b"/data/b", b"2".to_vec()).unwrap();
        txn.put(Namespace::Data, b"/other/c", b"3".to_vec()).unwrap();
        let seen = txn.range(Namespace::Data, b"/data/").unwrap();
        assert_eq!(seen.len(), 2);
        txn.commit().unwrap();
    }

    #[test]
    fn atomic_commit_is_all_or_nothing_on_conflict() {
        let store = MemoryStore::new();
        let mut seed = store.begin();
        seed.put(Namespace::Data, b"k1", b"v0".to_vec()).unwrap();
        seed.commit().unwrap();

        let mut reader = store.begin();
        reader.get(Namespace::Data, b"k1").unwrap();

        let mut other = store.begin();
        other.put(Namespace::Data, b"k1", b"v-other".to_vec()).unwrap();
        other.commit().unwrap();

        reader.put(Namespace::Data, b"k1", b"v-reader".to_vec()).unwrap();
        reader.put(Namespace::Data, b"k2", b"new".to_vec()).unwrap();
        assert!(matches!(reader.commit(), Err(StoreError::Conflict)));
        assert!(matches!(
            store.get(Namespace::Data, b"k2"),
            Err(StoreError::NotFound)
        ));
    }
}
