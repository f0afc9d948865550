//! The storage contract `MemoryStore` satisfies.
//!
//! A persistent backend plugs in by implementing [`Store`] (and
//! [`StoreTxn`] for its transaction handle) the same way `MemoryStore`
//! does; nothing above this crate depends on the in-memory implementation
//! being the only one.

use crate::error::StoreError;
use crate::namespace::Namespace;

/// An open transaction (or atomic batch, if never read from) over a
/// [`Store`]. Reads are read-your-writes; commit is optimistic and fails
/// with [`StoreError::Conflict`] if a key this transaction read has
/// changed since.
pub trait StoreTxn {
    fn get(&mut self, ns: Namespace, key: &[u8]) -> Result<Vec<u8>, StoreError>;
    fn range(&mut self, ns: Namespace, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StoreError>;
    fn put(&mut self, ns: Namespace, key: &[u8], value: Vec<u8>) -> Result<(), StoreError>;
    fn delete(&mut self, ns: Namespace, key: &[u8]) -> Result<(), StoreError>;
    fn commit(self) -> Result<(), StoreError>
    where
        Self: Sized;
    fn discard(self)
    where
        Self: Sized;
}

/// The four-keyspace, transactional key-value contract the rest of the
/// workspace is built against. `MemoryStore` is the one reference
/// implementation shipped here; it is not a storage engine, just an
/// interface plus an in-memory backing.
pub trait Store {
    type Txn: StoreTxn;

    fn get(&self, ns: Namespace, key: &[u8]) -> Result<Vec<u8>, StoreError>;
    fn range(&self, ns: Namespace, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StoreError>;
    fn begin(&self) -> Self::Txn;
}

impl StoreTxn for crate::memory::Txn {
    fn get(&mut self, ns: Namespace, key: &[u8]) -> Result<Vec<u8>, StoreError> {
        self.get(ns, key)
    }

    fn range(&mut self, ns: Namespace, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StoreError> {
        self.range(ns, prefix)
    }

    fn put(&mut self, ns: Namespace, key: &[u8], value: Vec<u8>) -> Result<(), StoreError> {
        self.put(ns, key, value)
    }

    fn delete(&mut self, ns: Namespace, key: &[u8]) -> Result<(), StoreError> {
        self.delete(ns, key)
    }

    fn commit(self) -> Result<(), StoreError> {
        self.commit()
    }

    fn discard(self) {
        self.discard()
    }
}

impl Store for crate::memory::MemoryStore {
    type Txn = crate::memory::Txn;

    fn get(&self, ns: Namespace, key: &[u8]) -> Result<Vec<u8>, StoreError> {
        self.get(ns, key)
    }

    fn range(&self, ns: Namespace, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StoreError> {
        self.range(ns, prefix)
    }

    fn begin(&self) -> Self::Txn {
        self.begin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;

    fn exercise<S: Store>(store: &S) {
        let mut txn = store.begin();
        txn.put(Namespace::Data, b"k1", b"v1".to_vec()).unwrap();
        txn.commit().unwrap();
        assert_eq!(store.get(Namespace::Data, b"k1").unwrap(), b"v1");
    }

    #[test]
    fn memory_store_satisfies_the_store_contract() {
        let store = MemoryStore::new();
        exercise(&store);
    }
}
