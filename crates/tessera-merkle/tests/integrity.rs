//! Clock-level integrity scenarios: malformed or adversarial blocks must
//! be rejected without perturbing the local store.

use tessera_core::ContentId;
use tessera_crdt::{LwwRegister, Register};
use tessera_merkle::{Block, ClockError, MapFetcher, MerkleClock, NullFetcher};
use tessera_store::{namespace::blocks_key, MemoryStore, Namespace};

fn clock() -> MerkleClock {
    MerkleClock::new("people", b"doc1".to_vec(), "name")
}

/// A block claiming a parent nobody can supply is rejected with
/// `DanglingParent`, and the local store is left exactly as it was.
#[test]
fn dangling_parent_is_rejected_and_store_is_unchanged() {
    let store = MemoryStore::new();
    let clock = clock();
    let mut register = LwwRegister::new();

    let orphan_parent = ContentId::from_digest([3u8; 32]);
    let orphan = Block::new(b"delta".to_vec(), 1, [orphan_parent]);
    let bytes = orphan.encode().unwrap();
    let cid = orphan.content_id().unwrap();

    let mut txn = store.begin();
    let result = clock.process_node(&mut txn, &mut register, &NullFetcher, bytes, cid, 16, None);
    assert!(matches!(result, Err(ClockError::DanglingParent)));
    txn.discard();

    assert!(store.range(Namespace::Blocks, &blocks_key(b"")).unwrap().is_empty());
    let mut txn = store.begin();
    assert!(clock.heads(&mut txn).unwrap().is_empty());
}

/// Block bytes mutated after hashing fail verification rather than being
/// silently accepted under the stale claimed id.
#[test]
fn mutated_bytes_fail_hash_verification() {
    let store = MemoryStore::new();
    let clock = clock();
    let mut register = LwwRegister::new();

    let mut txn = store.begin();
    let delta = register.set(b"hello").unwrap();
    let cid = clock.add_delta(&mut txn, &mut register, delta).unwrap();
    txn.commit().unwrap();

    let mut tampered = store.get(Namespace::Blocks, &blocks_key(&cid.to_multihash_bytes())).unwrap();
    tampered.push(0xff);

    let fresh_store = MemoryStore::new();
    let fresh_clock = clock();
    let mut fresh_register = LwwRegister::new();
    let mut txn = fresh_store.begin();
    let result = fresh_clock.process_node(&mut txn, &mut fresh_register, &NullFetcher, tampered, cid, 16, None);
    assert!(matches!(result, Err(ClockError::HashMismatch)));
}

/// An ancestor chain longer than the caller's depth budget is rejected
/// rather than walked indefinitely.
#[test]
fn ancestor_chain_beyond_max_depth_is_rejected() {
    let remote_store = MemoryStore::new();
    let remote_clock = clock();
    let mut remote_register = LwwRegister::new();

    let mut last_cid = None;
    for i in 0..10u8 {
        let mut txn = remote_store.begin();
        let delta = remote_register.set(&[i]).unwrap();
        last_cid = Some(remote_clock.add_delta(&mut txn, &mut remote_register, delta).unwrap());
        txn.commit().unwrap();
    }
    let tip = last_cid.unwrap();

    let fetcher = MapFetcher::new();
    let prefix = blocks_key(b"");
    for (key, bytes) in remote_store.range(Namespace::Blocks, &prefix).unwrap() {
        if let Some(cid) = ContentId::from_multihash_bytes(&key[prefix.len()..]) {
            fetcher.seed(cid, bytes);
        }
    }

    let local_store = MemoryStore::new();
    let local_clock = clock();
    let mut local_register = LwwRegister::new();
    let mut txn = local_store.begin();
    let result = local_clock.process_remote(&mut txn, &mut local_register, &fetcher, tip, 3, None);
    assert!(matches!(result, Err(ClockError::DepthExceeded)));
}
