//! The Merkle clock: one per field (and one for each document's composite
//! field), maintaining a head set and applying local and remote blocks.

use crate::block::Block;
use crate::error::ClockError;
use crate::fetcher::BlockFetcher;
use std::collections::HashSet;
use std::time::Instant;
use tessera_codec::next_priority;
use tessera_core::ContentId;
use tessera_crdt::{Delta, Register};
use tessera_store::namespace::{blocks_key, data_key, heads_key, heads_prefix};
use tessera_store::{Namespace, Txn};

/// Identifies which field's DAG a clock instance operates over. Cheap to
/// construct; clocks hold no state of their own beyond this address, since
/// the real state (heads, blocks, materialised value) lives in the store.
pub struct MerkleClock {
    collection: String,
    doc_key: Vec<u8>,
    field: String,
}

impl MerkleClock {
    pub fn new(collection: impl Into<String>, doc_key: Vec<u8>, field: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            doc_key,
            field: field.into(),
        }
    }

    /// The current head set: the antichain frontier of this field's DAG.
    pub fn heads(&self, txn: &mut Txn) -> Result<Vec<ContentId>, ClockError> {
        let prefix = heads_prefix(&self.collection, &self.doc_key, &self.field);
        txn.range(Namespace::Heads, &prefix)?
            .into_iter()
            .map(|(key, _)| {
                let suffix = &key[prefix.len() + 1..];
                ContentId::from_multihash_bytes(suffix).ok_or(ClockError::HashMismatch)
            })
            .collect()
    }

    fn block_priority(&self, txn: &mut Txn, cid: ContentId) -> Result<u64, ClockError> {
        let bytes = txn.get(Namespace::Blocks, &blocks_key(&cid.to_multihash_bytes()))?;
        Ok(Block::decode(&bytes)?.priority)
    }

    /// Local write path: stamp `delta`'s priority from the current heads,
    /// wrap it in a new block referencing them, persist, and fold it into
    /// `register`. Returns the new block's content id.
    pub fn add_delta(
        &self,
        txn: &mut Txn,
        register: &mut dyn Register,
        mut delta: Delta,
    ) -> Result<ContentId, ClockError> {
        let heads = self.heads(txn)?;
        let mut parent_priorities = Vec::with_capacity(heads.len());
        for head in &heads {
            parent_priorities.push(self.block_priority(txn, *head)?);
        }
        delta.priority = next_priority(parent_priorities);

        let block = Block::new(delta.body.clone(), delta.priority, heads.iter().copied());
        let cid = block.content_id()?;

        txn.put(
            Namespace::Blocks,
            &blocks_key(&cid.to_multihash_bytes()),
            block.encode()?,
        )?;
        for head in &heads {
            txn.delete(
                Namespace::Heads,
                &heads_key(&self.collection, &self.doc_key, &self.field, &head.to_multihash_bytes()),
            )?;
        }
        txn.put(
            Namespace::Heads,
            &heads_key(&self.collection, &self.doc_key, &self.field, &cid.to_multihash_bytes()),
            Vec::new(),
        )?;

        register.merge(&delta, cid)?;
        txn.put(
            Namespace::Data,
            &data_key(&self.collection, &self.doc_key, &self.field),
            register.value(),
        )?;

        Ok(cid)
    }

    /// Remote apply path: verify the top block's hash, fetch ancestors
    /// transitively up to the local frontier, then apply everything in
    /// topological order. A no-op (returning an empty list) if the top
    /// block is already known. Returns every block newly applied, in
    /// application order, so callers that need to react to specific
    /// blocks (e.g. the composite DAG's per-field links) don't have to
    /// re-derive which ones were new.
    pub fn process_node(
        &self,
        txn: &mut Txn,
        register: &mut dyn Register,
        fetcher: &dyn BlockFetcher,
        bytes: Vec<u8>,
        claimed: ContentId,
        max_depth: u32,
        deadline: Option<Instant>,
    ) -> Result<Vec<(ContentId, Block)>, ClockError> {
        if txn
            .get(Namespace::Blocks, &blocks_key(&claimed.to_multihash_bytes()))
            .is_ok()
        {
            return Ok(Vec::new());
        }

        let mut visited = HashSet::new();
        let mut order = Vec::new();
        self.resolve_chain(
            txn, fetcher, claimed, Some(bytes), 0, max_depth, deadline, &mut visited, &mut order,
        )?;

        for (cid, block) in &order {
            self.apply_block(txn, register, *cid, block)?;
        }
        Ok(order)
    }

    /// Fetch `content_id` via `fetcher` if not already locally known, then
    /// apply it the same way [`Self::process_node`] applies a block handed
    /// in directly. Used when a caller only has a ContentID to chase (a
    /// composite node's per-field link) rather than bytes in hand.
    pub fn process_remote(
        &self,
        txn: &mut Txn,
        register: &mut dyn Register,
        fetcher: &dyn BlockFetcher,
        content_id: ContentId,
        max_depth: u32,
        deadline: Option<Instant>,
    ) -> Result<Vec<(ContentId, Block)>, ClockError> {
        if txn
            .get(Namespace::Blocks, &blocks_key(&content_id.to_multihash_bytes()))
            .is_ok()
        {
            return Ok(Vec::new());
        }
        let bytes = fetcher.fetch(content_id, deadline)?;
        self.process_node(txn, register, fetcher, bytes, content_id, max_depth, deadline)
    }

    /// Recompute `register`'s state from scratch by folding every block
    /// reachable from the field's current heads, in topological order.
    /// The Data keyspace caches this result for read performance, but it is
    /// never authoritative; this is the ground truth it is cached from.
    pub fn replay(&self, txn: &mut Txn, register: &mut dyn Register) -> Result<(), ClockError> {
        let heads = self.heads(txn)?;
        let mut visited = HashSet::new();
        let mut order = Vec::new();
        for head in heads {
            self.collect_local(txn, head, &mut visited, &mut order)?;
        }
        for (cid, block) in order {
            let mut delta = register.decode_delta(&block.delta)?;
            delta.priority = block.priority;
            register.merge(&delta, cid)?;
        }
        Ok(())
    }

    fn collect_local(
        &self,
        txn: &mut Txn,
        cid: ContentId,
        visited: &mut HashSet<ContentId>,
        order: &mut Vec<(ContentId, Block)>,
    ) -> Result<(), ClockError> {
        if !visited.insert(cid) {
            return Ok(());
        }
        let bytes = txn
            .get(Namespace::Blocks, &blocks_key(&cid.to_multihash_bytes()))
            .map_err(|_| ClockError::DanglingParent)?;
        let block = Block::decode(&bytes)?;
        for parent in block.parents.clone() {
            self.collect_local(txn, parent, visited, order)?;
        }
        order.push((cid, block));
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn resolve_chain(
        &self,
        txn: &mut Txn,
        fetcher: &dyn BlockFetcher,
        cid: ContentId,
        bytes: Option<Vec<u8>>,
        depth: u32,
        max_depth: u32,
        deadline: Option<Instant>,
        visited: &mut HashSet<ContentId>,
        order: &mut Vec<(ContentId, Block)>,
    ) -> Result<(), ClockError> {
        if depth > max_depth {
            return Err(ClockError::DepthExceeded);
        }
        if !visited.insert(cid) {
            return Ok(());
        }
        if txn
            .get(Namespace::Blocks, &blocks_key(&cid.to_multihash_bytes()))
            .is_ok()
        {
            // Already part of the local frontier; its ancestors are assumed
            // already applied.
            return Ok(());
        }

        let bytes = match bytes {
            Some(bytes) => bytes,
            None => fetcher.fetch(cid, deadline)?,
        };
        let block = Block::verify(&bytes, cid)?;

        for parent in block.parents.clone() {
            self.resolve_chain(txn, fetcher, parent, None, depth + 1, max_depth, deadline, visited, order)?;
        }
        order.push((cid, block));
        Ok(())
    }

    fn apply_block(
        &self,
        txn: &mut Txn,
        register: &mut dyn Register,
        cid: ContentId,
        block: &Block,
    ) -> Result<(), ClockError> {
        let block_key = blocks_key(&cid.to_multihash_bytes());
        if txn.get(Namespace::Blocks, &block_key).is_ok() {
            return Ok(());
        }

        txn.put(Namespace::Blocks, &block_key, block.encode()?)?;

        let mut delta = register.decode_delta(&block.delta)?;
        delta.priority = block.priority;
        register.merge(&delta, cid)?;

        for parent in &block.parents {
            txn.delete(
                Namespace::Heads,
                &heads_key(&self.collection, &self.doc_key, &self.field, &parent.to_multihash_bytes()),
            )?;
        }
        txn.put(
            Namespace::Heads,
            &heads_key(&self.collection, &self.doc_key, &self.field, &cid.to_multihash_bytes()),
            Vec::new(),
        )?;

        txn.put(
            Namespace::Data,
            &data_key(&self.collection, &self.doc_key, &self.field),
            register.value(),
        )?;
        Ok(())
    }
}
