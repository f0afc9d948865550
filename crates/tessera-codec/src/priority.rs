//! Block priority arithmetic.
//!
//! Priority is the longest path from any genesis block, not a Lamport
//! clock: `max(priority(parents)) + 1`, with genesis blocks at priority 1.
//! Overflow at `u64::MAX` saturates rather than wraps (the open question in
//! the design notes resolves to "saturate": wrapping would let an
//! adversarial or merely very long-lived DAG quietly reset priority to a
//! low value and upset LWW ordering).

/// Compute the priority a new block should carry given its parents'
/// priorities. Empty input (a genesis block) yields priority 1.
pub fn next_priority(parent_priorities: impl IntoIterator<Item = u64>) -> u64 {
    match parent_priorities.into_iter().max() {
        Some(max_parent) => max_parent.saturating_add(1),
        None => 1,
    }
}
