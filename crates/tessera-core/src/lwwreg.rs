//! Last-Writer-Wins value lattice.
//!
//! The winning value is the one carried by the block with the greatest
//! priority; ties break on the block's own `ContentId`, smaller wins. The
//! tie-break is deliberately derived from content rather than arrival order
//! or wall-clock time, so every replica that has seen the same two
//! candidate blocks computes the same winner.

use crate::hash::ContentId;
use crate::lattice::Lattice;
use serde::{Deserialize, Serialize};

/// A last-writer-wins value, tagged with the priority and `ContentId` of
/// the block that produced it.
///
/// `None` (no `cid`) is the bottom element: a register that has never been
/// written always loses a join against one that has.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LwwValue<T: Clone + PartialEq> {
    value: Option<T>,
    priority: u64,
    cid: Option<ContentId>,
}

impl<T: Clone + PartialEq> LwwValue<T> {
    /// An empty register (the bottom element).
    pub fn empty() -> Self {
        LwwValue {
            value: None,
            priority: 0,
            cid: None,
        }
    }

    /// Stamp a candidate value with the priority and `ContentId` of the
    /// block that carries it. Does not compare against any existing state;
    /// callers join the result in.
    pub fn candidate(value: T, priority: u64, cid: ContentId) -> Self {
        LwwValue {
            value: Some(value),
            priority,
            cid: Some(cid),
        }
    }

    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn priority(&self) -> u64 {
        self.priority
    }

    pub fn winning_cid(&self) -> Option<ContentId> {
        self.cid
    }

    pub fn is_empty(&self) -> bool {
        self.cid.is_none()
    }

    /// `true` if `other` would win a join against `self` (used by callers
    /// that want to know the tie-break outcome without discarding `self`).
    fn other_wins(&self, other: &Self) -> bool {
        match (self.cid, other.cid) {
            (None, None) => false,
            (None, Some(_)) => true,
            (Some(_), None) => false,
            (Some(self_cid), Some(other_cid)) => {
                match other.priority.cmp(&self.priority) {
                    std::cmp::Ordering::Greater => true,
                    std::cmp::Ordering::Less => false,
                    std::cmp::Ordering::Equal => other_cid < self_cid,
                }
            }
        }
    }
}

impl<T: Clone + PartialEq> Lattice for LwwValue<T> {
    fn bottom() -> Self {
        LwwValue::empty()
    }

    /// Join keeps the candidate with the greater priority; a tie is broken
    /// by the smaller `ContentId`.
    fn join(&self, other: &Self) -> Self {
        if self.other_wins(other) {
            other.clone()
        } else {
            self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::Hasher;

    #[test]
    fn empty_is_bottom() {
        let empty: LwwValue<i32> = LwwValue::empty();
        assert!(empty.is_empty());
        assert_eq!(empty.value(), None);
    }

    #[test]
    fn higher_priority_wins() {
        let low = LwwValue::candidate(10, 1, Hasher::hash(b"low"));
        let high = LwwValue::candidate(20, 2, Hasher::hash(b"high"));

        assert_eq!(low.join(&high).value(), Some(&20));
        assert_eq!(high.join(&low).value(), Some(&20));
    }

    #[test]
    fn tie_breaks_on_smaller_content_id() {
        let cid_a = Hasher::hash(b"aaa");
        let cid_b = Hasher::hash(b"bbb");
        let (smaller, larger) = if cid_a < cid_b {
            (cid_a, cid_b)
        } else {
            (cid_b, cid_a)
        };

        let winner = LwwValue::candidate("winner", 5, smaller);
        let loser = LwwValue::candidate("loser", 5, larger);

        assert_eq!(winner.join(&loser).value(), Some(&"winner"));
        assert_eq!(loser.join(&winner).value(), Some(&"winner"));
    }

    #[test]
    fn join_is_idempotent_commutative_associative() {
        let a = LwwValue::candidate(1, 1, Hasher::hash(b"a"));
        let b = LwwValue::candidate(2, 2, Hasher::hash(b"b"));
        let c = LwwValue::candidate(3, 2, Hasher::hash(b"c"));

        assert_eq!(a.join(&a), a);
        assert_eq!(a.join(&b), b.join(&a));
        assert_eq!(a.join(&b).join(&c), a.join(&b.join(&c)));
    }

    #[test]
    fn bottom_is_join_identity() {
        let a = LwwValue::candidate(7, 3, Hasher::hash(b"a"));
        let bottom = LwwValue::bottom();
        assert_eq!(a.join(&bottom), a);
        assert_eq!(bottom.join(&a), a);
    }

    #[test]
    fn serialization_roundtrip() {
        let a = LwwValue::candidate(42, 9, Hasher::hash(b"serde"));
        let json = serde_json::to_string(&a).unwrap();
        let back: LwwValue<i32> = serde_json::from_str(&json).unwrap();
        assert_eq!(a, back);
    }
}
