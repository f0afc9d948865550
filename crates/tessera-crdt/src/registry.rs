//! Process-wide `CRDTKind -> RegisterConstructor` table.
//!
//! Registered once at startup, then read-only: lookups never take a lock
//! and never block a concurrent writer.

use crate::composite::CompositeRegister;
use crate::lww::LwwRegister;
use crate::register::{CrdtKind, Register};
use std::collections::HashMap;

type Constructor = fn() -> Box<dyn Register>;

/// An immutable map from CRDT kind to register constructor.
pub struct CrdtRegistry {
    constructors: HashMap<CrdtKind, Constructor>,
}

impl CrdtRegistry {
    /// Build a registry with no kinds registered.
    pub fn empty() -> Self {
        Self {
            constructors: HashMap::new(),
        }
    }

    /// Build the registry with the two CRDT kinds this crate ships:
    /// LWW-Register and Composite-DAG.
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register(CrdtKind::LwwRegister, || Box::new(LwwRegister::new()));
        registry.register(CrdtKind::CompositeDag, || Box::new(CompositeRegister::new()));
        registry
    }

    pub fn register(&mut self, kind: CrdtKind, constructor: Constructor) {
        self.constructors.insert(kind, constructor);
    }

    /// Instantiate a fresh register of `kind`, or `None` if the kind has no
    /// registered constructor (the caller should treat this as a schema
    /// mismatch: deletion/tombstone kinds are deliberately left
    /// unregistered rather than given invented semantics).
    pub fn instantiate(&self, kind: CrdtKind) -> Option<Box<dyn Register>> {
        self.constructors.get(&kind).map(|ctor| ctor())
    }

    pub fn is_registered(&self, kind: CrdtKind) -> bool {
        self.constructors.contains_key(&kind)
    }
}

impl Default for CrdtRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_knows_both_kinds() {
        let registry = CrdtRegistry::with_defaults();
        assert!(registry.is_registered(CrdtKind::LwwRegister));
        assert!(registry.is_registered(CrdtKind::CompositeDag));
    }

    #[test]
    fn unregistered_kind_yields_none() {
        let registry = CrdtRegistry::empty();
        assert!(registry.instantiate(CrdtKind::LwwRegister).is_none());
    }

    #[test]
    fn instantiate_produces_a_fresh_empty_register() {
        let registry = CrdtRegistry::with_defaults();
        let reg = registry.instantiate(CrdtKind::LwwRegister).unwrap();
        assert!(reg.value().is_empty());
    }
}
