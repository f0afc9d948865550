//! The composite-DAG register: a document's structural merge point.
//!
//! A composite node links the per-field head ContentIDs it attests,
//! providing document-level atomicity. It carries no scalar state of its
//! own — `value()` is a deliberate no-op returning an empty payload, not an
//! unimplemented method.

use crate::error::CrdtError;
use crate::register::{CrdtKind, Delta, Register};
use serde::{Deserialize, Serialize};
use tessera_codec::{from_canonical_bytes, to_canonical_bytes};
use tessera_core::ContentId;

/// The links a composite node attests: one per field the document update touched.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CompositeBody {
    pub patch: Vec<u8>,
    pub links: Vec<(String, ContentId)>,
}

/// Build the canonical input bytes for `CompositeRegister::set`.
pub fn encode_composite_input(patch: &[u8], links: &[(String, ContentId)]) -> Result<Vec<u8>, CrdtError> {
    let body = CompositeBody {
        patch: patch.to_vec(),
        links: links.to_vec(),
    };
    Ok(to_canonical_bytes(&body)?)
}

/// Read the links and patch back out of a composite delta.
pub fn decode_composite_body(delta: &Delta) -> Result<CompositeBody, CrdtError> {
    Ok(from_canonical_bytes(&delta.body)?)
}

/// Pure DAG register: no reducible scalar state.
#[derive(Default)]
pub struct CompositeRegister;

impl CompositeRegister {
    pub fn new() -> Self {
        Self
    }
}

impl Register for CompositeRegister {
    fn kind(&self) -> CrdtKind {
        CrdtKind::CompositeDag
    }

    fn set(&self, input: &[u8]) -> Result<Delta, CrdtError> {
        Ok(Delta {
            priority: 0,
            body: input.to_vec(),
        })
    }

    fn merge(&mut self, _delta: &Delta, _block_id: ContentId) -> Result<(), CrdtError> {
        // Structural only: recording this delta's existence (and linking it
        // into the field DAGs) is the clock's job. The register itself has
        // nothing to fold.
        Ok(())
    }

    fn value(&self) -> Vec<u8> {
        Vec::new()
    }

    fn encode_delta(&self, delta: &Delta) -> Result<Vec<u8>, CrdtError> {
        Ok(delta.body.clone())
    }

    fn decode_delta(&self, bytes: &[u8]) -> Result<Delta, CrdtError> {
        Ok(Delta {
            priority: 0,
            body: bytes.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_core::Hasher;

    #[test]
    fn value_is_always_empty() {
        let mut reg = CompositeRegister::new();
        let cid = Hasher::hash(b"field-head");
        let links = vec![("name".to_string(), cid)];
        let delta = reg.set(&encode_composite_input(b"{}", &links).unwrap()).unwrap();
        reg.merge(&delta, Hasher::hash(b"block")).unwrap();
        assert!(reg.value().is_empty());
    }

    #[test]
    fn links_roundtrip_through_body() {
        let cid = Hasher::hash(b"field-head");
        let links = vec![("age".to_string(), cid)];
        let input = encode_composite_input(b"patch-bytes", &links).unwrap();
        let reg = CompositeRegister::new();
        let delta = reg.set(&input).unwrap();
        let body = decode_composite_body(&delta).unwrap();
        assert_eq!(body.patch, b"patch-bytes");
        assert_eq!(body.links, links);
    }
}
