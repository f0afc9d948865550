//! Last-Writer-Wins register.

use crate::error::CrdtError;
use crate::register::{CrdtKind, Delta, Register};
use serde::{Deserialize, Serialize};
use tessera_codec::{from_canonical_bytes, to_canonical_bytes};
use tessera_core::{ContentId, LwwValue};

#[derive(Clone, Serialize, Deserialize)]
struct LwwBody {
    value: Vec<u8>,
}

/// An LWW-Register: the winning delta is the one with the greatest
/// priority, ties broken by the smaller ContentID.
#[derive(Default)]
pub struct LwwRegister {
    current: LwwValue<Vec<u8>>,
}

impl LwwRegister {
    pub fn new() -> Self {
        Self {
            current: LwwValue::empty(),
        }
    }
}

impl Register for LwwRegister {
    fn kind(&self) -> CrdtKind {
        CrdtKind::LwwRegister
    }

    fn set(&self, input: &[u8]) -> Result<Delta, CrdtError> {
        let body = LwwBody {
            value: input.to_vec(),
        };
        Ok(Delta {
            priority: 0,
            body: to_canonical_bytes(&body)?,
        })
    }

    fn merge(&mut self, delta: &Delta, block_id: ContentId) -> Result<(), CrdtError> {
        let body: LwwBody = from_canonical_bytes(&delta.body)?;
        let candidate = LwwValue::candidate(body.value, delta.priority, block_id);
        self.current = self.current.join(&candidate);
        Ok(())
    }

    fn value(&self) -> Vec<u8> {
        self.current.value().cloned().unwrap_or_default()
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
