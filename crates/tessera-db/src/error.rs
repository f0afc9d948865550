//! The unified error type surfaced by the document dispatcher.
//!
//! Every lower-level crate's error collapses into one of these kinds; the
//! policy for each (retry, discard, surface) lives with the operation that
//! raises it, not here.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("not found")]
    NotFound,

    #[error("block bytes do not match their claimed content id")]
    HashMismatch,

    #[error("ancestor fetch exhausted its retry budget for a dangling parent")]
    DanglingParent,

    #[error("optimistic transaction conflict")]
    Conflict,

    #[error("operation deadline expired")]
    Deadline,

    #[error("operation canceled")]
    Canceled,

    #[error("storage I/O error: {0}")]
    Io(String),

    #[error("field '{field}' in patch has no registered CRDT kind in collection '{collection}'")]
    SchemaMismatch { collection: String, field: String },

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<tessera_store::StoreError> for Error {
    fn from(err: tessera_store::StoreError) -> Self {
        match err {
            tessera_store::StoreError::NotFound => Error::NotFound,
            tessera_store::StoreError::Conflict => Error::Conflict,
            tessera_store::StoreError::TxnClosed => Error::Io("transaction already closed".to_string()),
            tessera_store::StoreError::Io(msg) => Error::Io(msg),
        }
    }
}

impl From<tessera_merkle::ClockError> for Error {
    fn from(err: tessera_merkle::ClockError) -> Self {
        use tessera_merkle::ClockError;
        match err {
            ClockError::HashMismatch => Error::HashMismatch,
            ClockError::DanglingParent | ClockError::DepthExceeded => Error::DanglingParent,
            ClockError::Deadline => Error::Deadline,
            ClockError::Canceled => Error::Canceled,
            ClockError::Codec(e) => Error::Serialization(e.to_string()),
            ClockError::Crdt(e) => Error::Serialization(e.to_string()),
            ClockError::Store(e) => e.into(),
        }
    }
}

impl From<tessera_crdt::CrdtError> for Error {
    fn from(err: tessera_crdt::CrdtError) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<tessera_codec::CodecError> for Error {
    fn from(err: tessera_codec::CodecError) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl tessera_store::IsConflict for Error {
    fn is_conflict(&self) -> bool {
        matches!(self, Error::Conflict)
    }
}
