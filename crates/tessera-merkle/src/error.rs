//! Errors from block verification, ancestor fetch and merge.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClockError {
    #[error("block bytes do not hash to the claimed content id")]
    HashMismatch,

    #[error("ancestor fetch exhausted its retry budget for a dangling parent")]
    DanglingParent,

    #[error("ancestor chain exceeded the maximum fetch depth")]
    DepthExceeded,

    #[error("operation deadline expired")]
    Deadline,

    #[error("operation canceled")]
    Canceled,

    #[error(transparent)]
    Codec(#[from] tessera_codec::CodecError),

    #[error(transparent)]
    Crdt(#[from] tessera_crdt::CrdtError),

    #[error(transparent)]
    Store(#[from] tessera_store::StoreError),
}
