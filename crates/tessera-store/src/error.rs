//! Errors produced by the key-value store.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("key not found")]
    NotFound,

    #[error("transaction conflict: key was modified by another writer since this transaction began")]
    Conflict,

    #[error("transaction already committed or discarded")]
    TxnClosed,

    #[error("storage I/O error: {0}")]
    Io(String),
}
