//! Errors from register delta encoding and merge.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CrdtError {
    #[error("delta codec error: {0}")]
    Codec(#[from] tessera_codec::CodecError),

    #[error("delta body did not match the register's expected shape: {0}")]
    MalformedDelta(String),
}
