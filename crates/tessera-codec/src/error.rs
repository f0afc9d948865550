//! Errors from canonical encoding and decoding.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("failed to encode value: {0}")]
    Encode(String),

    #[error("failed to decode value: {0}")]
    Decode(String),
}
