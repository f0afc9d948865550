//! Error types for the Tessera SDK.

use thiserror::Error;

/// Error type for SDK-level operations: configuration loading and anything
/// the underlying store reports.
#[derive(Debug, Error)]
pub enum SdkError {
    #[error("store error: {0}")]
    Store(#[from] tessera_db::Error),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to parse config toml: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SdkError>;
