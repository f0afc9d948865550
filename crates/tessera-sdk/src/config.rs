//! Store configuration, loadable from TOML or assembled programmatically.

use crate::error::SdkError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tessera_crdt::CrdtKind;
use tessera_merkle::DEFAULT_MAX_FETCH_DEPTH;

fn default_crdt_kind() -> CrdtKindConfig {
    CrdtKindConfig::LwwRegister
}

/// Serde-friendly mirror of [`tessera_crdt::CrdtKind`]; kept separate so the
/// wire/config representation doesn't have to track the core enum's derives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrdtKindConfig {
    LwwRegister,
    CompositeDag,
}

impl From<CrdtKindConfig> for CrdtKind {
    fn from(kind: CrdtKindConfig) -> Self {
        match kind {
            CrdtKindConfig::LwwRegister => CrdtKind::LwwRegister,
            CrdtKindConfig::CompositeDag => CrdtKind::CompositeDag,
        }
    }
}

/// Configuration for a `tessera-sdk` client: replica identity plus the
/// merkle clock's traversal and retry tuning.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Identifies this replica in logs and, eventually, replicator metadata.
    pub replica_id: String,
    /// CRDT kind assumed for a field with no explicit schema entry.
    #[serde(default = "default_crdt_kind")]
    pub default_crdt_kind: CrdtKindConfig,
    /// Ceiling on ancestor-chasing depth during `ProcessNode`.
    pub max_depth: u32,
    /// Cap on blocks fetched from a single peer in one sync round.
    pub batch_size: usize,
    /// Number of times a commit retries after `Conflict` before giving up.
    pub commit_retry_budget: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            replica_id: "anonymous".to_string(),
            default_crdt_kind: CrdtKindConfig::LwwRegister,
            max_depth: DEFAULT_MAX_FETCH_DEPTH,
            batch_size: 100,
            commit_retry_budget: 8,
        }
    }
}

impl StoreConfig {
    /// Parse a config from a TOML string.
    pub fn from_toml_str(text: &str) -> Result<Self, SdkError> {
        Ok(toml::from_str(text)?)
    }

    /// Load and parse a config from a TOML file on disk.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, SdkError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}

/// Builder for [`StoreConfig`], in the client-config-builder style used
/// elsewhere in this lineage.
pub struct StoreConfigBuilder {
    config: StoreConfig,
}

impl StoreConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: StoreConfig::default(),
        }
    }

    pub fn replica_id(mut self, id: impl Into<String>) -> Self {
        self.config.replica_id = id.into();
        self
    }

    pub fn default_crdt_kind(mut self, kind: CrdtKindConfig) -> Self {
        self.config.default_crdt_kind = kind;
        self
    }

    pub fn max_depth(mut self, depth: u32) -> Self {
        self.config.max_depth = depth;
        self
    }

    pub fn batch_size(mut self, size: usize) -> Self {
        self.config.batch_size = size;
        self
    }

    pub fn commit_retry_budget(mut self, budget: u32) -> Self {
        self.config.commit_retry_budget = budget;
        self
    }

    pub fn build(self) -> StoreConfig {
        self.config
    }
}

impl Default for StoreConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
