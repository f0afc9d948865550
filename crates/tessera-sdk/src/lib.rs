//! Tessera SDK — configuration, client facade, and a multi-replica
//! simulator over the document dispatcher.
//!
//! # Quick Start
//!
//! ```rust
//! use std::collections::HashMap;
//! use tessera_crdt::CrdtKind;
//! use tessera_db::{CollectionSchema, FieldSchema, StaticSchema};
//! use tessera_sdk::{StoreConfig, TesseraClient};
//!
//! let schema = StaticSchema::new().with_collection(
//!     "notes",
//!     CollectionSchema {
//!         fields: vec![FieldSchema { name: "body".to_string(), kind: CrdtKind::LwwRegister }],
//!     },
//! );
//! let client = TesseraClient::new(StoreConfig::default(), schema);
//!
//! let mut patch = HashMap::new();
//! patch.insert("body".to_string(), serde_json::Value::String("hello".to_string()));
//! client.update("notes", b"doc1", &patch).unwrap();
//! ```
//!
//! # Modules
//!
//! - [`client`] - `TesseraClient`, the main entry point
//! - [`config`] - `StoreConfig` and its builder
//! - [`error`] - SDK-level error type
//! - [`sim`] - in-memory multi-replica sync simulator, for tests and demos

pub mod client;
pub mod config;
pub mod error;
pub mod sim;

pub use client::TesseraClient;
pub use config::{CrdtKindConfig, StoreConfig, StoreConfigBuilder};
pub use error::{Result, SdkError};
pub use sim::{ReplicaSimulator, SchemaFactory};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::client::TesseraClient;
    pub use crate::config::{StoreConfig, StoreConfigBuilder};
    pub use crate::error::SdkError;
    pub use crate::sim::ReplicaSimulator;
}
