//! Collection schema: the consumed collaborator that tells the dispatcher
//! which CRDT kind backs each field. The core never parses GraphQL SDL;
//! this is the interface boundary where a compiled schema hands in its
//! field list.

use std::collections::HashMap;
use tessera_crdt::CrdtKind;

#[derive(Clone, Debug)]
pub struct FieldSchema {
    pub name: String,
    pub kind: CrdtKind,
}

#[derive(Clone, Debug, Default)]
pub struct CollectionSchema {
    pub fields: Vec<FieldSchema>,
}

impl CollectionSchema {
    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// `GetCollection(name) -> { fields: [(name, CRDTKind, relationInfo)] }`.
/// `relationInfo` is out of scope for the core and is not modelled here.
pub trait SchemaSource: Send + Sync {
    fn get_collection(&self, name: &str) -> Option<CollectionSchema>;
}

/// A schema source backed by an in-memory map, for embedding or tests
/// where collections are registered programmatically rather than compiled
/// from GraphQL SDL.
#[derive(Default)]
pub struct StaticSchema {
    collections: HashMap<String, CollectionSchema>,
}

impl StaticSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_collection(mut self, name: impl Into<String>, schema: CollectionSchema) -> Self {
        self.collections.insert(name.into(), schema);
        self
    }

    pub fn register_collection(&mut self, name: impl Into<String>, schema: CollectionSchema) {
        self.collections.insert(name.into(), schema);
    }
}

impl SchemaSource for StaticSchema {
    fn get_collection(&self, name: &str) -> Option<CollectionSchema> {
        self.collections.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unregistered_collection_is_none() {
        let schema = StaticSchema::new();
        assert!(schema.get_collection("posts").is_none());
    }

    #[test]
    fn registered_field_is_found_by_name() {
        let collection = CollectionSchema {
            fields: vec![FieldSchema {
                name: "title".to_string(),
                kind: CrdtKind::LwwRegister,
            }],
        };
        let schema = StaticSchema::new().with_collection("posts", collection);
        let posts = schema.get_collection("posts").unwrap();
        assert!(matches!(posts.field("title").unwrap().kind, CrdtKind::LwwRegister));
        assert!(posts.field("missing").is_none());
    }
}
