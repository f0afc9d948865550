//! The four logical keyspaces the store partitions all keys into.
//!
//! Partitioning by namespace rather than by key prefix alone means a range
//! scan over `Heads` can never accidentally walk into `Blocks`, even if a
//! caller gets a prefix wrong.

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Namespace {
    /// Per-field CRDT register state: `/data/<collection>/<doc_key>/<field>`.
    Data,
    /// Current DAG head set for a document: `/heads/<collection>/<doc_key>`.
    Heads,
    /// Content-addressed Merkle blocks: `/blocks/<content_id>`.
    Blocks,
    /// Collection schemas, replicator registrations, and other metadata.
    System,
}

impl Namespace {
    pub const ALL: [Namespace; 4] = [
        Namespace::Data,
        Namespace::Heads,
        Namespace::Blocks,
        Namespace::System,
    ];
}

/// Build the `/data/<collection>/<doc_key>/<field>` key for a document field.
pub fn data_key(collection: &str, doc_key: &[u8], field: &str) -> Vec<u8> {
    join(&[b"data", collection.as_bytes(), doc_key, field.as_bytes()])
}

/// Build the `/data/<collection>/<doc_key>/` prefix covering every field of a document.
pub fn data_prefix(collection: &str, doc_key: &[u8]) -> Vec<u8> {
    join(&[b"data", collection.as_bytes(), doc_key])
}

/// Build the `/heads/<collection>/<doc_key>/<field>/<content_id>` key for a single
/// head entry. Heads are separate keys, one per head, so that adding or
/// removing one head is a single-key operation rather than a read-modify-write
/// over a serialised set.
pub fn heads_key(collection: &str, doc_key: &[u8], field: &str, content_id_bytes: &[u8]) -> Vec<u8> {
    join(&[
        b"heads",
        collection.as_bytes(),
        doc_key,
        field.as_bytes(),
        content_id_bytes,
    ])
}

/// Build the `/heads/<collection>/<doc_key>/<field>/` prefix covering every
/// head of one field, for a range scan over the current head set.
pub fn heads_prefix(collection: &str, doc_key: &[u8], field: &str) -> Vec<u8> {
    join(&[b"heads", collection.as_bytes(), doc_key, field.as_bytes()])
}

/// Build the `/blocks/<content_id_bytes>` key for a stored Merkle block.
pub fn blocks_key(content_id_bytes: &[u8]) -> Vec<u8> {
    join(&[b"blocks", content_id_bytes])
}

/// Build a `/system/<category>/<name>` key, used for schemas and replicator metadata.
pub fn system_key(category: &str, name: &str) -> Vec<u8> {
    join(&[b"system", category.as_bytes(), name.as_bytes()])
}

/// Build the `/system/<category>/` prefix covering every entry in a category.
pub fn system_prefix(category: &str) -> Vec<u8> {
    join(&[b"system", category.as_bytes()])
}

fn join(segments: &[&[u8]]) -> Vec<u8> {
    let mut out = Vec::new();
    for segment in segments {
        out.push(b'/');
        out.extend_from_slice(segment);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_key_is_prefixed_by_data_prefix() {
        let prefix = data_prefix("posts", b"doc1");
        let key = data_key("posts", b"doc1", "title");
        assert!(key.starts_with(&prefix));
    }

    #[test]
    fn distinct_documents_have_distinct_prefixes() {
        assert_ne!(data_prefix("posts", b"doc1"), data_prefix("posts", b"doc2"));
    }

    #[test]
    fn namespaces_do_not_collide() {
        let heads = heads_key("posts", b"doc1", "title", b"cid1");
        let data = data_key("posts", b"doc1", "title");
        assert_ne!(heads, data);
    }

    #[test]
    fn each_head_is_a_distinct_key() {
        let a = heads_key("posts", b"doc1", "title", b"cid-a");
        let b = heads_key("posts", b"doc1", "title", b"cid-b");
        assert_ne!(a, b);
        let prefix = heads_prefix("posts", b"doc1", "title");
        assert!(a.starts_with(&prefix));
        assert!(b.starts_with(&prefix));
    }
}
