use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Caller-defined metadata attached to an entry
pub type Metadata = BTreeMap<String, MetadataValue>;

/// Metadata value variants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Bool(bool),
    Number(f64),
    String(String),
    Map(Metadata),
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<f64> for MetadataValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for MetadataValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Metadata> for MetadataValue {
    fn from(value: Metadata) -> Self {
        Self::Map(value)
    }
}

/// Stored vector entry
///
/// Entries are immutable once inserted and live as long as the store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entry {
    /// Caller-supplied id (not necessarily unique)
    pub id: String,

    /// Embedding vector
    pub vector: Vec<f64>,

    /// Text the vector was computed from
    pub content: String,

    /// Entry metadata
    pub metadata: Metadata,

    /// Timestamp when indexed
    pub indexed_at: DateTime<Utc>,
}

/// Document submitted for indexing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Document id
    pub id: String,

    /// Raw text, embedded once on insertion
    pub content: String,

    /// Optional metadata
    #[serde(default)]
    pub metadata: Option<Metadata>,
}

impl Document {
    /// Document without metadata
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            metadata: None,
        }
    }

    /// Attach metadata
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// Search result
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// Matched entry, shared with the store
    pub entry: Arc<Entry>,

    /// Cosine similarity to the query (-1.0 to 1.0)
    pub similarity: f64,
}

/// Reference to a clustered entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClusterMember {
    /// Insertion position in the store
    pub position: usize,

    /// Entry id
    pub id: String,
}

/// Group of entries produced by clustering
///
/// Members refer to entries by insertion position. The store has no
/// delete operation; anything that adds one must treat previously
/// computed clusters as stale.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cluster {
    /// Final centroid
    pub centroid: Vec<f64>,

    /// Members in insertion order
    pub members: Vec<ClusterMember>,
}

impl Cluster {
    /// Number of members
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the cluster has no members
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Retrieved source backing an answer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceRef {
    pub id: String,
    pub similarity: f64,
}

/// Answer produced by the RAG pipeline
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RagAnswer {
    /// Generated answer text
    pub answer: String,

    /// Retrieved sources in ranked order
    pub sources: Vec<SourceRef>,
}

/// Store statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub entries: usize,
    pub dimension: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_metadata_is_optional() {
        let doc: Document =
            serde_json::from_str(r#"{"id":"js","content":"JavaScript is used for web development"}"#)
                .unwrap();
        assert_eq!(doc.id, "js");
        assert!(doc.metadata.is_none());
    }

    #[test]
    fn test_metadata_value_variants_from_json() {
        let doc: Document = serde_json::from_str(
            r#"{
                "id": "py",
                "content": "Python is used for data science",
                "metadata": {
                    "lang": "python",
                    "year": 1991,
                    "typed": false,
                    "origin": {"author": "Guido"}
                }
            }"#,
        )
        .unwrap();

        let metadata = doc.metadata.unwrap();
        assert_eq!(metadata["lang"], MetadataValue::from("python"));
        assert_eq!(metadata["year"], MetadataValue::Number(1991.0));
        assert_eq!(metadata["typed"], MetadataValue::Bool(false));

        let mut origin = Metadata::new();
        origin.insert("author".to_string(), "Guido".into());
        assert_eq!(metadata["origin"], MetadataValue::Map(origin));
    }

    #[test]
    fn test_metadata_serializes_untagged() {
        let mut metadata = Metadata::new();
        metadata.insert("score".to_string(), 0.5.into());
        metadata.insert("tag".to_string(), "web".into());
        let json = serde_json::to_value(&metadata).unwrap();
        assert_eq!(json, serde_json::json!({"score": 0.5, "tag": "web"}));
    }
}
