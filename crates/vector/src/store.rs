use ragstore_common::{AppConfig, RagStoreError, Result};
use ragstore_llm::EmbeddingProvider;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::similarity::cosine_similarity;
use crate::types::{Document, Entry, Metadata, SearchResult, StoreStats};

/// Store behaviour settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreConfig {
    /// Append entries whose id is already present as separate records
    pub allow_duplicate_ids: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            allow_duplicate_ids: true,
        }
    }
}

impl From<&AppConfig> for StoreConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            allow_duplicate_ids: config.allow_duplicate_ids,
        }
    }
}

/// In-memory vector store
///
/// Entries live behind a single `RwLock`. Embedding calls happen before
/// the lock is taken; the dimension check and the append then run under
/// the write lock, so concurrent `add`s cannot disagree on the dimension.
pub struct VectorStore {
    entries: RwLock<Vec<Arc<Entry>>>,
    embedder: Arc<dyn EmbeddingProvider>,
    config: StoreConfig,
}

impl VectorStore {
    /// Create empty store with default settings
    pub fn new(embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self::with_config(embedder, StoreConfig::default())
    }

    /// Create empty store
    pub fn with_config(embedder: Arc<dyn EmbeddingProvider>, config: StoreConfig) -> Self {
        info!(
            "Vector store initialized - duplicate ids {}",
            if config.allow_duplicate_ids { "allowed" } else { "rejected" }
        );

        Self {
            entries: RwLock::new(Vec::new()),
            embedder,
            config,
        }
    }

    /// Store settings
    pub fn config(&self) -> StoreConfig {
        self.config
    }

    /// Embed `text` and append it as a new entry
    pub async fn add(&self, id: impl Into<String>, text: &str, metadata: Metadata) -> Result<()> {
        let id = id.into();
        debug!("Adding entry: {}", id);

        let vector = self.embedder.embed(text).await?;
        self.insert(id, text.to_string(), vector, metadata).await
    }

    /// Add a document; missing metadata becomes an empty map
    pub async fn add_document(&self, document: Document) -> Result<()> {
        let Document {
            id,
            content,
            metadata,
        } = document;
        self.add(id, &content, metadata.unwrap_or_default()).await
    }

    /// Append an entry with a precomputed vector
    ///
    /// The embedding provider is not called; dimension and duplicate
    /// checks still apply.
    pub async fn add_embedding(
        &self,
        id: impl Into<String>,
        content: impl Into<String>,
        vector: Vec<f64>,
        metadata: Metadata,
    ) -> Result<()> {
        self.insert(id.into(), content.into(), vector, metadata).await
    }

    async fn insert(
        &self,
        id: String,
        content: String,
        vector: Vec<f64>,
        metadata: Metadata,
    ) -> Result<()> {
        if vector.is_empty() {
            return Err(RagStoreError::invalid_input(format!(
                "empty embedding for entry {}",
                id
            )));
        }

        let mut entries = self.entries.write().await;

        if let Some(first) = entries.first() {
            if first.vector.len() != vector.len() {
                return Err(RagStoreError::dimension_mismatch(
                    first.vector.len(),
                    vector.len(),
                ));
            }
        }

        if !self.config.allow_duplicate_ids && entries.iter().any(|e| e.id == id) {
            return Err(RagStoreError::DuplicateId(id));
        }

        debug!("Entry stored: {} (dimension {})", id, vector.len());
        entries.push(Arc::new(Entry {
            id,
            vector,
            content,
            metadata,
            indexed_at: chrono::Utc::now(),
        }));

        Ok(())
    }

    /// Embed `query` and return the `top_k` most similar entries
    pub async fn search(&self, query: &str, top_k: usize) -> Result<Vec<SearchResult>> {
        debug!("Searching for: {} (top_k={})", query, top_k);

        let query_vector = self.embedder.embed(query).await?;
        self.search_by_vector(&query_vector, top_k).await
    }

    /// Rank all entries against a query vector
    ///
    /// Results are sorted by descending similarity; equal similarities keep
    /// insertion order. `top_k` is clamped to the store size.
    pub async fn search_by_vector(
        &self,
        query_vector: &[f64],
        top_k: usize,
    ) -> Result<Vec<SearchResult>> {
        let entries = self.entries.read().await;
        if entries.is_empty() || top_k == 0 {
            return Ok(Vec::new());
        }

        let mut results = entries
            .iter()
            .map(|entry| {
                cosine_similarity(query_vector, &entry.vector).map(|similarity| SearchResult {
                    entry: Arc::clone(entry),
                    similarity,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        // Stable sort: ties stay in insertion order
        results.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        results.truncate(top_k);

        debug!(
            "Search completed - {} results from {} entries",
            results.len(),
            entries.len()
        );
        Ok(results)
    }

    /// Snapshot of all entries in insertion order
    pub async fn entries(&self) -> Vec<Arc<Entry>> {
        self.entries.read().await.clone()
    }

    /// First entry with the given id
    pub async fn get(&self, id: &str) -> Option<Arc<Entry>> {
        self.entries
            .read()
            .await
            .iter()
            .find(|e| e.id == id)
            .cloned()
    }

    /// Number of entries
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether the store is empty
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Established vector dimension, if any entry exists
    pub async fn dimension(&self) -> Option<usize> {
        self.entries.read().await.first().map(|e| e.vector.len())
    }

    /// Get store statistics
    pub async fn stats(&self) -> StoreStats {
        let entries = self.entries.read().await;
        StoreStats {
            entries: entries.len(),
            dimension: entries.first().map(|e| e.vector.len()),
        }
    }
}
