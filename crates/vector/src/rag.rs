use ragstore_common::Result;
use ragstore_llm::{rag_prompt, GenerationProvider};
use std::sync::Arc;
use tracing::{debug, info};

use crate::store::VectorStore;
use crate::types::{RagAnswer, SearchResult, SourceRef};

/// Documents retrieved per question unless configured otherwise
pub const DEFAULT_TOP_K: usize = 3;

/// Retrieval-augmented question answering over a [`VectorStore`]
///
/// Single shot: one search, one generation call. Near-duplicate sources
/// are passed through as retrieved.
pub struct RagPipeline {
    store: Arc<VectorStore>,
    generator: Arc<dyn GenerationProvider>,
    top_k: usize,
}

impl RagPipeline {
    /// Create new pipeline retrieving [`DEFAULT_TOP_K`] documents
    pub fn new(store: Arc<VectorStore>, generator: Arc<dyn GenerationProvider>) -> Self {
        Self {
            store,
            generator,
            top_k: DEFAULT_TOP_K,
        }
    }

    /// Override the default number of retrieved documents
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Underlying store
    pub fn store(&self) -> &Arc<VectorStore> {
        &self.store
    }

    /// Answer with the default number of sources
    pub async fn query(&self, question: &str) -> Result<RagAnswer> {
        self.query_with_top_k(question, self.top_k).await
    }

    /// Answer using the `top_k` most similar documents as context
    pub async fn query_with_top_k(&self, question: &str, top_k: usize) -> Result<RagAnswer> {
        info!("RAG query (top_k={}): {}", top_k, question);

        let results = self.store.search(question, top_k).await?;
        let context = build_context(&results);
        debug!(
            "Context built from {} sources ({} chars)",
            results.len(),
            context.len()
        );

        let prompt = rag_prompt(&context, question);
        let answer = self.generator.generate(&prompt).await?;

        let sources = results
            .iter()
            .map(|r| SourceRef {
                id: r.entry.id.clone(),
                similarity: r.similarity,
            })
            .collect();

        Ok(RagAnswer { answer, sources })
    }
}

/// Retrieved contents in ranked order, separated by a blank line
pub fn build_context(results: &[SearchResult]) -> String {
    results
        .iter()
        .map(|r| r.entry.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}
