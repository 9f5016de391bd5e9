use async_trait::async_trait;
use ragstore_common::Result;

use crate::client::OllamaClient;
use crate::provider::{EmbeddingProvider, GenerationProvider};
use crate::types::{GenerateOptions, GenerateRequest};

/// Embedding provider backed by an Ollama embedding model
#[derive(Debug, Clone)]
pub struct OllamaEmbedder {
    client: OllamaClient,
    model: String,
}

impl OllamaEmbedder {
    /// Create new embedder; the model name is passed to Ollama as-is
    pub fn new(client: OllamaClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    /// Model used for embeddings
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f64>> {
        let embedding = self.client.embed(&self.model, text).await?;
        Ok(embedding.into_iter().map(f64::from).collect())
    }
}

/// Generation provider backed by an Ollama chat/completion model
#[derive(Debug, Clone)]
pub struct OllamaGenerator {
    client: OllamaClient,
    model: String,
    options: GenerateOptions,
}

impl OllamaGenerator {
    /// Create new generator with low-temperature defaults for grounded answers
    pub fn new(client: OllamaClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
            options: GenerateOptions {
                temperature: Some(0.2),
                top_p: Some(0.9),
                num_predict: None,
            },
        }
    }

    /// Override generation options
    pub fn with_options(mut self, options: GenerateOptions) -> Self {
        self.options = options;
        self
    }

    /// Model used for generation
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl GenerationProvider for OllamaGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let request =
            GenerateRequest::single(self.model.clone(), prompt).with_options(self.options.clone());
        self.client.generate(request).await
    }
}
