use async_trait::async_trait;
use ragstore_common::Result;

/// Maps text to a fixed-length embedding vector
///
/// Implementations must return vectors of the same length for every call
/// and must surface transport or model failures as errors, never as a
/// placeholder vector.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single text
    async fn embed(&self, text: &str) -> Result<Vec<f64>>;
}

/// Maps a prompt to a text completion
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Generate a completion for the prompt
    async fn generate(&self, prompt: &str) -> Result<String>;
}
