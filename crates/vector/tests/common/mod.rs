use async_trait::async_trait;
use ragstore_common::Result;
use ragstore_llm::{EmbeddingProvider, GenerationProvider};
use std::sync::Mutex;

/// One dimension per keyword, valued by occurrence count
pub struct KeywordEmbedder(pub Vec<&'static str>);

#[async_trait]
impl EmbeddingProvider for KeywordEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f64>> {
        let text = text.to_lowercase();
        Ok(self.0.iter().map(|k| text.matches(k).count() as f64).collect())
    }
}

/// Echoes a fixed answer and keeps every prompt it saw
#[derive(Default)]
pub struct EchoGenerator {
    pub prompts: Mutex<Vec<String>>,
}

#[async_trait]
impl GenerationProvider for EchoGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok("JavaScript is used for the web.".to_string())
    }
}
