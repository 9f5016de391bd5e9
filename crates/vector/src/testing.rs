//! Deterministic providers for unit tests

use async_trait::async_trait;
use ragstore_common::{RagStoreError, Result};
use ragstore_llm::{EmbeddingProvider, GenerationProvider};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// One dimension per keyword, valued by occurrence count
pub struct KeywordEmbedder {
    keywords: Vec<&'static str>,
    calls: AtomicUsize,
}

impl KeywordEmbedder {
    pub fn new(keywords: &[&'static str]) -> Self {
        Self {
            keywords: keywords.to_vec(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmbeddingProvider for KeywordEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f64>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let text = text.to_lowercase();
        Ok(self
            .keywords
            .iter()
            .map(|k| text.matches(k).count() as f64)
            .collect())
    }
}

/// Returns a preset vector per text
pub struct TableEmbedder {
    table: HashMap<String, Vec<f64>>,
}

impl TableEmbedder {
    pub fn new(rows: &[(&str, &[f64])]) -> Self {
        Self {
            table: rows
                .iter()
                .map(|(text, vector)| (text.to_string(), vector.to_vec()))
                .collect(),
        }
    }
}

#[async_trait]
impl EmbeddingProvider for TableEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f64>> {
        self.table
            .get(text)
            .cloned()
            .ok_or_else(|| RagStoreError::provider(format!("no vector for {:?}", text)))
    }
}

/// Fails every call as if the service were down
pub struct DownProvider;

#[async_trait]
impl EmbeddingProvider for DownProvider {
    async fn embed(&self, _text: &str) -> Result<Vec<f64>> {
        Err(RagStoreError::provider_unavailable("connection refused"))
    }
}

#[async_trait]
impl GenerationProvider for DownProvider {
    async fn generate(&self, _prompt: &str) -> Result<String> {
        Err(RagStoreError::provider_unavailable("connection refused"))
    }
}

/// Records prompts and answers with a canned reply
pub struct RecordingGenerator {
    reply: String,
    prompts: Mutex<Vec<String>>,
}

impl RecordingGenerator {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerationProvider for RecordingGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(self.reply.clone())
    }
}
