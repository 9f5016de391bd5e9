use ragstore_common::{AppConfig, RagStoreError, Result};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::types::{EmbedRequest, EmbedResponse, GenerateRequest, GenerateResponse};

/// Attempts per call when none are configured
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Ollama API client
#[derive(Debug, Clone)]
pub struct OllamaClient {
    base_url: String,
    client: Client,
    max_retries: u32,
}

/// Map a transport failure onto the provider error taxonomy
fn classify(context: &str, e: reqwest::Error) -> RagStoreError {
    if e.is_connect() || e.is_timeout() {
        RagStoreError::provider_unavailable(format!("{}: {}", context, e))
    } else {
        RagStoreError::provider(format!("{}: {}", context, e))
    }
}

impl OllamaClient {
    /// Create new Ollama client
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_settings(base_url, Duration::from_secs(300), DEFAULT_MAX_RETRIES)
    }

    /// Create client with explicit timeout and attempt count
    pub fn with_settings(
        base_url: impl Into<String>,
        timeout: Duration,
        max_retries: u32,
    ) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RagStoreError::config(format!("Failed to create HTTP client: {}", e)))?;

        info!("Ollama client initialized: {}", base_url);
        Ok(Self {
            base_url,
            client,
            max_retries: max_retries.max(1),
        })
    }

    /// Build a client from application settings
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Self::with_settings(
            config.ollama_base_url.clone(),
            Duration::from_secs(config.request_timeout_secs),
            config.max_retries,
        )
    }

    /// Base URL the client talks to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Generate text with Ollama (with retry logic)
    pub async fn generate(&self, request: GenerateRequest) -> Result<String> {
        let url = format!("{}/api/generate", self.base_url);

        debug!(
            "Sending generate request to Ollama - Model: {}, Prompt length: {}",
            request.model,
            request.prompt.len()
        );

        let response = self
            .with_retry("Generate", || self.try_generate(&url, &request))
            .await?;

        debug!("Received response from Ollama - Length: {}", response.len());
        Ok(response)
    }

    /// Single attempt to generate text
    async fn try_generate(&self, url: &str, request: &GenerateRequest) -> Result<String> {
        let response = self
            .client
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(|e| classify("Failed to send request", e))?
            .error_for_status()
            .map_err(|e| classify("Ollama API error", e))?;

        let result: GenerateResponse = response
            .json()
            .await
            .map_err(|e| classify("Failed to parse response", e))?;

        if result.response.is_empty() {
            return Err(RagStoreError::provider("Empty response from Ollama"));
        }

        Ok(result.response)
    }

    /// Generate embedding for text (with retry logic)
    pub async fn embed(&self, model: &str, text: &str) -> Result<Vec<f32>> {
        let url = format!("{}/api/embeddings", self.base_url);

        debug!("Generating embedding - Model: {}, Text length: {}", model, text.len());

        let request = EmbedRequest {
            model: model.to_string(),
            prompt: text.to_string(),
        };

        let embedding = self
            .with_retry("Embedding", || self.try_embed(&url, &request))
            .await?;

        debug!("Received embedding - Dimension: {}", embedding.len());
        Ok(embedding)
    }

    /// Single attempt to generate embedding
    async fn try_embed(&self, url: &str, request: &EmbedRequest) -> Result<Vec<f32>> {
        let response = self
            .client
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(|e| classify("Failed to send embedding request", e))?
            .error_for_status()
            .map_err(|e| classify("Ollama embedding API error", e))?;

        let result: EmbedResponse = response
            .json()
            .await
            .map_err(|e| classify("Failed to parse embedding response", e))?;

        if result.embedding.is_empty() {
            return Err(RagStoreError::provider("Empty embedding from Ollama"));
        }

        Ok(result.embedding)
    }

    /// Run `attempt` up to `max_retries` times with exponential backoff
    async fn with_retry<T, F, Fut>(&self, label: &str, mut attempt: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        let mut tries = 1;
        loop {
            match attempt().await {
                Ok(value) => return Ok(value),
                Err(e) if tries < self.max_retries => {
                    let delay = Duration::from_secs(2u64.pow(tries - 1));
                    warn!(
                        "{} request failed (attempt {}/{}): {}. Retrying in {:?}...",
                        label, tries, self.max_retries, e, delay
                    );
                    tokio::time::sleep(delay).await;
                    tries += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Test connection to Ollama
    pub async fn test_connection(&self) -> Result<bool> {
        let url = format!("{}/api/tags", self.base_url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| classify("Failed to connect to Ollama", e))?;
        Ok(response.status().is_success())
    }
}
