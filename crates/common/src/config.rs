use crate::error::RagStoreError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// ragstore application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Ollama API base URL
    pub ollama_base_url: String,

    /// Embedding model name
    pub embedding_model: String,

    /// Generation model name
    pub llm_model: String,

    /// Per-request timeout for Ollama calls
    pub request_timeout_secs: u64,

    /// Attempts per Ollama call (1 = no retry)
    pub max_retries: u32,

    /// Log level
    pub log_level: String,

    /// Log directory (console only when unset)
    pub log_dir: Option<PathBuf>,

    /// Documents retrieved per RAG question
    pub top_k: usize,

    /// Requested number of clusters
    pub num_clusters: usize,

    /// Centroid refinement iteration cap
    pub max_iterations: usize,

    /// Centroid similarity above which refinement stops
    pub convergence_threshold: f64,

    /// Fixed seed for centroid sampling
    pub cluster_seed: Option<u64>,

    /// Whether the store accepts repeated ids
    pub allow_duplicate_ids: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ollama_base_url: "http://localhost:11434".to_string(),
            embedding_model: "nomic-embed-text".to_string(),
            llm_model: "llama3.2:latest".to_string(),
            request_timeout_secs: 300,
            max_retries: 3,
            log_level: "info".to_string(),
            log_dir: None,
            top_k: 3,
            num_clusters: 3,
            max_iterations: 100,
            convergence_threshold: 0.99,
            cluster_seed: None,
            allow_duplicate_ids: true,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and .env file
    pub fn from_env() -> Result<Self, RagStoreError> {
        // Load .env file (ignore if not exists)
        let _ = dotenv::dotenv();

        let defaults = Self::default();

        let config = Self {
            ollama_base_url: std::env::var("OLLAMA_BASE_URL")
                .unwrap_or(defaults.ollama_base_url),
            embedding_model: std::env::var("EMBEDDING_MODEL")
                .unwrap_or(defaults.embedding_model),
            llm_model: std::env::var("LLM_MODEL").unwrap_or(defaults.llm_model),
            request_timeout_secs: Self::get_env_parsed("OLLAMA_TIMEOUT_SECS")?
                .unwrap_or(defaults.request_timeout_secs),
            max_retries: Self::get_env_parsed("OLLAMA_MAX_RETRIES")?
                .unwrap_or(defaults.max_retries),
            log_level: std::env::var("LOG_LEVEL").unwrap_or(defaults.log_level),
            log_dir: std::env::var("LOG_DIR").ok().map(PathBuf::from),
            top_k: Self::get_env_parsed("RAG_TOP_K")?.unwrap_or(defaults.top_k),
            num_clusters: Self::get_env_parsed("CLUSTER_COUNT")?
                .unwrap_or(defaults.num_clusters),
            max_iterations: Self::get_env_parsed("CLUSTER_MAX_ITERATIONS")?
                .unwrap_or(defaults.max_iterations),
            convergence_threshold: Self::get_env_parsed("CLUSTER_CONVERGENCE_THRESHOLD")?
                .unwrap_or(defaults.convergence_threshold),
            cluster_seed: Self::get_env_parsed("CLUSTER_SEED")?,
            allow_duplicate_ids: Self::get_env_parsed("ALLOW_DUPLICATE_IDS")?
                .unwrap_or(defaults.allow_duplicate_ids),
        };

        config.validate()?;

        Ok(config)
    }

    /// Parse an environment variable, failing loudly on malformed values
    fn get_env_parsed<T: std::str::FromStr>(key: &str) -> Result<Option<T>, RagStoreError> {
        match std::env::var(key) {
            Ok(raw) => raw.trim().parse().map(Some).map_err(|_| {
                RagStoreError::config(format!("Invalid value for {}: {:?}", key, raw))
            }),
            Err(_) => Ok(None),
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), RagStoreError> {
        if !self.ollama_base_url.starts_with("http://")
            && !self.ollama_base_url.starts_with("https://")
        {
            return Err(RagStoreError::config(
                "Ollama base URL must start with http:// or https://",
            ));
        }

        if self.embedding_model.trim().is_empty() {
            return Err(RagStoreError::config("Embedding model name cannot be empty"));
        }

        if self.llm_model.trim().is_empty() {
            return Err(RagStoreError::config("LLM model name cannot be empty"));
        }

        if self.max_retries == 0 {
            return Err(RagStoreError::config("Max retries must be at least 1"));
        }

        if self.top_k == 0 {
            return Err(RagStoreError::config("RAG top_k must be at least 1"));
        }

        if self.max_iterations == 0 {
            return Err(RagStoreError::config("Cluster iteration cap must be at least 1"));
        }

        if !(self.convergence_threshold > 0.0 && self.convergence_threshold <= 1.0) {
            return Err(RagStoreError::config(
                "Convergence threshold must be in (0, 1]",
            ));
        }

        Ok(())
    }
}
