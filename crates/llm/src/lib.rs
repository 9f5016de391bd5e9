//! ragstore LLM integration
//!
//! Provider contracts plus the Ollama-backed implementations

mod client;
mod ollama;
mod prompts;
mod provider;
mod types;

pub use client::{OllamaClient, DEFAULT_MAX_RETRIES};
pub use ollama::{OllamaEmbedder, OllamaGenerator};
pub use prompts::{rag_prompt, GROUNDING_INSTRUCTIONS, NO_CONTEXT_NOTICE};
pub use provider::{EmbeddingProvider, GenerationProvider};
pub use types::{EmbedRequest, EmbedResponse, GenerateOptions, GenerateRequest, GenerateResponse};
