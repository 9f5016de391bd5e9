//! ragstore vector store
//!
//! In-memory embedding store with cosine ranking, centroid-refinement
//! clustering and a retrieval-augmented answering pipeline

mod cluster;
mod rag;
mod similarity;
mod store;
mod types;

#[cfg(test)]
mod testing;

pub use cluster::{
    ClusterConfig, ClusterEngine, DEFAULT_CONVERGENCE_THRESHOLD, DEFAULT_MAX_ITERATIONS,
};
pub use rag::{build_context, RagPipeline, DEFAULT_TOP_K};
pub use similarity::{cosine_similarity, mean_vector};
pub use store::{StoreConfig, VectorStore};
pub use types::{
    Cluster, ClusterMember, Document, Entry, Metadata, MetadataValue, RagAnswer, SearchResult,
    SourceRef, StoreStats,
};
