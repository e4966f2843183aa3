//! Storage seam for the per-session chunk index.
//!
//! The service builds one index per processed upload set; the primary
//! implementation is `InMemoryRagStore` in the `memory` module.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A stored RAG chunk with metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredChunk {
    /// Unique chunk identifier.
    pub chunk_id: String,
    /// The text content of the chunk.
    pub content: String,
    /// Source identifier (file name).
    pub source: String,
    /// Optional metadata (JSON).
    pub metadata: Option<serde_json::Value>,
}

/// Result of a similarity search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkSearchResult {
    pub chunk: StoredChunk,
    /// Similarity score (higher = better).
    pub score: f32,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("embedding dimension mismatch: index uses {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("empty embedding for chunk {0}")]
    EmptyEmbedding(String),
}

/// Abstract trait for RAG storage backends.
#[async_trait]
pub trait RagStore: Send + Sync {
    /// Insert multiple chunks in batch. Either all items are stored or none.
    async fn insert_batch(&self, items: Vec<(StoredChunk, Vec<f32>)>) -> Result<(), StoreError>;

    /// Search for the `limit` chunks most similar to the query embedding.
    async fn search(
        &self,
        query_embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<ChunkSearchResult>, StoreError>;

    /// Total chunk count.
    async fn count(&self) -> usize;
}
