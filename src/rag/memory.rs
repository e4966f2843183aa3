//! In-process vector store: brute-force cosine similarity over a `Vec`.

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::store::{ChunkSearchResult, RagStore, StoreError, StoredChunk};
use crate::vector_math::rank_descending_by_cosine;

#[derive(Default)]
struct Index {
    dimension: Option<usize>,
    chunks: Vec<StoredChunk>,
    embeddings: Vec<Vec<f32>>,
}

#[derive(Default)]
pub struct InMemoryRagStore {
    index: RwLock<Index>,
}

impl InMemoryRagStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RagStore for InMemoryRagStore {
    async fn insert_batch(&self, items: Vec<(StoredChunk, Vec<f32>)>) -> Result<(), StoreError> {
        if items.is_empty() {
            return Ok(());
        }

        let mut index = self.index.write().await;

        let mut dimension = index.dimension;
        for (chunk, embedding) in &items {
            if embedding.is_empty() {
                return Err(StoreError::EmptyEmbedding(chunk.chunk_id.clone()));
            }
            match dimension {
                Some(expected) if expected != embedding.len() => {
                    return Err(StoreError::DimensionMismatch {
                        expected,
                        actual: embedding.len(),
                    });
                }
                Some(_) => {}
                None => dimension = Some(embedding.len()),
            }
        }

        index.dimension = dimension;
        for (chunk, embedding) in items {
            index.chunks.push(chunk);
            index.embeddings.push(embedding);
        }
        Ok(())
    }

    async fn search(
        &self,
        query_embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<ChunkSearchResult>, StoreError> {
        let index = self.index.read().await;
        if index.chunks.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }
        if let Some(expected) = index.dimension {
            if expected != query_embedding.len() {
                return Err(StoreError::DimensionMismatch {
                    expected,
                    actual: query_embedding.len(),
                });
            }
        }

        Ok(rank_descending_by_cosine(query_embedding, &index.embeddings)
            .into_iter()
            .take(limit)
            .map(|(idx, score)| ChunkSearchResult {
                chunk: index.chunks[idx].clone(),
                score,
            })
            .collect())
    }

    async fn count(&self) -> usize {
        self.index.read().await.chunks.len()
    }
}
