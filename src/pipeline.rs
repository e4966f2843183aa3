//! The document-to-chain pipeline behind `Process`.
//!
//! `RagPipeline` is the seam the session controller depends on; `LocalPipeline`
//! wires PDF extraction, chunking, embedding and retrieval together.

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::{StreamExt, TryStreamExt};
use serde_json::json;

use crate::chain::{ConversationChain, RetrievalChain, RetrievalConfig};
use crate::core::config::RagSettings;
use crate::core::errors::PipelineError;
use crate::ingest::{self, ExtractedText, UploadedPdf};
use crate::llm::LlmService;
use crate::rag::{InMemoryRagStore, RAGConfig, RAGEngine, RagStore, StoredChunk, TextChunk};

#[async_trait]
pub trait RagPipeline: Send + Sync {
    async fn extract_text(&self, files: &[UploadedPdf]) -> Result<ExtractedText, PipelineError>;

    fn chunk(&self, text: &ExtractedText) -> Vec<TextChunk>;

    async fn build_index(
        &self,
        chunks: Vec<TextChunk>,
    ) -> Result<Arc<dyn RagStore>, PipelineError>;

    fn make_chain(&self, index: Arc<dyn RagStore>) -> Arc<dyn ConversationChain>;
}

pub struct LocalPipeline {
    llm: LlmService,
    chunker: RAGEngine,
    settings: RagSettings,
}

impl LocalPipeline {
    pub fn new(llm: LlmService, settings: RagSettings) -> Self {
        Self {
            llm,
            chunker: RAGEngine::new(RAGConfig::from(&settings)),
            settings,
        }
    }

    async fn embed_batch(
        &self,
        batch: Vec<TextChunk>,
    ) -> Result<Vec<(StoredChunk, Vec<f32>)>, PipelineError> {
        let texts: Vec<String> = batch.iter().map(|chunk| chunk.text.clone()).collect();
        let vectors = self
            .llm
            .embed(&texts)
            .await
            .map_err(|e| PipelineError::Embedding(e.to_string()))?;

        Ok(batch
            .into_iter()
            .zip(vectors)
            .map(|(chunk, vector)| {
                let stored = StoredChunk {
                    chunk_id: uuid::Uuid::new_v4().to_string(),
                    content: chunk.text,
                    source: chunk.source,
                    metadata: Some(json!({
                        "start_offset": chunk.start_offset,
                        "chunk_index": chunk.chunk_index,
                    })),
                };
                (stored, vector)
            })
            .collect())
    }
}

#[async_trait]
impl RagPipeline for LocalPipeline {
    async fn extract_text(&self, files: &[UploadedPdf]) -> Result<ExtractedText, PipelineError> {
        ingest::extract_text(files).await
    }

    fn chunk(&self, text: &ExtractedText) -> Vec<TextChunk> {
        self.chunker.chunk_documents(text)
    }

    async fn build_index(
        &self,
        chunks: Vec<TextChunk>,
    ) -> Result<Arc<dyn RagStore>, PipelineError> {
        if chunks.is_empty() {
            return Err(PipelineError::NoText);
        }

        let total = chunks.len();
        let batch_size = self.settings.embedding_batch_size.max(1);
        let batches: Vec<Vec<TextChunk>> = chunks
            .chunks(batch_size)
            .map(<[TextChunk]>::to_vec)
            .collect();

        // `buffered` keeps batch order, so chunk order in the index matches the text.
        let embedded: Vec<Vec<(StoredChunk, Vec<f32>)>> = futures_util::stream::iter(batches)
            .map(|batch| self.embed_batch(batch))
            .buffered(self.settings.embedding_concurrency.max(1))
            .try_collect()
            .await?;

        let store = InMemoryRagStore::new();
        store
            .insert_batch(embedded.into_iter().flatten().collect())
            .await?;

        tracing::info!("Indexed {} chunks", total);
        Ok(Arc::new(store))
    }

    fn make_chain(&self, index: Arc<dyn RagStore>) -> Arc<dyn ConversationChain> {
        Arc::new(RetrievalChain::new(
            self.llm.clone(),
            index,
            RetrievalConfig::from(&self.settings),
        ))
    }
}
