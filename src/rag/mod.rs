//! RAG (Retrieval-Augmented Generation) module.
//!
//! This module provides:
//! - `RAGEngine`: splits extracted document text into overlapping chunks
//! - `RagStore` / `InMemoryRagStore`: the per-session vector index
//! - `RAGContextBuilder`: formats retrieved chunks into a prompt context

mod context_builder;
mod engine;
mod memory;
mod store;

pub use context_builder::{ContextBuilderConfig, RAGContextBuilder};
pub use engine::{RAGConfig, RAGEngine, TextChunk};
pub use memory::InMemoryRagStore;
pub use store::{ChunkSearchResult, RagStore, StoreError, StoredChunk};
