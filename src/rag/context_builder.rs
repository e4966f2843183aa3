//! RAG Context Builder.
//!
//! Turns similarity-search hits into the context block handed to the chat
//! model: hits under the similarity threshold are dropped, the rest are
//! numbered with their source until the length budget is spent.

use serde::{Deserialize, Serialize};

use super::store::ChunkSearchResult;
use crate::core::config::RagSettings;

/// Configuration for context building.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextBuilderConfig {
    /// Maximum total context length in characters
    pub max_context_length: usize,
    /// Whether to include source citations
    pub include_citations: bool,
    /// Minimum cosine similarity for a hit to be used
    pub similarity_threshold: f32,
}

impl Default for ContextBuilderConfig {
    fn default() -> Self {
        Self {
            max_context_length: 6000,
            include_citations: true,
            similarity_threshold: 0.2,
        }
    }
}

impl From<&RagSettings> for ContextBuilderConfig {
    fn from(settings: &RagSettings) -> Self {
        Self {
            max_context_length: settings.max_context_length,
            include_citations: true,
            similarity_threshold: settings.similarity_threshold,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RAGContextBuilder {
    config: ContextBuilderConfig,
}

impl RAGContextBuilder {
    pub fn new(config: ContextBuilderConfig) -> Self {
        Self { config }
    }

    /// Format search hits (already ordered best first) into a context string.
    ///
    /// Returns an empty string when no hit clears the threshold.
    pub fn build_context(&self, hits: &[ChunkSearchResult]) -> String {
        let mut context = String::new();
        let mut current_length = 0;
        let max_length = self.config.max_context_length;

        let relevant = hits
            .iter()
            .filter(|hit| hit.score >= self.config.similarity_threshold);

        for (i, hit) in relevant.enumerate() {
            let entry = if self.config.include_citations {
                format!(
                    "[{}] (Source: {}, relevance: {:.2})\n{}\n\n",
                    i + 1,
                    hit.chunk.source,
                    hit.score,
                    hit.chunk.content
                )
            } else {
                format!("{}\n\n", hit.chunk.content)
            };

            let addition_length = entry.chars().count();
            if current_length + addition_length > max_length {
                // The best hit is always used, cut to the budget if it must be.
                if context.is_empty() {
                    context.extend(entry.chars().take(max_length));
                }
                break;
            }
            context.push_str(&entry);
            current_length += addition_length;
        }

        context.trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rag::store::StoredChunk;

    fn hit(content: &str, source: &str, score: f32) -> ChunkSearchResult {
        ChunkSearchResult {
            chunk: StoredChunk {
                chunk_id: content.to_string(),
                content: content.to_string(),
                source: source.to_string(),
                metadata: None,
            },
            score,
        }
    }

    #[test]
    fn hits_below_threshold_are_dropped() {
        let builder = RAGContextBuilder::default();
        let hits = vec![
            hit("The sky is blue.", "doc1.pdf", 0.9),
            hit("Mathematics is about numbers.", "doc2.pdf", 0.05),
        ];

        let context = builder.build_context(&hits);

        assert!(context.contains("[1] (Source: doc1.pdf, relevance: 0.90)"));
        assert!(context.contains("The sky is blue."));
        assert!(!context.contains("Mathematics"));
    }

    #[test]
    fn context_stops_at_length_budget() {
        let builder = RAGContextBuilder::new(ContextBuilderConfig {
            max_context_length: 80,
            include_citations: false,
            similarity_threshold: 0.0,
        });
        let hits = vec![
            hit(&"a".repeat(50), "doc", 0.9),
            hit(&"b".repeat(50), "doc", 0.8),
        ];

        let context = builder.build_context(&hits);

        assert_eq!(context, "a".repeat(50));
    }

    #[test]
    fn oversized_best_hit_is_truncated_to_budget() {
        let builder = RAGContextBuilder::new(ContextBuilderConfig {
            max_context_length: 6000,
            include_citations: true,
            similarity_threshold: 0.2,
        });
        let hits = vec![
            hit(&"x".repeat(8000), "big.pdf", 0.95),
            hit("small", "other.pdf", 0.9),
        ];

        let context = builder.build_context(&hits);

        assert!(context.starts_with("[1] (Source: big.pdf, relevance: 0.95)"));
        assert_eq!(context.chars().count(), 6000);
        assert!(!context.contains("small"));
    }

    #[test]
    fn no_relevant_hits_gives_empty_context() {
        let builder = RAGContextBuilder::default();
        assert!(builder.build_context(&[]).is_empty());
        assert!(builder.build_context(&[hit("x", "doc", 0.0)]).is_empty());
    }
}
