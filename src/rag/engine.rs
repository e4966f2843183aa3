//! Chunker: splits extracted document text into overlapping windows sized for embedding.

use serde::{Deserialize, Serialize};

use crate::core::config::RagSettings;
use crate::ingest::ExtractedText;

/// Configuration for the chunker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RAGConfig {
    /// Maximum chunk size in characters
    pub chunk_size: usize,
    /// Overlap between consecutive chunks in characters
    pub chunk_overlap: usize,
}

impl Default for RAGConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

impl From<&RagSettings> for RAGConfig {
    fn from(settings: &RagSettings) -> Self {
        Self {
            chunk_size: settings.chunk_size,
            chunk_overlap: settings.chunk_overlap,
        }
    }
}

/// A text chunk with source information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextChunk {
    /// The text content
    pub text: String,
    /// Source identifier (file name)
    pub source: String,
    /// Character offset in original document
    pub start_offset: usize,
    /// Chunk index within the source
    pub chunk_index: usize,
}

/// Splits documents into overlapping chunks.
#[derive(Debug, Clone, Default)]
pub struct RAGEngine {
    config: RAGConfig,
}

impl RAGEngine {
    pub fn new(config: RAGConfig) -> Self {
        Self { config }
    }

    /// Chunks every document, preserving upload order.
    pub fn chunk_documents(&self, extracted: &ExtractedText) -> Vec<TextChunk> {
        extracted
            .documents
            .iter()
            .flat_map(|doc| self.collect_from_text(&doc.text, &doc.file_name))
            .collect()
    }

    /// Split text into overlapping chunks.
    ///
    /// Windows are `chunk_size` characters. A window that does not reach the end
    /// of the text is cut back to the last sentence ending found in its final
    /// 20%, and the next window starts `chunk_overlap` characters before the cut.
    pub fn collect_from_text(&self, text: &str, source: &str) -> Vec<TextChunk> {
        let chunk_size = self.config.chunk_size.max(1);
        let overlap = self.config.chunk_overlap.min(chunk_size - 1);

        let chars: Vec<char> = text.chars().collect();
        let total_chars = chars.len();
        let mut chunks = Vec::new();

        let mut start = 0;
        while start < total_chars {
            let end = (start + chunk_size).min(total_chars);
            let window = &chars[start..end];

            let cut = if end < total_chars {
                sentence_cut(window)
            } else {
                window.len()
            };
            let chunk_end = start + cut;

            let chunk_text: String = chars[start..chunk_end].iter().collect();
            let trimmed = chunk_text.trim();
            if !trimmed.is_empty() {
                chunks.push(TextChunk {
                    text: trimmed.to_string(),
                    source: source.to_string(),
                    start_offset: start,
                    chunk_index: chunks.len(),
                });
            }

            if chunk_end >= total_chars {
                break;
            }
            start = chunk_end.saturating_sub(overlap).max(start + 1);
        }

        chunks
    }
}

/// Length of `window` up to and including the last sentence ending in its final 20%.
fn sentence_cut(window: &[char]) -> usize {
    let search_start = (window.len() * 80) / 100;

    for i in (search_start..window.len()).rev() {
        let is_terminal = matches!(window[i], '.' | '!' | '?');
        let followed_by_space = window.get(i + 1).map_or(false, |c| c.is_whitespace());
        if is_terminal && followed_by_space {
            return i + 1;
        }
    }

    window.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::DocumentText;

    fn engine(chunk_size: usize, chunk_overlap: usize) -> RAGEngine {
        RAGEngine::new(RAGConfig {
            chunk_size,
            chunk_overlap,
        })
    }

    #[test]
    fn short_text_is_a_single_chunk() {
        let chunks = engine(100, 20).collect_from_text("Revenue grew 10%.", "report.pdf");

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "Revenue grew 10%.");
        assert_eq!(chunks[0].source, "report.pdf");
        assert_eq!(chunks[0].start_offset, 0);
    }

    #[test]
    fn chunks_respect_size_and_overlap() {
        let text: String = "abcdefghij".repeat(10);
        let chunks = engine(30, 10).collect_from_text(&text, "doc");

        assert!(chunks.iter().all(|c| c.text.chars().count() <= 30));
        for pair in chunks.windows(2) {
            assert_eq!(pair[1].start_offset, pair[0].start_offset + 20);
            let tail: String = pair[0].text.chars().skip(20).collect();
            assert!(pair[1].text.starts_with(&tail));
        }
        assert!(chunks.last().unwrap().text.ends_with("hij"));
    }

    #[test]
    fn window_is_cut_at_sentence_end_near_its_tail() {
        let text = format!("{} Second sentence continues here.", "x".repeat(44) + ".");
        let chunks = engine(50, 5).collect_from_text(&text, "doc");

        assert!(chunks[0].text.ends_with('.'));
        assert_eq!(chunks[0].text.chars().count(), 45);
        assert_eq!(chunks[1].start_offset, 40);
    }

    #[test]
    fn whitespace_only_text_yields_nothing() {
        assert!(engine(10, 2).collect_from_text("   \n\n  ", "doc").is_empty());
        assert!(engine(10, 2).collect_from_text("", "doc").is_empty());
    }

    #[test]
    fn multibyte_text_is_split_on_char_boundaries() {
        let text = "日本語のテキスト。".repeat(20);
        let chunks = engine(25, 5).collect_from_text(&text, "doc");
        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| c.text.chars().count() <= 25));
    }

    #[test]
    fn documents_keep_their_own_source_and_indices() {
        let extracted = ExtractedText {
            documents: vec![
                DocumentText {
                    file_name: "a.pdf".to_string(),
                    text: "Alpha.".to_string(),
                },
                DocumentText {
                    file_name: "b.pdf".to_string(),
                    text: "Beta.".to_string(),
                },
            ],
        };

        let chunks = engine(100, 10).chunk_documents(&extracted);

        assert_eq!(chunks.len(), 2);
        assert_eq!((chunks[0].source.as_str(), chunks[0].chunk_index), ("a.pdf", 0));
        assert_eq!((chunks[1].source.as_str(), chunks[1].chunk_index), ("b.pdf", 0));
    }
}
