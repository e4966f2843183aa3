//! Conversation chains: stateful question answering over a document index.

mod prompt;
mod retrieval;

use async_trait::async_trait;

use crate::core::errors::PipelineError;
use crate::session::Message;

pub use retrieval::{RetrievalChain, RetrievalConfig};

/// A stateful question-answering handle.
///
/// Each call answers `question` and returns the chain's full updated history,
/// oldest message first.
#[async_trait]
pub trait ConversationChain: Send + Sync {
    async fn ask(&self, question: &str) -> Result<Vec<Message>, PipelineError>;
}
