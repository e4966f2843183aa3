use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::prompt::{answer_messages, condense_messages};
use super::ConversationChain;
use crate::core::config::RagSettings;
use crate::core::errors::PipelineError;
use crate::llm::LlmService;
use crate::rag::{ContextBuilderConfig, RAGContextBuilder, RagStore};
use crate::session::Message;

#[derive(Debug, Clone)]
pub struct RetrievalConfig {
    pub top_k: usize,
    pub context: ContextBuilderConfig,
}

impl From<&RagSettings> for RetrievalConfig {
    fn from(settings: &RagSettings) -> Self {
        Self {
            top_k: settings.top_k,
            context: ContextBuilderConfig::from(settings),
        }
    }
}

/// Conversational retrieval over one document index.
///
/// Follow-up questions are first condensed into a standalone question using
/// the chain's memory; the standalone question drives retrieval and the
/// answer. Memory only grows when a full turn succeeds.
pub struct RetrievalChain {
    llm: LlmService,
    index: Arc<dyn RagStore>,
    context_builder: RAGContextBuilder,
    top_k: usize,
    memory: Mutex<Vec<Message>>,
}

impl RetrievalChain {
    pub fn new(llm: LlmService, index: Arc<dyn RagStore>, config: RetrievalConfig) -> Self {
        Self {
            llm,
            index,
            context_builder: RAGContextBuilder::new(config.context),
            top_k: config.top_k,
            memory: Mutex::new(Vec::new()),
        }
    }

    async fn standalone_question(
        &self,
        history: &[Message],
        question: &str,
    ) -> Result<String, PipelineError> {
        if history.is_empty() {
            return Ok(question.to_string());
        }

        let condensed = self.llm.chat(condense_messages(history, question)).await?;
        if condensed.is_empty() {
            return Ok(question.to_string());
        }
        tracing::debug!("Condensed follow-up into: {}", condensed);
        Ok(condensed)
    }
}

#[async_trait]
impl ConversationChain for RetrievalChain {
    async fn ask(&self, question: &str) -> Result<Vec<Message>, PipelineError> {
        let mut memory = self.memory.lock().await;

        let standalone = self.standalone_question(&memory, question).await?;

        let query = self
            .llm
            .embed(std::slice::from_ref(&standalone))
            .await
            .map_err(|e| PipelineError::Embedding(e.to_string()))?
            .into_iter()
            .next()
            .ok_or_else(|| PipelineError::Embedding("no embedding for question".to_string()))?;

        let hits = self.index.search(&query, self.top_k).await?;
        let context = self.context_builder.build_context(&hits);
        tracing::debug!(
            hits = hits.len(),
            context_chars = context.chars().count(),
            "Retrieved context"
        );

        let answer = self.llm.chat(answer_messages(&context, &standalone)).await?;

        memory.push(Message::User(question.to_string()));
        memory.push(Message::Assistant(answer));
        Ok(memory.clone())
    }
}
