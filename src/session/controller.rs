use std::sync::Arc;

use serde::Serialize;

use super::export::{self, Transcript};
use super::message::Message;
use super::state::{SessionState, SessionStatus};
use crate::chain::ConversationChain;
use crate::core::errors::PipelineError;
use crate::ingest::UploadedPdf;
use crate::pipeline::RagPipeline;

pub const EMPTY_UPLOAD_WARNING: &str = "Please upload at least one PDF.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ProcessOutcome {
    Warning { message: String },
    Ready { documents: Vec<String>, chunks: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreReason {
    EmptyQuestion,
    NoConversation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AskOutcome {
    Answered(Vec<Message>),
    Ignored(IgnoreReason),
}

/// Wires user actions on one session to the document pipeline.
///
/// Callers hold the session's lock for the duration of a call, so actions
/// on the same session never interleave.
#[derive(Clone)]
pub struct SessionController {
    pipeline: Arc<dyn RagPipeline>,
}

impl SessionController {
    pub fn new(pipeline: Arc<dyn RagPipeline>) -> Self {
        Self { pipeline }
    }

    /// Builds a fresh conversation from `files`.
    ///
    /// On failure the previous conversation and history stay in place and the
    /// error is recorded as the session status.
    pub async fn process(
        &self,
        state: &mut SessionState,
        files: Vec<UploadedPdf>,
    ) -> Result<ProcessOutcome, PipelineError> {
        state.touch();

        if files.is_empty() {
            state.status = SessionStatus::Warning(EMPTY_UPLOAD_WARNING.to_string());
            return Ok(ProcessOutcome::Warning {
                message: EMPTY_UPLOAD_WARNING.to_string(),
            });
        }

        tracing::info!("Processing {} uploaded file(s)", files.len());
        match self.run_pipeline(&files).await {
            Ok((chain, documents, chunks)) => {
                state.conversation = Some(chain);
                state.documents = documents.clone();
                state.status = SessionStatus::Ready;
                tracing::info!(
                    documents = documents.len(),
                    chunks,
                    "Conversation ready"
                );
                Ok(ProcessOutcome::Ready { documents, chunks })
            }
            Err(err) => {
                tracing::warn!("Processing failed: {}", err);
                state.status = SessionStatus::Failed(err.to_string());
                Err(err)
            }
        }
    }

    async fn run_pipeline(
        &self,
        files: &[UploadedPdf],
    ) -> Result<(Arc<dyn ConversationChain>, Vec<String>, usize), PipelineError> {
        let text = self.pipeline.extract_text(files).await?;
        let chunks = self.pipeline.chunk(&text);
        let chunk_count = chunks.len();
        let index = self.pipeline.build_index(chunks).await?;
        let chain = self.pipeline.make_chain(index);
        Ok((chain, text.file_names(), chunk_count))
    }

    /// Answers `question` through the current conversation.
    ///
    /// Blank questions and questions asked before any document was processed
    /// are ignored without touching the state.
    pub async fn ask(
        &self,
        state: &mut SessionState,
        question: &str,
    ) -> Result<AskOutcome, PipelineError> {
        state.touch();

        if question.trim().is_empty() {
            return Ok(AskOutcome::Ignored(IgnoreReason::EmptyQuestion));
        }
        let Some(conversation) = state.conversation.clone() else {
            tracing::debug!("Question ignored: no conversation yet");
            return Ok(AskOutcome::Ignored(IgnoreReason::NoConversation));
        };

        match conversation.ask(question).await {
            Ok(history) => {
                state.chat_history = history.clone();
                state.status = SessionStatus::Ready;
                Ok(AskOutcome::Answered(history))
            }
            Err(err) => {
                tracing::warn!("Question failed: {}", err);
                state.status = SessionStatus::Failed(err.to_string());
                Err(err)
            }
        }
    }

    pub fn export(&self, state: &SessionState) -> Option<Transcript> {
        export::export_text(&state.chat_history)
    }

    pub fn export_json(
        &self,
        state: &SessionState,
    ) -> Result<Option<Transcript>, serde_json::Error> {
        export::export_json(&state.chat_history)
    }

    pub fn reset(&self, state: &mut SessionState) {
        state.conversation = None;
        state.chat_history.clear();
        state.documents.clear();
        state.status = SessionStatus::Idle;
        state.touch();
    }
}
