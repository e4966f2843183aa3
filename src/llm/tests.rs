//! Test doubles shared by the LLM, chain and pipeline tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use axum::Router;
use tokio::net::TcpListener;

use crate::core::config::{LlmSettings, ProviderKind};
use crate::llm::error::LlmError;
use crate::llm::provider::LlmProvider;
use crate::llm::types::{ChatRequest, ProviderModel};

/// Serves `app` on an ephemeral local port and returns its base URL.
pub(crate) async fn spawn_server(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

pub(crate) fn test_llm_settings() -> LlmSettings {
    LlmSettings {
        provider: ProviderKind::Ollama,
        base_url: "http://127.0.0.1:11434".to_string(),
        chat_model: "test-chat".to_string(),
        embedding_model: "test-embed".to_string(),
        temperature: None,
        top_p: None,
        max_tokens: None,
        api_key: None,
        request_timeout_secs: 5,
    }
}

/// Letter-frequency vector; texts sharing words land close together.
pub(crate) fn letter_embedding(text: &str) -> Vec<f32> {
    let mut counts = vec![0.0f32; 26];
    for c in text.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() {
            counts[(c as u8 - b'a') as usize] += 1.0;
        }
    }
    counts
}

/// Scripted provider: replies are popped in order, embeddings are letter frequencies.
#[derive(Default)]
pub(crate) struct FakeProvider {
    replies: Mutex<VecDeque<String>>,
    chat_calls: Mutex<Vec<(String, ChatRequest)>>,
    embed_calls: Mutex<usize>,
    fail_chat: bool,
    fail_embed: bool,
    drop_embeddings: bool,
}

impl FakeProvider {
    pub(crate) fn with_replies<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
            ..Default::default()
        }
    }

    pub(crate) fn failing_chat(mut self) -> Self {
        self.fail_chat = true;
        self
    }

    pub(crate) fn failing_embed(mut self) -> Self {
        self.fail_embed = true;
        self
    }

    pub(crate) fn dropping_embeddings(mut self) -> Self {
        self.drop_embeddings = true;
        self
    }

    pub(crate) fn chat_calls(&self) -> Vec<(String, ChatRequest)> {
        self.chat_calls.lock().unwrap().clone()
    }

    pub(crate) fn embed_calls(&self) -> usize {
        *self.embed_calls.lock().unwrap()
    }
}

#[async_trait]
impl LlmProvider for FakeProvider {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn health_check(&self) -> bool {
        true
    }

    async fn list_models(&self) -> Result<Vec<ProviderModel>, LlmError> {
        Ok(["test-chat", "test-embed"]
            .into_iter()
            .map(|id| ProviderModel {
                id: id.to_string(),
                name: id.to_string(),
            })
            .collect())
    }

    async fn chat(&self, request: ChatRequest, model_id: &str) -> Result<String, LlmError> {
        self.chat_calls
            .lock()
            .unwrap()
            .push((model_id.to_string(), request));
        if self.fail_chat {
            return Err(LlmError::Status {
                provider: "fake",
                status: 500,
                body: "model crashed".to_string(),
            });
        }
        Ok(self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| "I don't know.".to_string()))
    }

    async fn embed(&self, inputs: &[String], _model_id: &str) -> Result<Vec<Vec<f32>>, LlmError> {
        *self.embed_calls.lock().unwrap() += 1;
        if self.fail_embed {
            return Err(LlmError::InvalidResponse("embedding model missing".to_string()));
        }
        let mut vectors: Vec<Vec<f32>> = inputs.iter().map(|s| letter_embedding(s)).collect();
        if self.drop_embeddings {
            vectors.pop();
        }
        Ok(vectors)
    }
}
