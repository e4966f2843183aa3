use async_trait::async_trait;

use super::error::LlmError;
use super::types::{ChatRequest, ProviderModel};

#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// return the provider name (e.g. "ollama", "openai")
    fn name(&self) -> &'static str;

    /// check if the provider is healthy/reachable
    async fn health_check(&self) -> bool;

    /// list available models from the provider
    async fn list_models(&self) -> Result<Vec<ProviderModel>, LlmError>;

    /// chat completion (non-streaming)
    async fn chat(&self, request: ChatRequest, model_id: &str) -> Result<String, LlmError>;

    /// generate embeddings, one vector per input in input order
    async fn embed(&self, inputs: &[String], model_id: &str) -> Result<Vec<Vec<f32>>, LlmError>;
}
