use std::sync::Arc;

use crate::core::config::{LlmSettings, ProviderKind};
use crate::llm::error::LlmError;
use crate::llm::ollama::OllamaProvider;
use crate::llm::openai_compat::OpenAiCompatProvider;
use crate::llm::provider::LlmProvider;
use crate::llm::types::{ChatMessage, ChatRequest};

/// Configured chat and embedding models on top of one provider.
#[derive(Clone)]
pub struct LlmService {
    provider: Arc<dyn LlmProvider>,
    settings: Arc<LlmSettings>,
}

impl LlmService {
    pub fn new(provider: Arc<dyn LlmProvider>, settings: LlmSettings) -> Self {
        Self {
            provider,
            settings: Arc::new(settings),
        }
    }

    pub fn from_settings(settings: &LlmSettings) -> Result<Self, LlmError> {
        let timeout = settings.request_timeout();
        let provider: Arc<dyn LlmProvider> = match settings.provider {
            ProviderKind::Ollama => Arc::new(OllamaProvider::new(&settings.base_url, timeout)?),
            ProviderKind::Openai => Arc::new(OpenAiCompatProvider::new(
                &settings.base_url,
                settings.api_key.clone(),
                timeout,
            )?),
        };
        Ok(Self::new(provider, settings.clone()))
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Configured chat and embedding models the provider does not list.
    ///
    /// Fails when the provider cannot be reached.
    pub async fn missing_models(&self) -> Result<Vec<String>, LlmError> {
        let available = self.provider.list_models().await?;
        Ok([&self.settings.chat_model, &self.settings.embedding_model]
            .into_iter()
            .filter(|wanted| !available.iter().any(|m| model_matches(wanted, &m.id)))
            .cloned()
            .collect())
    }

    pub async fn health_check(&self) -> bool {
        self.provider.health_check().await
    }

    pub async fn chat(&self, messages: Vec<ChatMessage>) -> Result<String, LlmError> {
        let request = ChatRequest::new(messages).with_settings(&self.settings);
        tracing::debug!(
            provider = self.provider.name(),
            model = %self.settings.chat_model,
            messages = request.messages.len(),
            "Sending chat request"
        );
        let answer = self
            .provider
            .chat(request, &self.settings.chat_model)
            .await?;
        Ok(answer.trim().to_string())
    }

    pub async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, LlmError> {
        let vectors = self
            .provider
            .embed(inputs, &self.settings.embedding_model)
            .await?;

        if vectors.len() != inputs.len() {
            return Err(LlmError::InvalidResponse(format!(
                "expected {} embeddings, got {}",
                inputs.len(),
                vectors.len()
            )));
        }
        Ok(vectors)
    }
}

/// Ollama lists untagged models as `name:latest`.
fn model_matches(configured: &str, listed: &str) -> bool {
    listed == configured
        || (!configured.contains(':') && listed.strip_suffix(":latest") == Some(configured))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::tests::{test_llm_settings, FakeProvider};

    #[tokio::test]
    async fn chat_uses_configured_model_and_sampling() {
        let provider = Arc::new(FakeProvider::with_replies(["  An answer.  "]));
        let mut settings = test_llm_settings();
        settings.temperature = Some(0.1);
        let service = LlmService::new(provider.clone(), settings);

        let answer = service.chat(vec![ChatMessage::user("Q")]).await.unwrap();

        assert_eq!(answer, "An answer.");
        let calls = provider.chat_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "test-chat");
        assert_eq!(calls[0].1.temperature, Some(0.1));
    }

    #[tokio::test]
    async fn embed_rejects_count_mismatch() {
        let provider = Arc::new(FakeProvider::default().dropping_embeddings());
        let service = LlmService::new(provider, test_llm_settings());

        let err = service
            .embed(&["one".to_string(), "two".to_string()])
            .await
            .unwrap_err();

        assert!(matches!(err, LlmError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn missing_models_reports_unlisted_configured_models() {
        let mut settings = test_llm_settings();
        settings.embedding_model = "nomic-embed-text".to_string();
        let service = LlmService::new(Arc::new(FakeProvider::default()), settings);

        let missing = service.missing_models().await.unwrap();

        assert_eq!(missing, vec!["nomic-embed-text".to_string()]);
    }

    #[test]
    fn untagged_model_matches_latest_tag() {
        assert!(model_matches("llama3", "llama3:latest"));
        assert!(model_matches("llama3:8b", "llama3:8b"));
        assert!(!model_matches("llama3:8b", "llama3:latest"));
        assert!(!model_matches("llama3", "llama3.1:latest"));
    }

    #[test]
    fn from_settings_picks_provider_kind() {
        let mut settings = test_llm_settings();
        settings.provider = ProviderKind::Openai;
        let service = LlmService::from_settings(&settings).unwrap();
        assert_eq!(service.provider_name(), "openai");

        settings.provider = ProviderKind::Ollama;
        let service = LlmService::from_settings(&settings).unwrap();
        assert_eq!(service.provider_name(), "ollama");
    }
}
