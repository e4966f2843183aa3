use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde_json::{json, Value};

use super::error::LlmError;
use super::provider::LlmProvider;
use super::types::{ChatRequest, ProviderModel};

const PROVIDER: &str = "openai";

/// Client for servers exposing the OpenAI REST dialect (LM Studio, llama.cpp server, vLLM).
#[derive(Clone)]
pub struct OpenAiCompatProvider {
    base_url: String,
    api_key: Option<String>,
    client: Client,
}

impl OpenAiCompatProvider {
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(LlmError::http(PROVIDER))?;
        let base_url = base_url.trim_end_matches('/');
        let base_url = base_url.strip_suffix("/v1").unwrap_or(base_url);
        Ok(Self {
            base_url: base_url.to_string(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            client,
        })
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => builder.bearer_auth(key),
            None => builder,
        }
    }

    async fn post_json(&self, path: &str, body: &Value) -> Result<Value, LlmError> {
        let url = format!("{}{}", self.base_url, path);
        let res = self
            .authorized(self.client.post(&url))
            .json(body)
            .send()
            .await
            .map_err(LlmError::http(PROVIDER))?;

        if !res.status().is_success() {
            let status = res.status().as_u16();
            let body = res.text().await.unwrap_or_default();
            return Err(LlmError::Status {
                provider: PROVIDER,
                status,
                body,
            });
        }

        res.json().await.map_err(LlmError::http(PROVIDER))
    }
}

#[derive(Deserialize)]
struct OpenAiModelsResponse {
    data: Vec<OpenAiModelInfo>,
}

#[derive(Deserialize)]
struct OpenAiModelInfo {
    id: String,
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingItem>,
}

#[derive(Deserialize)]
struct EmbeddingItem {
    #[serde(default)]
    index: Option<usize>,
    embedding: Vec<f32>,
}

#[async_trait]
impl LlmProvider for OpenAiCompatProvider {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn health_check(&self) -> bool {
        let url = format!("{}/v1/models", self.base_url);
        match self.authorized(self.client.get(&url)).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    async fn list_models(&self) -> Result<Vec<ProviderModel>, LlmError> {
        let url = format!("{}/v1/models", self.base_url);
        let res = self
            .authorized(self.client.get(&url))
            .send()
            .await
            .map_err(LlmError::http(PROVIDER))?;

        if !res.status().is_success() {
            return Err(LlmError::Status {
                provider: PROVIDER,
                status: res.status().as_u16(),
                body: res.text().await.unwrap_or_default(),
            });
        }

        let response: OpenAiModelsResponse =
            res.json().await.map_err(LlmError::http(PROVIDER))?;

        Ok(response
            .data
            .into_iter()
            .map(|m| ProviderModel {
                id: m.id.clone(),
                name: m.id,
            })
            .collect())
    }

    async fn chat(&self, request: ChatRequest, model_id: &str) -> Result<String, LlmError> {
        let mut body = json!({
            "model": model_id,
            "messages": request.messages,
            "stream": false,
        });

        if let Some(obj) = body.as_object_mut() {
            if let Some(t) = request.temperature { obj.insert("temperature".to_string(), json!(t)); }
            if let Some(t) = request.top_p { obj.insert("top_p".to_string(), json!(t)); }
            if let Some(t) = request.max_tokens { obj.insert("max_tokens".to_string(), json!(t)); }
            if let Some(s) = request.stop { obj.insert("stop".to_string(), json!(s)); }
        }

        let payload = self.post_json("/v1/chat/completions", &body).await?;

        payload["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| {
                LlmError::InvalidResponse("chat completion has no message content".to_string())
            })
    }

    async fn embed(&self, inputs: &[String], model_id: &str) -> Result<Vec<Vec<f32>>, LlmError> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }

        let body = json!({
            "model": model_id,
            "input": inputs,
        });
        let payload = self.post_json("/v1/embeddings", &body).await?;
        let mut response: EmbeddingsResponse = serde_json::from_value(payload)
            .map_err(|e| LlmError::InvalidResponse(format!("embeddings response: {}", e)))?;

        // Servers may return items out of order; `index` is authoritative when present.
        response.data.sort_by_key(|item| item.index.unwrap_or(usize::MAX));
        Ok(response.data.into_iter().map(|item| item.embedding).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::tests::spawn_server;
    use crate::llm::types::ChatMessage;
    use axum::http::HeaderMap;
    use axum::routing::post;
    use axum::{Json, Router};

    #[tokio::test]
    async fn chat_reads_first_choice_and_sends_bearer_key() {
        let app = Router::new().route(
            "/v1/chat/completions",
            post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                assert_eq!(
                    headers.get("authorization").and_then(|v| v.to_str().ok()),
                    Some("Bearer sk-local")
                );
                assert_eq!(body["max_tokens"], 64);
                Json(json!({ "choices": [{ "message": { "role": "assistant", "content": "Sure." } }] }))
            }),
        );
        let base_url = spawn_server(app).await;
        let provider = OpenAiCompatProvider::new(
            &format!("{}/v1/", base_url),
            Some("sk-local".to_string()),
            Duration::from_secs(5),
        )
        .unwrap();

        let mut request = ChatRequest::new(vec![ChatMessage::user("Hi")]);
        request.max_tokens = Some(64);
        let answer = provider.chat(request, "local-model").await.unwrap();

        assert_eq!(answer, "Sure.");
    }

    #[tokio::test]
    async fn embeddings_are_reordered_by_index() {
        let app = Router::new().route(
            "/v1/embeddings",
            post(|| async {
                Json(json!({ "data": [
                    { "index": 1, "embedding": [0.0, 1.0] },
                    { "index": 0, "embedding": [1.0, 0.0] }
                ]}))
            }),
        );
        let base_url = spawn_server(app).await;
        let provider = OpenAiCompatProvider::new(&base_url, None, Duration::from_secs(5)).unwrap();

        let vectors = provider
            .embed(&["first".to_string(), "second".to_string()], "embed")
            .await
            .unwrap();

        assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    }

    #[tokio::test]
    async fn missing_content_is_invalid_response() {
        let app = Router::new().route(
            "/v1/chat/completions",
            post(|| async { Json(json!({ "choices": [] })) }),
        );
        let base_url = spawn_server(app).await;
        let provider = OpenAiCompatProvider::new(&base_url, None, Duration::from_secs(5)).unwrap();

        let err = provider
            .chat(ChatRequest::new(vec![ChatMessage::user("Hi")]), "m")
            .await
            .unwrap_err();

        assert!(matches!(err, LlmError::InvalidResponse(_)));
    }
}
