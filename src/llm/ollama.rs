use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::error::LlmError;
use super::provider::LlmProvider;
use super::types::{ChatRequest, ProviderModel};

const PROVIDER: &str = "ollama";

/// Client for Ollama's native REST API.
#[derive(Clone)]
pub struct OllamaProvider {
    base_url: String,
    client: Client,
}

impl OllamaProvider {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(LlmError::http(PROVIDER))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    async fn post_json(&self, path: &str, body: &Value) -> Result<Value, LlmError> {
        let url = format!("{}{}", self.base_url, path);
        let res = self
            .client
            .post(&url)
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
struct TagsResponse {
    #[serde(default)]
    models: Vec<TagInfo>,
}

#[derive(Deserialize)]
struct TagInfo {
    name: String,
    #[serde(default)]
    model: Option<String>,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

fn build_options(request: &ChatRequest) -> Map<String, Value> {
    let mut options = Map::new();
    if let Some(t) = request.temperature {
        options.insert("temperature".to_string(), json!(t));
    }
    if let Some(t) = request.top_p {
        options.insert("top_p".to_string(), json!(t));
    }
    if let Some(n) = request.max_tokens {
        options.insert("num_predict".to_string(), json!(n));
    }
    if let Some(stop) = &request.stop {
        options.insert("stop".to_string(), json!(stop));
    }
    options
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn health_check(&self) -> bool {
        let url = format!("{}/api/tags", self.base_url);
        match self.client.get(&url).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    async fn list_models(&self) -> Result<Vec<ProviderModel>, LlmError> {
        let url = format!("{}/api/tags", self.base_url);
        let res = self
            .client
            .get(&url)
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

        let tags: TagsResponse = res.json().await.map_err(LlmError::http(PROVIDER))?;
        Ok(tags
            .models
            .into_iter()
            .map(|m| ProviderModel {
                id: m.model.unwrap_or_else(|| m.name.clone()),
                name: m.name,
            })
            .collect())
    }

    async fn chat(&self, request: ChatRequest, model_id: &str) -> Result<String, LlmError> {
        let options = build_options(&request);
        let mut body = json!({
            "model": model_id,
            "messages": request.messages,
            "stream": false,
        });
        if !options.is_empty() {
            body["options"] = Value::Object(options);
        }

        let payload = self.post_json("/api/chat", &body).await?;

        payload["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| {
                LlmError::InvalidResponse("ollama chat response has no message content".to_string())
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
        let payload = self.post_json("/api/embed", &body).await?;
        let response: EmbedResponse = serde_json::from_value(payload)
            .map_err(|e| LlmError::InvalidResponse(format!("ollama embed response: {}", e)))?;

        Ok(response.embeddings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::tests::spawn_server;
    use crate::llm::types::ChatMessage;
    use axum::routing::{get, post};
    use axum::{Json, Router};

    fn provider(base_url: &str) -> OllamaProvider {
        OllamaProvider::new(base_url, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn chat_sends_options_and_reads_message_content() {
        let app = Router::new().route(
            "/api/chat",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["model"], "llama3");
                assert_eq!(body["stream"], false);
                assert_eq!(body["options"]["temperature"], 0.5);
                assert_eq!(body["messages"][0]["role"], "user");
                Json(json!({ "message": { "role": "assistant", "content": "Hello there" } }))
            }),
        );
        let base_url = spawn_server(app).await;

        let mut request = ChatRequest::new(vec![ChatMessage::user("Hi")]);
        request.temperature = Some(0.5);
        let answer = provider(&base_url).chat(request, "llama3").await.unwrap();

        assert_eq!(answer, "Hello there");
    }

    #[tokio::test]
    async fn embed_returns_vectors_in_order() {
        let app = Router::new().route(
            "/api/embed",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["input"].as_array().map(Vec::len), Some(2));
                Json(json!({ "embeddings": [[1.0, 0.0], [0.0, 1.0]] }))
            }),
        );
        let base_url = spawn_server(app).await;

        let vectors = provider(&base_url)
            .embed(&["a".to_string(), "b".to_string()], "nomic-embed-text")
            .await
            .unwrap();

        assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    }

    #[tokio::test]
    async fn error_status_is_surfaced_with_body() {
        let app = Router::new().route(
            "/api/chat",
            post(|| async {
                (
                    axum::http::StatusCode::NOT_FOUND,
                    "model 'llama3' not found",
                )
            }),
        );
        let base_url = spawn_server(app).await;

        let err = provider(&base_url)
            .chat(ChatRequest::new(vec![ChatMessage::user("Hi")]), "llama3")
            .await
            .unwrap_err();

        assert!(matches!(err, LlmError::Status { status: 404, ref body, .. } if body.contains("not found")));
    }

    #[tokio::test]
    async fn list_models_and_health_check() {
        let app = Router::new().route(
            "/api/tags",
            get(|| async { Json(json!({ "models": [{ "name": "llama3:latest", "model": "llama3:latest" }] })) }),
        );
        let base_url = spawn_server(app).await;
        let provider = provider(&base_url);

        assert!(provider.health_check().await);
        let models = provider.list_models().await.unwrap();
        assert_eq!(models.len(), 1);
        assert_eq!(models[0].name, "llama3:latest");
    }

    #[tokio::test]
    async fn unreachable_server_is_unhealthy() {
        let provider = provider("http://127.0.0.1:9");
        assert!(!provider.health_check().await);
    }
}
