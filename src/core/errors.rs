use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;

use crate::llm::LlmError;
use crate::rag::StoreError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("service unavailable")]
    ServiceUnavailable,
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("payload too large: {0}")]
    PayloadTooLarge(String),
    #[error("upstream failure: {0}")]
    Upstream(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn internal<E: std::fmt::Display>(err: E) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match &self {
            ApiError::ServiceUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Service unavailable".to_string(),
            ),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ApiError::PayloadTooLarge(msg) => (StatusCode::PAYLOAD_TOO_LARGE, msg.clone()),
            ApiError::Upstream(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = Json(json!({ "error": message }));
        (status, body).into_response()
    }
}

/// Failure anywhere in the ingest → chunk → index → chain pipeline.
///
/// The session controller never lets one of these escape unhandled: it is
/// recorded as the session status and returned to the caller.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("could not read '{file}': {reason}")]
    Extraction { file: String, reason: String },

    #[error("no extractable text found in the uploaded documents")]
    NoText,

    #[error("embedding failed: {0}")]
    Embedding(String),

    #[error("language model request failed: {0}")]
    Llm(#[from] LlmError),

    #[error("vector index error: {0}")]
    Index(#[from] StoreError),
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Extraction { .. } | PipelineError::NoText => {
                ApiError::BadRequest(err.to_string())
            }
            PipelineError::Embedding(_) | PipelineError::Llm(_) => {
                ApiError::Upstream(err.to_string())
            }
            PipelineError::Index(_) => ApiError::Internal(err.to_string()),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid config at '{path}': {reason}")]
    Invalid { path: String, reason: String },

    #[error("config does not match the expected shape: {0}")]
    Shape(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn api_error_renders_json_body_with_status() {
        let response = ApiError::NotFound("nothing to export".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["error"], "nothing to export");
    }

    #[test]
    fn extraction_failures_map_to_bad_request() {
        let err = PipelineError::Extraction {
            file: "broken.pdf".to_string(),
            reason: "not a PDF".to_string(),
        };
        let api: ApiError = err.into();
        assert!(matches!(api, ApiError::BadRequest(msg) if msg.contains("broken.pdf")));
    }

    #[test]
    fn llm_failures_map_to_upstream() {
        let err = PipelineError::Llm(LlmError::InvalidResponse("empty".to_string()));
        let api: ApiError = err.into();
        assert!(matches!(api, ApiError::Upstream(_)));
    }
}
