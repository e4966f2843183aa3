use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::state::AppState;

/// Liveness plus a check that the configured models exist on the LLM server.
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let (llm_reachable, missing_models) = match state.llm.missing_models().await {
        Ok(missing) => {
            if !missing.is_empty() {
                tracing::warn!("Configured models not available: {:?}", missing);
            }
            (true, missing)
        }
        Err(err) => {
            tracing::debug!("LLM server check failed: {}", err);
            (false, Vec::new())
        }
    };

    Json(json!({
        "status": "ok",
        "provider": state.llm.provider_name(),
        "chat_model": state.settings.llm.chat_model,
        "llm_reachable": llm_reachable,
        "missing_models": missing_models,
        "sessions": state.sessions.len().await
    }))
}
