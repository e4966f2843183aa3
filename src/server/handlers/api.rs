use std::sync::Arc;

use axum::extract::{Multipart, Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use serde_json::json;

use super::attachment;
use crate::core::errors::ApiError;
use crate::server::cookie::resolve_session;
use crate::server::upload::collect_uploads;
use crate::session::AskOutcome;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub question: String,
}

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    pub format: Option<String>,
}

pub async fn get_session(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> impl IntoResponse {
    let (jar, session) = resolve_session(&state, jar).await;

    if session.is_busy() {
        let body = json!({
            "status": { "kind": "processing" },
            "ready": false,
        });
        return (jar, Json(body));
    }

    let session = session.lock().await;
    let body = json!({
        "status": session.status,
        "ready": session.is_ready(),
        "documents": session.documents,
        "chat_history": session.chat_history,
        "created_at": session.created_at,
    });
    (jar, Json(body))
}

pub async fn upload_documents(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let (jar, session) = resolve_session(&state, jar).await;
    let _action = session.begin_action();
    let files = collect_uploads(multipart, state.settings.upload.max_upload_bytes).await?;

    let mut session = session.lock().await;
    let outcome = state.controller.process(&mut session, files).await?;
    Ok((jar, Json(outcome)))
}

pub async fn chat(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(payload): Json<ChatRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (jar, session) = resolve_session(&state, jar).await;
    let _action = session.begin_action();
    let mut session = session.lock().await;

    let body = match state.controller.ask(&mut session, &payload.question).await? {
        AskOutcome::Answered(history) => json!({
            "outcome": "answered",
            "chat_history": history,
        }),
        AskOutcome::Ignored(reason) => json!({
            "outcome": "ignored",
            "reason": reason,
            "chat_history": session.chat_history,
        }),
    };
    Ok((jar, Json(body)))
}

pub async fn chat_history(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> impl IntoResponse {
    let (jar, session) = resolve_session(&state, jar).await;
    let session = session.lock().await;
    let body = json!({ "chat_history": session.chat_history });
    (jar, Json(body))
}

pub async fn export(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Query(query): Query<ExportQuery>,
) -> Result<Response, ApiError> {
    let (jar, session) = resolve_session(&state, jar).await;
    let session = session.lock().await;

    let transcript = match query.format.as_deref().unwrap_or("txt") {
        "txt" | "text" => state.controller.export(&session),
        "json" => state
            .controller
            .export_json(&session)
            .map_err(ApiError::internal)?,
        other => {
            return Err(ApiError::BadRequest(format!(
                "unsupported export format '{}'",
                other
            )))
        }
    };

    let transcript =
        transcript.ok_or_else(|| ApiError::NotFound("No conversation to export".to_string()))?;
    Ok((jar, attachment(transcript)).into_response())
}

pub async fn reset_session(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> impl IntoResponse {
    let (jar, session) = resolve_session(&state, jar).await;
    let mut session = session.lock().await;
    state.controller.reset(&mut session);
    (jar, Json(json!({ "status": session.status })))
}
