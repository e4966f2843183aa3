//! Form-driven HTML flow: every action redirects back to `/`.

use std::sync::Arc;

use axum::extract::{Multipart, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;

use super::attachment;
use crate::core::errors::ApiError;
use crate::server::cookie::resolve_session;
use crate::server::render::render_page;
use crate::server::upload::collect_uploads;
use crate::session::SessionStatus;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AskForm {
    #[serde(default)]
    pub question: String,
}

pub async fn index(State(state): State<Arc<AppState>>, jar: CookieJar) -> impl IntoResponse {
    let (jar, session) = resolve_session(&state, jar).await;
    let session = session.lock().await;
    let html = render_page(&session, &state.settings.llm.chat_model);
    (jar, Html(html))
}

pub async fn process(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    multipart: Multipart,
) -> impl IntoResponse {
    let (jar, session) = resolve_session(&state, jar).await;
    let _action = session.begin_action();
    let uploads = collect_uploads(multipart, state.settings.upload.max_upload_bytes).await;

    let mut session = session.lock().await;
    match uploads {
        Ok(files) => {
            // Failures end up in the session status and are shown on the page.
            let _ = state.controller.process(&mut session, files).await;
        }
        Err(err) => {
            tracing::warn!("Rejected upload: {}", err);
            session.status = SessionStatus::Failed(err.to_string());
        }
    }
    (jar, Redirect::to("/"))
}

pub async fn ask(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<AskForm>,
) -> impl IntoResponse {
    let (jar, session) = resolve_session(&state, jar).await;
    let _action = session.begin_action();
    let mut session = session.lock().await;
    let _ = state.controller.ask(&mut session, &form.question).await;
    (jar, Redirect::to("/"))
}

pub async fn export(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<Response, ApiError> {
    let (jar, session) = resolve_session(&state, jar).await;
    let session = session.lock().await;
    let transcript = state
        .controller
        .export(&session)
        .ok_or_else(|| ApiError::NotFound("No conversation to export".to_string()))?;
    Ok((jar, attachment(transcript)).into_response())
}
