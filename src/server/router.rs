use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::core::config::ServerSettings;
use crate::server::handlers::{api, health, page};
use crate::state::AppState;

/// Creates the application router.
///
/// - HTML page and its form actions (`/`, `/process`, `/ask`, `/export`)
/// - JSON API over the same session controller (`/api/...`)
/// - Health check
///
/// Request bodies are capped at `upload.max_upload_bytes`.
pub fn router(state: Arc<AppState>) -> Router {
    let cors_layer = build_cors_layer(&state.settings.server);
    let body_limit = state.settings.upload.max_upload_bytes;

    Router::new()
        .route("/", get(page::index))
        .route("/process", post(page::process))
        .route("/ask", post(page::ask))
        .route("/export", get(page::export))
        .route("/health", get(health::health))
        .route(
            "/api/session",
            get(api::get_session).delete(api::reset_session),
        )
        .route("/api/documents", post(api::upload_documents))
        .route("/api/chat", post(api::chat))
        .route("/api/chat/history", get(api::chat_history))
        .route("/api/export", get(api::export))
        .with_state(state)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(cors_layer)
        .layer(TraceLayer::new_for_http())
}

fn build_cors_layer(server: &ServerSettings) -> CorsLayer {
    let origins = resolve_allowed_origins(server)
        .into_iter()
        .filter_map(|origin| HeaderValue::from_str(&origin).ok())
        .collect::<Vec<_>>();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::ACCEPT, header::CONTENT_TYPE])
        .allow_credentials(true)
}

fn resolve_allowed_origins(server: &ServerSettings) -> Vec<String> {
    let origins = server
        .cors_allowed_origins
        .iter()
        .map(|origin| origin.trim())
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect::<Vec<_>>();

    if origins.is_empty() {
        return default_local_origins(server.port);
    }
    origins
}

fn default_local_origins(port: u16) -> Vec<String> {
    vec![
        format!("http://localhost:{}", port),
        format!("http://127.0.0.1:{}", port),
    ]
}
