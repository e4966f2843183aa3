use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;

use pdfchat_backend::core::config::AppPaths;
use pdfchat_backend::core::logging;
use pdfchat_backend::server::router::router;
use pdfchat_backend::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let paths = Arc::new(AppPaths::new());
    logging::init(&paths);

    let state = AppState::initialize(paths)
        .await
        .context("Failed to initialize application state")?;

    if !state.llm.health_check().await {
        tracing::warn!(
            "LLM server at {} is not reachable yet; processing will fail until it is",
            state.settings.llm.base_url
        );
    }

    let _sweeper = state.spawn_session_sweeper();

    let bind_addr = format!(
        "{}:{}",
        state.settings.server.host, state.settings.server.port
    );
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;
    let addr = listener.local_addr()?;

    println!("PDFCHAT_PORT={}", addr.port());
    tracing::info!("Listening on http://{}", addr);

    let app: Router = router(state.clone());
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
