use std::sync::Arc;

use crate::core::config::{AppPaths, AppSettings, ConfigService};
use crate::llm::LlmService;
use crate::pipeline::{LocalPipeline, RagPipeline};
use crate::session::{SessionController, SessionRegistry};

pub mod error;

use error::InitializationError;

/// Application state shared across all routes and the session sweeper.
pub struct AppState {
    pub settings: Arc<AppSettings>,
    pub llm: LlmService,
    pub controller: SessionController,
    pub sessions: SessionRegistry,
}

impl AppState {
    /// Loads configuration and wires the LLM provider into the document pipeline.
    ///
    /// The LLM server is not contacted here; a missing server only shows up in
    /// `/health` and when documents are processed.
    pub async fn initialize(paths: Arc<AppPaths>) -> Result<Arc<Self>, InitializationError> {
        let settings = ConfigService::new(paths).load_settings()?;

        let llm = LlmService::from_settings(&settings.llm)?;
        tracing::info!(
            provider = llm.provider_name(),
            base_url = %settings.llm.base_url,
            chat_model = %settings.llm.chat_model,
            embedding_model = %settings.llm.embedding_model,
            "LLM provider configured"
        );

        let pipeline = Arc::new(LocalPipeline::new(llm.clone(), settings.rag.clone()));
        Ok(Arc::new(Self::with_pipeline(settings, llm, pipeline)))
    }

    pub fn with_pipeline(
        settings: AppSettings,
        llm: LlmService,
        pipeline: Arc<dyn RagPipeline>,
    ) -> Self {
        Self {
            settings: Arc::new(settings),
            llm,
            controller: SessionController::new(pipeline),
            sessions: SessionRegistry::new(),
        }
    }

    /// Periodically evicts idle sessions until the runtime shuts down.
    pub fn spawn_session_sweeper(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let state = Arc::clone(self);
        tokio::spawn(async move {
            let ttl = state.settings.session.idle_ttl();
            let mut interval = tokio::time::interval(state.settings.session.sweep_interval());
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                state.sessions.evict_idle(ttl).await;
            }
        })
    }
}
