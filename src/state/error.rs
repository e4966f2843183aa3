use thiserror::Error;

use crate::core::errors::ConfigError;
use crate::llm::LlmError;

#[derive(Debug, Error)]
pub enum InitializationError {
    #[error("Failed to load configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to initialize LLM service: {0}")]
    Llm(#[from] LlmError),
}
