pub mod error;
pub mod ollama;
pub mod openai_compat;
pub mod provider;
pub mod service;
pub mod types;

#[cfg(test)]
pub(crate) mod tests;

pub use error::LlmError;
pub use provider::LlmProvider;
pub use service::LlmService;
pub use types::{ChatMessage, ChatRequest};
