use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::time::Instant;

use super::message::Message;
use crate::chain::ConversationChain;

/// Outcome of the last user action, shown next to the upload form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum SessionStatus {
    Idle,
    Ready,
    Warning(String),
    Failed(String),
}

/// Everything one browser session owns.
pub struct SessionState {
    pub conversation: Option<Arc<dyn ConversationChain>>,
    pub chat_history: Vec<Message>,
    pub status: SessionStatus,
    pub documents: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub last_active: Instant,
}

impl SessionState {
    pub fn is_ready(&self) -> bool {
        self.conversation.is_some()
    }

    pub fn touch(&mut self) {
        self.last_active = Instant::now();
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            conversation: None,
            chat_history: Vec::new(),
            status: SessionStatus::Idle,
            documents: Vec::new(),
            created_at: Utc::now(),
            last_active: Instant::now(),
        }
    }
}

impl fmt::Debug for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionState")
            .field("ready", &self.is_ready())
            .field("chat_history", &self.chat_history.len())
            .field("status", &self.status)
            .field("documents", &self.documents)
            .field("created_at", &self.created_at)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn initial_state_is_empty_and_idle() {
        let state = SessionState::default();
        assert!(!state.is_ready());
        assert!(state.chat_history.is_empty());
        assert!(state.documents.is_empty());
        assert_eq!(state.status, SessionStatus::Idle);
    }

    #[test]
    fn status_serializes_with_kind_tag() {
        assert_eq!(
            serde_json::to_value(SessionStatus::Idle).unwrap(),
            json!({ "kind": "idle" })
        );
        assert_eq!(
            serde_json::to_value(SessionStatus::Failed("boom".to_string())).unwrap(),
            json!({ "kind": "failed", "message": "boom" })
        );
    }
}
