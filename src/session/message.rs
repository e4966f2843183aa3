use serde::{Deserialize, Serialize};

use crate::llm::ChatMessage;

/// One turn of the conversation.
///
/// Serializes as `{"role": "user" | "assistant", "content": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", content = "content", rename_all = "lowercase")]
pub enum Message {
    User(String),
    Assistant(String),
}

impl Message {
    pub fn content(&self) -> &str {
        match self {
            Message::User(content) | Message::Assistant(content) => content,
        }
    }

    pub fn role(&self) -> &'static str {
        match self {
            Message::User(_) => "user",
            Message::Assistant(_) => "assistant",
        }
    }

    /// Label used in transcripts.
    pub fn speaker(&self) -> &'static str {
        match self {
            Message::User(_) => "User",
            Message::Assistant(_) => "Assistant",
        }
    }
}

impl From<&Message> for ChatMessage {
    fn from(message: &Message) -> Self {
        match message {
            Message::User(content) => ChatMessage::user(content.clone()),
            Message::Assistant(content) => ChatMessage::assistant(content.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_as_role_and_content() {
        let history = vec![
            Message::User("Hi".to_string()),
            Message::Assistant("Hello".to_string()),
        ];

        assert_eq!(
            serde_json::to_value(&history).unwrap(),
            json!([
                { "role": "user", "content": "Hi" },
                { "role": "assistant", "content": "Hello" }
            ])
        );
    }

    #[test]
    fn deserializes_from_role_and_content() {
        let message: Message =
            serde_json::from_value(json!({ "role": "assistant", "content": "Hello" })).unwrap();
        assert_eq!(message, Message::Assistant("Hello".to_string()));
        assert_eq!(message.speaker(), "Assistant");
        assert_eq!(message.content(), "Hello");
    }
}
