use super::message::Message;

/// A downloadable rendering of the chat history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    pub file_name: &'static str,
    pub mime: &'static str,
    pub content: String,
}

/// `"User: …\n\n"` / `"Assistant: …\n\n"` per message, in order.
fn transcript_text(history: &[Message]) -> String {
    history
        .iter()
        .map(|message| format!("{}: {}\n\n", message.speaker(), message.content()))
        .collect()
}

/// Plain-text transcript, or `None` when there is nothing to export.
pub fn export_text(history: &[Message]) -> Option<Transcript> {
    if history.is_empty() {
        return None;
    }
    Some(Transcript {
        file_name: "conversation.txt",
        mime: "text/plain; charset=utf-8",
        content: transcript_text(history),
    })
}

/// JSON array of `{role, content}`, or `None` when there is nothing to export.
pub fn export_json(history: &[Message]) -> Result<Option<Transcript>, serde_json::Error> {
    if history.is_empty() {
        return Ok(None);
    }
    Ok(Some(Transcript {
        file_name: "conversation.json",
        mime: "application/json",
        content: serde_json::to_string_pretty(history)?,
    }))
}
