use crate::llm::ChatMessage;
use crate::session::Message;

const CONDENSE_INSTRUCTIONS: &str = "Rewrite the follow-up question so that it can be understood \
without the conversation above it. Keep the language of the question. Reply with the rewritten \
question only.";

const ANSWER_INSTRUCTIONS: &str = "You answer questions about the user's documents. Use only the \
excerpts below. If the excerpts do not contain the answer, say that you don't know instead of \
guessing. Keep answers concise.";

const NO_CONTEXT: &str = "(no relevant excerpts were found)";

fn format_history(history: &[Message]) -> String {
    history
        .iter()
        .map(|message| match message {
            Message::User(content) => format!("Human: {}", content),
            Message::Assistant(content) => format!("Assistant: {}", content),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Messages asking the model to turn a follow-up into a standalone question.
pub fn condense_messages(history: &[Message], question: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(CONDENSE_INSTRUCTIONS),
        ChatMessage::user(format!(
            "Conversation:\n{}\n\nFollow-up question: {}\n\nStandalone question:",
            format_history(history),
            question
        )),
    ]
}

/// Messages asking the model to answer `question` from `context`.
pub fn answer_messages(context: &str, question: &str) -> Vec<ChatMessage> {
    let context = if context.trim().is_empty() {
        NO_CONTEXT
    } else {
        context
    };
    vec![
        ChatMessage::system(format!("{}\n\nExcerpts:\n{}", ANSWER_INSTRUCTIONS, context)),
        ChatMessage::user(question.to_string()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn condense_prompt_lists_history_in_order() {
        let history = vec![
            Message::User("What grew?".to_string()),
            Message::Assistant("Revenue grew 10%.".to_string()),
        ];

        let messages = condense_messages(&history, "By how much?");

        assert_eq!(messages[0].role, "system");
        assert!(messages[1]
            .content
            .contains("Human: What grew?\nAssistant: Revenue grew 10%."));
        assert!(messages[1].content.contains("Follow-up question: By how much?"));
    }

    #[test]
    fn answer_prompt_marks_missing_context() {
        let messages = answer_messages("  ", "What grew?");
        assert!(messages[0].content.contains(NO_CONTEXT));
        assert_eq!(messages[1], ChatMessage::user("What grew?"));
    }
}
