//! Server-rendered chat page.

use ammonia::clean_text;

use crate::session::{Message, SessionState, SessionStatus};

const STYLE: &str = r#"
body {
    font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif;
    margin: 0;
    display: flex;
    min-height: 100vh;
    color: #31333F;
}
.sidebar {
    width: 300px;
    padding: 24px;
    background-color: #F0F2F6;
    box-sizing: border-box;
}
.main {
    flex: 1;
    padding: 24px 48px;
}
.caption {
    color: #808495;
    margin-top: -8px;
}
.chat-container {
    max-height: 500px;
    overflow-y: auto;
    padding: 10px;
}
.user-msg {
    background-color: #DCF8C6;
    padding: 10px;
    border-radius: 12px;
    margin: 8px 0;
    text-align: left;
    width: fit-content;
    max-width: 80%;
    white-space: pre-wrap;
}
.bot-msg {
    background-color: #F1F0F0;
    padding: 10px;
    border-radius: 12px;
    margin: 8px 0;
    text-align: left;
    width: fit-content;
    max-width: 80%;
    white-space: pre-wrap;
}
.status {
    padding: 10px;
    border-radius: 8px;
    margin: 12px 0;
}
.status-ready { background-color: #DFF5E1; }
.status-warning { background-color: #FFF4D6; }
.status-error { background-color: #FDE2E1; }
.info {
    background-color: #E6F0FB;
    padding: 10px;
    border-radius: 8px;
}
.question input[type=text] {
    width: 80%;
    padding: 8px;
    border-radius: 10px;
    border: 1px solid #CCC;
}
.download {
    display: block;
    margin-top: 8px;
}
"#;

const PLACEHOLDER: &str = "Example: What is the main topic of the document?";

/// Renders the whole page for one session.
pub fn render_page(state: &SessionState, model_label: &str) -> String {
    let mut html = String::with_capacity(4096);
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<title>AI PDF Chatbot</title>\n<style>");
    html.push_str(STYLE);
    html.push_str("</style>\n</head>\n<body>\n");

    render_sidebar(&mut html, state);

    html.push_str("<main class=\"main\">\n");
    html.push_str(&format!(
        "<h1>📄 AI PDF Chatbot (Local {})</h1>\n",
        clean_text(model_label)
    ));
    html.push_str(&format!(
        "<p class=\"caption\">Chat with your documents privately using {}</p>\n",
        clean_text(model_label)
    ));
    html.push_str("<h3>💬 Chat</h3>\n");
    html.push_str(&render_transcript(&state.chat_history));
    render_question_form(&mut html, state.is_ready());
    html.push_str("</main>\n</body>\n</html>\n");
    html
}

fn render_sidebar(html: &mut String, state: &SessionState) {
    html.push_str("<aside class=\"sidebar\">\n<h2>📂 Upload Documents</h2>\n");
    html.push_str(
        "<form action=\"/process\" method=\"post\" enctype=\"multipart/form-data\">\n\
         <label for=\"pdf_docs\">Upload your PDF files</label><br>\n\
         <input id=\"pdf_docs\" type=\"file\" name=\"pdf_docs\" accept=\".pdf,application/pdf\" multiple><br><br>\n\
         <button type=\"submit\">🚀 Process PDFs</button>\n</form>\n",
    );

    if let Some(banner) = status_banner(state) {
        html.push_str(&banner);
    }

    if !state.documents.is_empty() {
        html.push_str("<ul class=\"documents\">\n");
        for name in &state.documents {
            html.push_str(&format!("<li>{}</li>\n", clean_text(name)));
        }
        html.push_str("</ul>\n");
    }

    html.push_str("<hr>\n<p class=\"info\">🔒 Runs fully local. Your data never leaves your system.</p>\n<hr>\n");

    if !state.chat_history.is_empty() {
        html.push_str(
            "<h3>💾 Export Conversation</h3>\n\
             <a class=\"download\" href=\"/export\" download=\"conversation.txt\">Download as TXT</a>\n\
             <a class=\"download\" href=\"/api/export?format=json\" download=\"conversation.json\">Download as JSON</a>\n",
        );
    }
    html.push_str("</aside>\n");
}

fn status_banner(state: &SessionState) -> Option<String> {
    let (class, text) = match &state.status {
        SessionStatus::Idle => return None,
        SessionStatus::Ready => ("status-ready", "✅ Ready! Ask your questions.".to_string()),
        SessionStatus::Warning(message) => ("status-warning", clean_text(message)),
        SessionStatus::Failed(message) => ("status-error", format!("❌ {}", clean_text(message))),
    };
    Some(format!("<div class=\"status {}\">{}</div>\n", class, text))
}

/// Chat bubbles in history order; message text is always escaped.
pub fn render_transcript(history: &[Message]) -> String {
    let mut html = String::from("<div class=\"chat-container\">\n");
    for message in history {
        let (class, icon) = match message {
            Message::User(_) => ("user-msg", "🧑‍💻"),
            Message::Assistant(_) => ("bot-msg", "🤖"),
        };
        html.push_str(&format!(
            "<div class=\"{}\">{} {}</div>\n",
            class,
            icon,
            clean_text(message.content())
        ));
    }
    html.push_str("</div>\n");
    html
}

fn render_question_form(html: &mut String, ready: bool) {
    let disabled = if ready { "" } else { " disabled" };
    html.push_str(&format!(
        "<form class=\"question\" action=\"/ask\" method=\"post\">\n\
         <label for=\"question\">Ask something from your PDFs...</label><br>\n\
         <input id=\"question\" type=\"text\" name=\"question\" placeholder=\"{}\" autocomplete=\"off\"{}>\n\
         <button type=\"submit\"{}>Ask</button>\n</form>\n",
        PLACEHOLDER, disabled, disabled
    ));
    if !ready {
        html.push_str("<p class=\"caption\">Process at least one PDF to start asking questions.</p>\n");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_text_is_escaped() {
        let history = vec![
            Message::User("<script>alert(1)</script>".to_string()),
            Message::Assistant("a & b".to_string()),
        ];

        let html = render_transcript(&history);

        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("&amp;"));
        assert!(html.contains("class=\"user-msg\""));
        assert!(html.contains("class=\"bot-msg\""));
    }

    #[test]
    fn question_input_is_disabled_until_ready() {
        let state = SessionState::default();
        let html = render_page(&state, "llama3");

        assert!(html.contains("name=\"question\""));
        assert!(html.contains(" disabled>"));
        assert!(!html.contains("href=\"/export\""));
    }

    #[test]
    fn export_link_and_status_follow_session() {
        let state = SessionState {
            chat_history: vec![
                Message::User("Hi".to_string()),
                Message::Assistant("Hello".to_string()),
            ],
            status: SessionStatus::Warning("Please upload at least one PDF.".to_string()),
            ..Default::default()
        };

        let html = render_page(&state, "llama3");

        assert!(html.contains("href=\"/export\""));
        assert!(html.contains("status-warning"));
        let user = html.find("class=\"user-msg\"").unwrap();
        let bot = html.find("class=\"bot-msg\"").unwrap();
        assert!(user < bot);
    }
}
