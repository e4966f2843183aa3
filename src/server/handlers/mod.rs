pub mod api;
pub mod health;
pub mod page;

use axum::http::header;
use axum::response::{IntoResponse, Response};

use crate::session::Transcript;

/// Serves a transcript as a file download.
pub(crate) fn attachment(transcript: Transcript) -> Response {
    let disposition = format!("attachment; filename=\"{}\"", transcript.file_name);
    (
        [
            (header::CONTENT_TYPE, transcript.mime.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        transcript.content,
    )
        .into_response()
}
