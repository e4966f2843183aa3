use axum::extract::multipart::{Multipart, MultipartError};
use axum::http::StatusCode;

use crate::core::errors::ApiError;
use crate::ingest::UploadedPdf;

/// Collects every file part of a multipart upload.
///
/// Parts without a file name (plain form fields, or the empty part a browser
/// sends when no file was picked) are skipped.
pub async fn collect_uploads(
    mut multipart: Multipart,
    max_bytes: usize,
) -> Result<Vec<UploadedPdf>, ApiError> {
    let mut files = Vec::new();
    let mut total = 0usize;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let Some(file_name) = field
            .file_name()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
        else {
            continue;
        };

        let bytes = field.bytes().await.map_err(multipart_error)?;
        if bytes.is_empty() {
            tracing::debug!("Skipping empty upload part {}", file_name);
            continue;
        }

        total += bytes.len();
        if total > max_bytes {
            return Err(ApiError::PayloadTooLarge(format!(
                "uploads exceed {} bytes",
                max_bytes
            )));
        }
        files.push(UploadedPdf::new(file_name, bytes));
    }

    Ok(files)
}

fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(err.body_text())
    } else {
        ApiError::BadRequest(err.body_text())
    }
}
