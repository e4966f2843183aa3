use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;

use super::{DocumentText, ExtractedText, UploadedPdf};
use crate::core::errors::PipelineError;

const PDF_MAGIC: &[u8] = b"%PDF-";
/// Readers accept the header anywhere in the first KiB.
const MAGIC_SEARCH_WINDOW: usize = 1024;

/// Extracts the text of every uploaded PDF.
///
/// Files are parsed on the blocking pool, one at a time, in upload order.
/// Byte-identical duplicates are skipped. A file that is not a PDF, cannot
/// be parsed, or makes the parser panic fails the whole run with
/// `PipelineError::Extraction` naming the file.
pub async fn extract_text(files: &[UploadedPdf]) -> Result<ExtractedText, PipelineError> {
    let mut seen = HashSet::new();
    let mut documents = Vec::with_capacity(files.len());

    for file in files {
        if !seen.insert(file.fingerprint()) {
            tracing::warn!("Skipping duplicate upload: {}", file.file_name);
            continue;
        }

        let raw = extract_one(file).await?;
        let text = normalize_text(&raw);
        if text.is_empty() {
            tracing::warn!("No extractable text in {}", file.file_name);
            continue;
        }

        tracing::info!(
            "Extracted {} characters from {}",
            text.chars().count(),
            file.file_name
        );
        documents.push(DocumentText {
            file_name: file.file_name.clone(),
            text,
        });
    }

    let extracted = ExtractedText { documents };
    if extracted.is_empty() {
        return Err(PipelineError::NoText);
    }
    Ok(extracted)
}

async fn extract_one(file: &UploadedPdf) -> Result<String, PipelineError> {
    let extraction_error = |reason: String| PipelineError::Extraction {
        file: file.file_name.clone(),
        reason,
    };

    let window = &file.bytes[..file.bytes.len().min(MAGIC_SEARCH_WINDOW)];
    if !window.windows(PDF_MAGIC.len()).any(|w| w == PDF_MAGIC) {
        return Err(extraction_error("not a PDF file".to_string()));
    }

    let bytes = file.bytes.clone();
    let joined = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes)).await;

    match joined {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(err)) => {
            let message = err.to_string();
            let reason = if message.contains("encrypt") || message.contains("password") {
                "the PDF is password-protected".to_string()
            } else {
                format!("PDF extraction failed: {}", message)
            };
            Err(extraction_error(reason))
        }
        Err(join_err) if join_err.is_panic() => {
            tracing::error!("PDF parser panicked on {}", file.file_name);
            Err(extraction_error(
                "the PDF appears to be corrupted and cannot be processed".to_string(),
            ))
        }
        Err(join_err) => Err(extraction_error(join_err.to_string())),
    }
}

fn hyphen_break() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\w)-\n(\w)").expect("valid hyphen regex"))
}

fn inline_space() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[ \t\u{00A0}\u{000C}]+").expect("valid space regex"))
}

fn blank_lines() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n[ ]*(\n[ ]*)+").expect("valid blank line regex"))
}

/// Tidies raw extractor output: rejoins words hyphenated across line breaks,
/// collapses runs of spaces and tabs, squeezes blank lines to one, and trims.
pub fn normalize_text(raw: &str) -> String {
    let text = raw.replace("\r\n", "\n").replace('\r', "\n");
    let text = hyphen_break().replace_all(&text, "$1$2");
    let text = inline_space().replace_all(&text, " ");
    let text = blank_lines().replace_all(&text, "\n\n");

    text.lines()
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_rejoins_hyphenation_and_collapses_space() {
        let raw = "Revenue   grew\t10%.\r\nThe com-\npany   expanded.\n\n\n\nNext  page.  ";
        assert_eq!(
            normalize_text(raw),
            "Revenue grew 10%.\nThe company expanded.\n\nNext page."
        );
    }

    #[test]
    fn normalize_of_whitespace_is_empty() {
        assert_eq!(normalize_text(" \n\t \n"), "");
    }

    #[tokio::test]
    async fn non_pdf_upload_is_an_extraction_error() {
        let files = vec![UploadedPdf::new("notes.txt", b"just some text".to_vec())];

        let err = extract_text(&files).await.unwrap_err();

        assert!(matches!(
            err,
            PipelineError::Extraction { ref file, ref reason } if file == "notes.txt" && reason == "not a PDF file"
        ));
    }

    #[tokio::test]
    async fn truncated_pdf_is_reported_not_propagated_as_panic() {
        let files = vec![UploadedPdf::new("broken.pdf", b"%PDF-1.7\n%garbage".to_vec())];

        let err = extract_text(&files).await.unwrap_err();

        assert!(matches!(err, PipelineError::Extraction { ref file, .. } if file == "broken.pdf"));
    }

    #[tokio::test]
    async fn empty_upload_set_has_no_text() {
        let err = extract_text(&[]).await.unwrap_err();
        assert!(matches!(err, PipelineError::NoText));
    }
}
