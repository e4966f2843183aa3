//! Document ingestion: uploaded PDF blobs in, per-document plain text out.

mod pdf;

use bytes::Bytes;
use serde::Serialize;
use sha2::{Digest, Sha256};

pub use pdf::{extract_text, normalize_text};

/// One uploaded file, held only for the duration of a single processing run.
#[derive(Debug, Clone)]
pub struct UploadedPdf {
    pub file_name: String,
    pub bytes: Bytes,
}

impl UploadedPdf {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }

    /// Hex SHA-256 of the file contents.
    pub fn fingerprint(&self) -> String {
        hex::encode(Sha256::digest(&self.bytes))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentText {
    pub file_name: String,
    pub text: String,
}

/// Text of every readable document, in upload order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractedText {
    pub documents: Vec<DocumentText>,
}

impl ExtractedText {
    pub fn file_names(&self) -> Vec<String> {
        self.documents.iter().map(|doc| doc.file_name.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.iter().all(|doc| doc.text.trim().is_empty())
    }
}
