use crate::core::mime::DocumentFormat;
use crate::text::TextBlock;
use crate::{FlashdocError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// An uploaded file submitted for extraction.
#[derive(Debug, Clone)]
pub struct JobRequest {
    pub file: Vec<u8>,
    pub name: String,
    /// MIME type reported by the uploader, if any.
    pub declared_type: Option<String>,
    /// Size reported by the uploader; the byte length unless overridden.
    pub size: u64,
}

impl JobRequest {
    pub fn new(name: impl Into<String>, file: Vec<u8>) -> Self {
        let size = file.len() as u64;
        Self {
            file,
            name: name.into(),
            declared_type: None,
            size,
        }
    }

    pub fn with_declared_type(mut self, mime_type: impl Into<String>) -> Self {
        self.declared_type = Some(mime_type.into());
        self
    }

    /// Read a file from disk into a request named after the file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| FlashdocError::validation(format!("Invalid file name: {}", path.display())))?;
        Ok(Self::new(name, bytes))
    }
}

/// Final output of a successful job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    pub title: String,
    pub format: DocumentFormat,
    /// Normalized text.
    pub text: String,
    /// Extractor output before normalization.
    pub raw_text: String,
    pub preview: String,
    pub structured: Vec<TextBlock>,
    pub metadata: ExtractionMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionMetadata {
    pub file_name: String,
    pub file_size: u64,
    pub file_type: String,
    pub char_count: usize,
    pub word_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ocr_page_count: Option<usize>,
}

/// File name with its last extension removed: `notes.v2.pdf` -> `notes.v2`.
pub fn title_from_file_name(name: &str) -> String {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !ext.is_empty() && !ext.contains(['/', '\\']) => stem.to_string(),
        _ => name.to_string(),
    }
}
