//! Format dispatch.
//!
//! Resolves a declared MIME type and a file name to exactly one
//! [`DocumentFormat`]. The declared type wins; the extension is consulted only
//! when the declared type is missing or one of the generic "binary blob"
//! types browsers and proxies send when they don't know better.

use crate::{FlashdocError, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

pub const PDF_MIME_TYPE: &str = "application/pdf";
pub const PLAIN_TEXT_MIME_TYPE: &str = "text/plain";
pub const MARKDOWN_MIME_TYPE: &str = "text/markdown";
pub const DOCX_MIME_TYPE: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// The closed set of formats the pipeline can extract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentFormat {
    PlainText,
    Docx,
    Pdf,
    Image,
}

impl DocumentFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentFormat::PlainText => "plain-text",
            DocumentFormat::Docx => "docx",
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::Image => "image",
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const GENERIC_MIME_TYPES: &[&str] = &[
    "application/octet-stream",
    "binary/octet-stream",
    "application/unknown",
    "application/x-unknown",
];

static MIME_TO_FORMAT: Lazy<HashMap<&'static str, DocumentFormat>> = Lazy::new(|| {
    let mut m = HashMap::new();

    m.insert(PLAIN_TEXT_MIME_TYPE, DocumentFormat::PlainText);
    m.insert(MARKDOWN_MIME_TYPE, DocumentFormat::PlainText);
    m.insert("text/x-markdown", DocumentFormat::PlainText);

    m.insert(DOCX_MIME_TYPE, DocumentFormat::Docx);

    m.insert(PDF_MIME_TYPE, DocumentFormat::Pdf);
    m.insert("application/x-pdf", DocumentFormat::Pdf);

    m
});

static EXT_TO_FORMAT: Lazy<HashMap<&'static str, DocumentFormat>> = Lazy::new(|| {
    let mut m = HashMap::new();

    m.insert("txt", DocumentFormat::PlainText);
    m.insert("text", DocumentFormat::PlainText);
    m.insert("md", DocumentFormat::PlainText);
    m.insert("markdown", DocumentFormat::PlainText);

    m.insert("docx", DocumentFormat::Docx);

    m.insert("pdf", DocumentFormat::Pdf);

    for ext in ["png", "jpg", "jpeg", "gif", "bmp", "webp", "tif", "tiff"] {
        m.insert(ext, DocumentFormat::Image);
    }

    m
});

/// Strip parameters and case from a MIME type: `Text/Plain; charset=utf-8` -> `text/plain`.
fn essence(mime_type: &str) -> String {
    mime_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

fn is_generic(mime: &str) -> bool {
    mime.is_empty() || GENERIC_MIME_TYPES.contains(&mime)
}

/// Map a concrete MIME type to a format, if it is one we handle.
pub fn format_for_mime(mime_type: &str) -> Option<DocumentFormat> {
    let mime = essence(mime_type);
    if let Some(format) = MIME_TO_FORMAT.get(mime.as_str()) {
        return Some(*format);
    }
    if mime.starts_with("image/") && mime != "image/svg+xml" {
        return Some(DocumentFormat::Image);
    }
    None
}

/// Map a file name's extension to a format.
///
/// Uses the built-in table first and falls back to `mime_guess`.
pub fn format_for_file_name(file_name: &str) -> Result<DocumentFormat> {
    let path = Path::new(file_name);
    let extension = path.extension().and_then(|ext| ext.to_str()).map(|s| s.to_lowercase());

    if let Some(ext) = &extension
        && let Some(format) = EXT_TO_FORMAT.get(ext.as_str())
    {
        return Ok(*format);
    }

    if let Some(guess) = mime_guess::from_path(path).first()
        && let Some(format) = format_for_mime(guess.essence_str())
    {
        return Ok(format);
    }

    match extension {
        Some(ext) => Err(FlashdocError::UnsupportedFormat(format!("Unknown extension: .{}", ext))),
        None => Err(FlashdocError::UnsupportedFormat(format!(
            "Could not determine file type of '{}'",
            file_name
        ))),
    }
}

/// Select the extractor format for an upload.
///
/// # Errors
///
/// Returns `FlashdocError::UnsupportedFormat` naming the unrecognized MIME
/// type or extension.
pub fn dispatch(declared_type: Option<&str>, file_name: &str) -> Result<DocumentFormat> {
    let mime = declared_type.map(essence).unwrap_or_default();

    if !is_generic(&mime) {
        return format_for_mime(&mime).ok_or(FlashdocError::UnsupportedFormat(mime));
    }

    format_for_file_name(file_name)
}
