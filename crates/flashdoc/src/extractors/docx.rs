//! DOCX (Microsoft Word) text extraction using docx-lite.

use super::{DocumentExtractor, ExtractionContext, RawExtraction};
use crate::{FlashdocError, Result};

/// Extracts raw paragraph text from Word documents; styling is discarded.
#[derive(Debug, Default, Clone, Copy)]
pub struct DocxExtractor;

impl DocumentExtractor for DocxExtractor {
    fn name(&self) -> &str {
        "docx-extractor"
    }

    fn extract(&self, content: &[u8], _ctx: &mut ExtractionContext<'_, '_>) -> Result<RawExtraction> {
        extract_docx_text(content).map(RawExtraction::text)
    }
}

/// Extract text from DOCX bytes.
///
/// # Errors
///
/// Any container or XML failure is reported as `FlashdocError::CorruptDocument`.
pub fn extract_docx_text(bytes: &[u8]) -> Result<String> {
    docx_lite::extract_text_from_bytes(bytes)
        .map_err(|e| FlashdocError::corrupt_document(format!("DOCX text extraction failed: {}", e)))
}
