//! Plain text and Markdown extractor.

use super::{DocumentExtractor, ExtractionContext, RawExtraction};
use crate::{FlashdocError, Result};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Decodes plain text and Markdown files as strict UTF-8.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTextExtractor;

impl DocumentExtractor for PlainTextExtractor {
    fn name(&self) -> &str {
        "plain-text-extractor"
    }

    fn extract(&self, content: &[u8], _ctx: &mut ExtractionContext<'_, '_>) -> Result<RawExtraction> {
        decode_text(content).map(RawExtraction::text)
    }
}

/// Decode `bytes` as UTF-8, dropping a leading byte-order mark.
///
/// # Errors
///
/// `FlashdocError::Decode` naming the offset of the first invalid byte.
pub fn decode_text(bytes: &[u8]) -> Result<String> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    decode_utf8(bytes).map(str::to_owned)
}

#[cfg(feature = "simd-utf8")]
fn decode_utf8(bytes: &[u8]) -> Result<&str> {
    simdutf8::compat::from_utf8(bytes).map_err(|e| {
        FlashdocError::decode_with_source(format!("Invalid UTF-8 sequence at byte {}", e.valid_up_to()), e)
    })
}

#[cfg(not(feature = "simd-utf8"))]
fn decode_utf8(bytes: &[u8]) -> Result<&str> {
    std::str::from_utf8(bytes).map_err(|e| {
        FlashdocError::decode_with_source(format!("Invalid UTF-8 sequence at byte {}", e.valid_up_to()), e)
    })
}
