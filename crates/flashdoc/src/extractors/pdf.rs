//! Hybrid PDF extractor.
//!
//! Pages are processed strictly in order. A page whose native text layer is
//! long enough is taken as-is; anything shorter is rasterized and sent through
//! the job's OCR session. Rendering and recognition failures on a single page
//! degrade that page to empty text. Engine initialization failure and
//! cancellation abort the whole document.

use super::{DocumentExtractor, ExtractionContext, RawExtraction};
use crate::core::progress::Phase;
use crate::pdf::PdfDocument;
use crate::{FlashdocError, Result};

/// How a single page's text is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageDecision {
    DirectText,
    Ocr,
}

impl PageDecision {
    /// Choose based on the length, in chars, of the page's native text.
    pub fn for_native_text(native_text: &str, min_text_length: usize) -> Self {
        if native_text.chars().count() >= min_text_length {
            PageDecision::DirectText
        } else {
            PageDecision::Ocr
        }
    }

    pub fn phase(&self) -> Phase {
        match self {
            PageDecision::DirectText => Phase::ReadingText,
            PageDecision::Ocr => Phase::RunningRecognition,
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PdfExtractor;

impl DocumentExtractor for PdfExtractor {
    fn name(&self) -> &str {
        "pdf-extractor"
    }

    fn extract(&self, content: &[u8], ctx: &mut ExtractionContext<'_, '_>) -> Result<RawExtraction> {
        let document = PdfDocument::open(content).map_err(FlashdocError::from)?;
        let page_count = document.page_count();
        let scale = ctx.config.effective_render_scale();
        let threshold = ctx.config.min_text_length_per_page;

        tracing::debug!(pages = page_count, threshold, scale, "Starting hybrid PDF extraction");

        let mut buffer = String::new();
        let mut ocr_pages = 0usize;

        for index in 0..page_count {
            ctx.check_cancelled()?;
            let page_number = index + 1;

            let native = match document.page_text(index) {
                Ok(text) => text,
                Err(err) => {
                    tracing::debug!(page = page_number, error = %err, "Native text layer unreadable, treating as empty");
                    String::new()
                }
            };

            let decision = PageDecision::for_native_text(&native, threshold);
            let page_text = match decision {
                PageDecision::DirectText => native,
                PageDecision::Ocr => {
                    ocr_pages += 1;
                    recognize_page(content, index, scale, ctx)?
                }
            };

            tracing::trace!(page = page_number, ?decision, chars = page_text.len(), "Page processed");

            buffer.push_str(&page_text);
            buffer.push('\n');
            ctx.progress.page(page_number, page_count, decision.phase());
        }

        Ok(RawExtraction {
            text: buffer,
            page_count: Some(page_count),
            ocr_page_count: Some(ocr_pages),
        })
    }
}

/// Rasterize and recognize one page.
///
/// Only engine initialization failure escapes; everything else yields empty text.
fn recognize_page(content: &[u8], index: usize, scale: f32, ctx: &mut ExtractionContext<'_, '_>) -> Result<String> {
    let page_number = index + 1;

    // Engine initialization failure is fatal even if this page never renders.
    ctx.ocr.ensure_engine()?;

    let image = match ctx.renderer.render_page(content, index, scale) {
        Ok(image) => image,
        Err(err) => {
            tracing::warn!(page = page_number, error = %err, "Page rendering failed, continuing with empty text");
            return Ok(String::new());
        }
    };

    match ctx.ocr.recognize(&image, &mut |_| {}) {
        Ok(text) => Ok(text),
        Err(err @ FlashdocError::EngineInitialization { .. }) => Err(err),
        Err(err) => {
            tracing::warn!(page = page_number, error = %err, "OCR failed for page, continuing with empty text");
            Ok(String::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_decision_threshold() {
        assert_eq!(PageDecision::for_native_text("", 20), PageDecision::Ocr);
        assert_eq!(PageDecision::for_native_text("short", 20), PageDecision::Ocr);
        assert_eq!(
            PageDecision::for_native_text("exactly twenty chars", 20),
            PageDecision::DirectText
        );
        assert_eq!(PageDecision::for_native_text("anything", 0), PageDecision::DirectText);
    }

    #[test]
    fn test_page_decision_counts_chars_not_bytes() {
        let text = "é".repeat(10);
        assert_eq!(text.len(), 20);
        assert_eq!(PageDecision::for_native_text(&text, 20), PageDecision::Ocr);
    }

    #[test]
    fn test_phase_for_decision() {
        assert_eq!(PageDecision::DirectText.phase(), Phase::ReadingText);
        assert_eq!(PageDecision::Ocr.phase(), Phase::RunningRecognition);
    }
}
