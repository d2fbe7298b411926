//! Format-specific extractors.
//!
//! Each [`DocumentFormat`] maps to exactly one extractor. Extractors produce
//! raw text; normalization happens afterwards in the pipeline.

pub mod docx;
pub mod image;
pub mod pdf;
pub mod text;

pub use docx::DocxExtractor;
pub use image::ImageExtractor;
pub use pdf::{PageDecision, PdfExtractor};
pub use text::PlainTextExtractor;

use crate::core::config::ExtractionConfig;
use crate::core::mime::DocumentFormat;
use crate::core::progress::ProgressReporter;
use crate::ocr::OcrSession;
use crate::pdf::PageRenderer;
use crate::{FlashdocError, Result};
use tokio_util::sync::CancellationToken;

/// Everything an extractor may use besides the file bytes.
pub struct ExtractionContext<'a, 'p> {
    pub config: &'a ExtractionConfig,
    pub ocr: &'a mut OcrSession,
    pub renderer: &'a dyn PageRenderer,
    pub cancel: &'a CancellationToken,
    pub progress: &'a mut ProgressReporter<'p>,
}

impl ExtractionContext<'_, '_> {
    /// Fail with `Cancelled` if cancellation has been requested.
    pub fn check_cancelled(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(FlashdocError::Cancelled);
        }
        Ok(())
    }
}

/// Extractor output before normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawExtraction {
    pub text: String,
    pub page_count: Option<usize>,
    pub ocr_page_count: Option<usize>,
}

impl RawExtraction {
    pub fn text(text: String) -> Self {
        Self {
            text,
            ..Default::default()
        }
    }
}

pub trait DocumentExtractor: Send + Sync {
    fn name(&self) -> &str;

    fn extract(&self, content: &[u8], ctx: &mut ExtractionContext<'_, '_>) -> Result<RawExtraction>;
}

/// The extractor responsible for `format`.
pub fn extractor_for(format: DocumentFormat) -> &'static dyn DocumentExtractor {
    match format {
        DocumentFormat::PlainText => &PlainTextExtractor,
        DocumentFormat::Docx => &DocxExtractor,
        DocumentFormat::Pdf => &PdfExtractor,
        DocumentFormat::Image => &ImageExtractor,
    }
}
