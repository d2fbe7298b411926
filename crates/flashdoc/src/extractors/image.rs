//! Image extractor: decode, then recognize with the job's OCR engine.

use super::{DocumentExtractor, ExtractionContext, RawExtraction};
use crate::core::progress::Phase;
use crate::{FlashdocError, Result};

const PREPARING_DETAIL: &str = "Preparing OCR engine";
const RECOGNIZING_DETAIL: &str = "Recognizing text in image";

#[derive(Debug, Default, Clone, Copy)]
pub struct ImageExtractor;

impl DocumentExtractor for ImageExtractor {
    fn name(&self) -> &str {
        "image-extractor"
    }

    fn extract(&self, content: &[u8], ctx: &mut ExtractionContext<'_, '_>) -> Result<RawExtraction> {
        let image = image::load_from_memory(content)
            .map_err(|e| FlashdocError::corrupt_document_with_source(format!("Failed to decode image: {}", e), e))?;

        ctx.progress.step(0, Phase::PreparingEngine, PREPARING_DETAIL);
        ctx.ocr.ensure_engine()?;
        ctx.check_cancelled()?;

        let progress = &mut *ctx.progress;
        let result = ctx.ocr.recognize(&image, &mut |percent| {
            progress.step(percent, Phase::RunningRecognition, RECOGNIZING_DETAIL)
        });

        let text = match result {
            Ok(text) => text,
            Err(err @ FlashdocError::EngineInitialization { .. }) => return Err(err),
            Err(err) => {
                tracing::warn!(error = %err, "OCR failed for image, continuing with empty text");
                String::new()
            }
        };

        Ok(RawExtraction {
            text,
            page_count: None,
            ocr_page_count: Some(1),
        })
    }
}
