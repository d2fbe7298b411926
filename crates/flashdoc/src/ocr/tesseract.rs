//! Tesseract engine backed by `kreuzberg-tesseract`.

use super::engine::{OcrEngine, OcrEngineFactory, OcrLanguages};
use super::error::OcrError;
use crate::core::config::OcrConfig;
use image::DynamicImage;
use kreuzberg_tesseract::{TessPageSegMode, TesseractAPI};
use std::env;
use std::path::{Path, PathBuf};

const FALLBACK_TESSDATA_PATHS: &[&str] = &[
    "/opt/homebrew/share/tessdata",
    "/opt/homebrew/opt/tesseract/share/tessdata",
    "/usr/local/opt/tesseract/share/tessdata",
    "/usr/share/tesseract-ocr/5/tessdata",
    "/usr/share/tesseract-ocr/4/tessdata",
    "/usr/share/tessdata",
    "/usr/local/share/tessdata",
    r#"C:\Program Files\Tesseract-OCR\tessdata"#,
    r#"C:\ProgramData\Tesseract-OCR\tessdata"#,
];

/// Resolve the tessdata directory: explicit config, then `TESSDATA_PREFIX`, then well-known paths.
pub fn resolve_tessdata_path(configured: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = configured {
        return Some(path.to_path_buf());
    }
    if let Ok(prefix) = env::var("TESSDATA_PREFIX")
        && !prefix.is_empty()
    {
        return Some(PathBuf::from(prefix));
    }
    FALLBACK_TESSDATA_PATHS
        .iter()
        .map(Path::new)
        .find(|p| p.exists())
        .map(Path::to_path_buf)
}

#[derive(Debug, Clone)]
pub struct TesseractEngineFactory {
    tessdata_path: Option<PathBuf>,
    page_segmentation_mode: i32,
}

impl TesseractEngineFactory {
    pub fn new(config: &OcrConfig) -> Self {
        Self {
            tessdata_path: config.tessdata_path.clone(),
            page_segmentation_mode: config.page_segmentation_mode,
        }
    }
}

impl OcrEngineFactory for TesseractEngineFactory {
    fn create(&self, languages: &OcrLanguages) -> Result<Box<dyn OcrEngine>, OcrError> {
        if languages.is_empty() {
            return Err(OcrError::InitializationFailed(
                "Language cannot be empty. Please specify a valid language code (e.g., 'eng')".to_string(),
            ));
        }

        let tessdata_path = resolve_tessdata_path(self.tessdata_path.as_deref());
        let tessdata = tessdata_path
            .as_ref()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default();

        // A missing traineddata file crashes tesseract instead of returning an error.
        if let Some(dir) = &tessdata_path {
            for lang in languages.iter() {
                let traineddata = dir.join(format!("{}.traineddata", lang));
                if !traineddata.exists() {
                    return Err(OcrError::InitializationFailed(format!(
                        "Language '{}' not found. Traineddata file does not exist: {}",
                        lang,
                        traineddata.display()
                    )));
                }
            }
        }

        let spec = languages.to_string();
        let api = TesseractAPI::new();
        api.init(&tessdata, &spec).map_err(|e| {
            OcrError::InitializationFailed(format!("Failed to initialize language '{}': {}", spec, e))
        })?;

        api.set_page_seg_mode(TessPageSegMode::from_int(self.page_segmentation_mode))
            .map_err(|e| OcrError::InvalidConfiguration(format!("Failed to set PSM mode: {}", e)))?;

        tracing::debug!(version = %TesseractAPI::version(), languages = %spec, tessdata = %tessdata, "Tesseract initialized");

        Ok(Box::new(TesseractEngine { api: Some(api) }))
    }
}

/// Progress reported at each recognition stage.
///
/// `TesseractAPI::recognize` runs to completion without reporting progress,
/// so these are coarse stage markers and not a measure of work done.
mod stage {
    pub const STARTED: u8 = 0;
    pub const IMAGE_LOADED: u8 = 10;
    pub const RECOGNIZED: u8 = 90;
    pub const TEXT_READ: u8 = 100;

    #[cfg(test)]
    pub const ALL: [u8; 4] = [STARTED, IMAGE_LOADED, RECOGNIZED, TEXT_READ];
}

/// One Tesseract instance, owned by a single job.
///
/// `recognize` reports fixed stage markers only. Progress inside
/// Tesseract's own recognition pass is not available from the binding.
pub struct TesseractEngine {
    api: Option<TesseractAPI>,
}

impl OcrEngine for TesseractEngine {
    fn name(&self) -> &str {
        "tesseract"
    }

    fn recognize(&mut self, image: &DynamicImage, progress: &mut dyn FnMut(u8)) -> Result<String, OcrError> {
        let api = self
            .api
            .as_ref()
            .ok_or_else(|| OcrError::ProcessingFailed("Tesseract engine was terminated".to_string()))?;

        progress(stage::STARTED);

        let rgb_image = image.to_rgb8();
        let (width, height) = rgb_image.dimensions();
        if width == 0 || height == 0 {
            return Err(OcrError::ImageProcessingFailed("Image has zero size".to_string()));
        }
        let bytes_per_pixel = 3;
        let bytes_per_line = width * bytes_per_pixel;

        api.set_image(
            rgb_image.as_raw(),
            width as i32,
            height as i32,
            bytes_per_pixel as i32,
            bytes_per_line as i32,
        )
        .map_err(|e| OcrError::ProcessingFailed(format!("Failed to set image: {}", e)))?;

        progress(stage::IMAGE_LOADED);

        api.recognize()
            .map_err(|e| OcrError::ProcessingFailed(format!("Failed to recognize text: {}", e)))?;

        progress(stage::RECOGNIZED);

        let text = api
            .get_utf8_text()
            .map_err(|e| OcrError::ProcessingFailed(format!("Failed to extract text: {}", e)))?;

        progress(stage::TEXT_READ);
        Ok(text)
    }

    fn terminate(&mut self) {
        // Dropping the API handle ends the native Tesseract instance.
        self.api.take();
    }
}
