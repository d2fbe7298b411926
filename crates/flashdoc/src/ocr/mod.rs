//! OCR engine adapter.
//!
//! Engines are created through an [`OcrEngineFactory`] and owned by a
//! job-scoped [`OcrSession`]. The Tesseract backend is compiled in with the
//! `ocr` feature; without it the default factory reports an initialization
//! failure the first time a job actually needs recognition.

pub mod engine;
pub mod error;
pub mod session;
#[cfg(feature = "ocr")]
pub mod tesseract;

pub use engine::{OcrEngine, OcrEngineFactory, OcrLanguages, UnavailableEngineFactory};
pub use error::OcrError;
pub use session::OcrSession;

use crate::core::config::OcrConfig;
use std::sync::Arc;

/// The engine factory used when the caller doesn't inject one.
#[cfg(feature = "ocr")]
pub fn default_engine_factory(config: &OcrConfig) -> Arc<dyn OcrEngineFactory> {
    Arc::new(tesseract::TesseractEngineFactory::new(config))
}

/// The engine factory used when the caller doesn't inject one.
#[cfg(not(feature = "ocr"))]
pub fn default_engine_factory(_config: &OcrConfig) -> Arc<dyn OcrEngineFactory> {
    Arc::new(UnavailableEngineFactory)
}
