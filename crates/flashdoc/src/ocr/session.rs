//! Job-scoped OCR engine ownership.
//!
//! An [`OcrSession`] holds at most one engine. The engine is created on the
//! first recognition request and terminated when the session is dropped, so
//! every exit path of a job (success, fatal error, cancellation, panic unwind)
//! releases it exactly once.

use super::engine::{OcrEngine, OcrEngineFactory, OcrLanguages};
use crate::{FlashdocError, Result};
use image::DynamicImage;
use std::sync::Arc;

enum EngineSlot {
    Empty,
    Ready(Box<dyn OcrEngine>),
    Failed(String),
    Terminated,
}

pub struct OcrSession {
    factory: Arc<dyn OcrEngineFactory>,
    languages: OcrLanguages,
    slot: EngineSlot,
    label: String,
}

impl OcrSession {
    pub fn new(factory: Arc<dyn OcrEngineFactory>, languages: OcrLanguages) -> Self {
        Self {
            factory,
            languages,
            slot: EngineSlot::Empty,
            label: String::new(),
        }
    }

    /// Attach a label (usually the job id) used in log lines.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn languages(&self) -> &OcrLanguages {
        &self.languages
    }

    pub fn is_initialized(&self) -> bool {
        matches!(self.slot, EngineSlot::Ready(_))
    }

    fn engine(&mut self) -> Result<&mut Box<dyn OcrEngine>> {
        if matches!(self.slot, EngineSlot::Empty) {
            match self.factory.create(&self.languages) {
                Ok(engine) => {
                    tracing::debug!(job = %self.label, engine = engine.name(), languages = %self.languages, "OCR engine created");
                    self.slot = EngineSlot::Ready(engine);
                }
                Err(err) => {
                    tracing::error!(job = %self.label, error = %err, "OCR engine initialization failed");
                    self.slot = EngineSlot::Failed(err.to_string());
                    return Err(err.into());
                }
            }
        }

        match &mut self.slot {
            EngineSlot::Ready(engine) => Ok(engine),
            EngineSlot::Failed(message) => Err(FlashdocError::engine_initialization(message.clone())),
            EngineSlot::Terminated => Err(FlashdocError::engine_initialization(
                "OCR session has already been terminated",
            )),
            EngineSlot::Empty => Err(FlashdocError::Other("OCR engine slot left empty".to_string())),
        }
    }

    /// Make sure an engine exists, creating it if needed.
    ///
    /// # Errors
    ///
    /// `EngineInitialization` if the engine cannot be created. This is fatal for the job.
    pub fn ensure_engine(&mut self) -> Result<()> {
        self.engine().map(|_| ())
    }

    /// Run recognition on `image`, forwarding engine progress to `progress`.
    ///
    /// # Errors
    ///
    /// - `EngineInitialization` when the engine cannot be created.
    /// - `Ocr` when this particular recognition call fails; callers may recover.
    pub fn recognize(&mut self, image: &DynamicImage, progress: &mut dyn FnMut(u8)) -> Result<String> {
        let engine = self.engine()?;
        engine.recognize(image, progress).map_err(|e| match e {
            super::error::OcrError::InitializationFailed(_) | super::error::OcrError::Unavailable(_) => e.into(),
            other => FlashdocError::ocr_with_source(other.to_string(), other),
        })
    }

    /// Terminate the engine now. Later calls are no-ops.
    pub fn terminate(&mut self) {
        if let EngineSlot::Ready(mut engine) = std::mem::replace(&mut self.slot, EngineSlot::Terminated) {
            engine.terminate();
            tracing::debug!(job = %self.label, engine = engine.name(), "OCR engine terminated");
        }
    }
}

impl Drop for OcrSession {
    fn drop(&mut self) {
        self.terminate();
    }
}
