use std::fmt;

/// Errors raised by OCR engines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OcrError {
    InitializationFailed(String),
    Unavailable(String),
    InvalidConfiguration(String),
    ImageProcessingFailed(String),
    ProcessingFailed(String),
}

impl fmt::Display for OcrError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InitializationFailed(msg) => write!(f, "OCR engine initialization failed: {}", msg),
            Self::Unavailable(msg) => write!(f, "OCR engine unavailable: {}", msg),
            Self::InvalidConfiguration(msg) => write!(f, "Invalid configuration: {}", msg),
            Self::ImageProcessingFailed(msg) => write!(f, "Image processing failed: {}", msg),
            Self::ProcessingFailed(msg) => write!(f, "OCR processing failed: {}", msg),
        }
    }
}

impl std::error::Error for OcrError {}
