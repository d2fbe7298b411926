//! Error types for flashdoc.
//!
//! Every fatal job failure is a [`FlashdocError`]. Each variant maps onto a
//! stable, serializable [`ErrorKind`] that is carried by the terminal `error`
//! event, so consumers can branch on the kind without parsing messages.
//!
//! Lower layers keep their own error enums (`PdfError`, `OcrError`) with
//! hand-written `Display` impls and convert into `FlashdocError` at the
//! extractor boundary.
//!
//! Recoverable failures never reach this type: a page whose rendering or
//! recognition fails degrades to empty text inside the PDF extractor.
//!
//! # Example
//!
//! ```rust
//! use flashdoc::{FlashdocError, Result};
//!
//! fn check_size(size: u64, limit: u64) -> Result<()> {
//!     if size > limit {
//!         return Err(FlashdocError::validation(format!(
//!             "File is too large: {} bytes (limit {})",
//!             size, limit
//!         )));
//!     }
//!     Ok(())
//! }
//! ```
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Result type alias using `FlashdocError`.
pub type Result<T> = std::result::Result<T, FlashdocError>;

/// Why a PDF could not be opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PdfOpenReason {
    PasswordProtected,
    Generic,
}

/// Main error type for all flashdoc operations.
#[derive(Debug, Error)]
pub enum FlashdocError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Decode error: {message}")]
    Decode {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Corrupt document: {message}")]
    CorruptDocument {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Failed to open PDF: {message}")]
    PdfOpen { message: String, reason: PdfOpenReason },

    #[error("OCR error: {message}")]
    Ocr {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("OCR engine initialization failed: {message}")]
    EngineInitialization {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Job was cancelled")]
    Cancelled,

    #[error("{0}")]
    Other(String),
}

/// Stable error classification carried by `error` events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    UnsupportedFormat,
    DecodeError,
    CorruptDocument,
    PdfOpenError,
    OcrEngineFailure,
    EngineInitializationFailure,
    Validation,
    Io,
    Cancelled,
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::UnsupportedFormat => "UnsupportedFormat",
            ErrorKind::DecodeError => "DecodeError",
            ErrorKind::CorruptDocument => "CorruptDocument",
            ErrorKind::PdfOpenError => "PdfOpenError",
            ErrorKind::OcrEngineFailure => "OcrEngineFailure",
            ErrorKind::EngineInitializationFailure => "EngineInitializationFailure",
            ErrorKind::Validation => "Validation",
            ErrorKind::Io => "Io",
            ErrorKind::Cancelled => "Cancelled",
            ErrorKind::Internal => "Internal",
        };
        f.write_str(name)
    }
}

macro_rules! error_constructor {
    ($name:ident, $variant:ident) => {
        pastey::paste! {
            #[doc = "Create a " $variant " error"]
            pub fn $name<S: Into<String>>(message: S) -> Self {
                Self::$variant {
                    message: message.into(),
                    source: None,
                }
            }

            #[doc = "Create a " $variant " error with source"]
            pub fn [<$name _with_source>]<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
                message: S,
                source: E,
            ) -> Self {
                Self::$variant {
                    message: message.into(),
                    source: Some(Box::new(source)),
                }
            }
        }
    };
}

impl FlashdocError {
    error_constructor!(decode, Decode);
    error_constructor!(corrupt_document, CorruptDocument);
    error_constructor!(ocr, Ocr);
    error_constructor!(engine_initialization, EngineInitialization);
    error_constructor!(validation, Validation);

    pub fn pdf_open<S: Into<String>>(message: S, reason: PdfOpenReason) -> Self {
        Self::PdfOpen {
            message: message.into(),
            reason,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            FlashdocError::Io(_) => ErrorKind::Io,
            FlashdocError::UnsupportedFormat(_) => ErrorKind::UnsupportedFormat,
            FlashdocError::Decode { .. } => ErrorKind::DecodeError,
            FlashdocError::CorruptDocument { .. } => ErrorKind::CorruptDocument,
            FlashdocError::PdfOpen { .. } => ErrorKind::PdfOpenError,
            FlashdocError::Ocr { .. } => ErrorKind::OcrEngineFailure,
            FlashdocError::EngineInitialization { .. } => ErrorKind::EngineInitializationFailure,
            FlashdocError::Validation { .. } => ErrorKind::Validation,
            FlashdocError::Cancelled => ErrorKind::Cancelled,
            FlashdocError::Other(_) => ErrorKind::Internal,
        }
    }

    pub fn is_password_protected(&self) -> bool {
        matches!(
            self,
            FlashdocError::PdfOpen {
                reason: PdfOpenReason::PasswordProtected,
                ..
            }
        )
    }

    /// Message suitable for showing to the person who uploaded the file.
    ///
    /// Distinguishes password-protected PDFs and unsupported formats from
    /// every other failure, which collapses into a generic processing message.
    pub fn user_message(&self) -> String {
        match self {
            FlashdocError::PdfOpen {
                reason: PdfOpenReason::PasswordProtected,
                ..
            } => "The PDF is password-protected and cannot be read.".to_string(),
            FlashdocError::UnsupportedFormat(kind) => format!("Unsupported file type: {}", kind),
            FlashdocError::Validation { message, .. } => message.clone(),
            _ => "Failed to process the file. It may be damaged or in an unexpected format.".to_string(),
        }
    }
}

impl From<crate::pdf::error::PdfError> for FlashdocError {
    fn from(err: crate::pdf::error::PdfError) -> Self {
        use crate::pdf::error::PdfError;

        match err {
            PdfError::PasswordRequired => Self::pdf_open(err.to_string(), PdfOpenReason::PasswordProtected),
            PdfError::InvalidPdf(_) | PdfError::IOError(_) => Self::pdf_open(err.to_string(), PdfOpenReason::Generic),
            PdfError::PageNotFound(_) | PdfError::TextExtractionFailed(_) | PdfError::RenderingFailed(_) => {
                FlashdocError::CorruptDocument {
                    message: err.to_string(),
                    source: Some(Box::new(err)),
                }
            }
        }
    }
}

impl From<crate::ocr::error::OcrError> for FlashdocError {
    fn from(err: crate::ocr::error::OcrError) -> Self {
        use crate::ocr::error::OcrError;

        match err {
            OcrError::InitializationFailed(_) | OcrError::Unavailable(_) => FlashdocError::EngineInitialization {
                message: err.to_string(),
                source: Some(Box::new(err)),
            },
            _ => FlashdocError::Ocr {
                message: err.to_string(),
                source: Some(Box::new(err)),
            },
        }
    }
}
