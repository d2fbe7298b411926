//! Flashdoc - Document Ingestion Pipeline
//!
//! Flashdoc turns uploaded files into clean plain text for downstream study
//! tools. Text files are decoded, DOCX bodies are read, images go through OCR,
//! and PDFs are handled page by page: pages with a usable text layer are read
//! directly, the rest are rasterized and recognized.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use flashdoc::{ExtractionConfig, JobRequest, Pipeline};
//!
//! # fn main() -> flashdoc::Result<()> {
//! let pipeline = Pipeline::new(ExtractionConfig::default());
//! let result = pipeline.extract_blocking(JobRequest::from_path("lecture.pdf")?)?;
//! println!("{}", result.text);
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - **Core Module** (`core`): configuration, format dispatch, job state machine and the pipeline
//! - **Extractors** (`extractors`): one extractor per supported format
//! - **PDF** (`pdf`): native text access and page rasterization
//! - **OCR** (`ocr`): engine abstraction and job-scoped engine sessions
//! - **Text** (`text`): normalization, statistics and structure
//!
//! # Features
//!
//! - `pdfium` (default): rasterize scanned PDF pages through Pdfium
//! - `simd-utf8` (default): SIMD-accelerated UTF-8 validation
//! - `ocr`: Tesseract-backed recognition

#![deny(unsafe_code)]

pub mod core;
pub mod error;
pub mod extractors;
pub mod ocr;
pub mod pdf;
pub mod text;
pub mod types;

pub use error::{ErrorKind, FlashdocError, PdfOpenReason, Result};

pub use types::{ExtractionMetadata, ExtractionResult, JobRequest};

pub use core::config::{ExtractionConfig, OcrConfig};
pub use core::job::{JobId, JobState};
pub use core::mime::{DocumentFormat, dispatch};
pub use core::pipeline::{JobHandle, JobOutcome, Pipeline};
pub use core::progress::{Phase, ProgressEvent};
