//! PDF access.
//!
//! `lopdf` opens documents and reads their native text layer. Page
//! rasterization for the OCR fallback goes through a [`PageRenderer`], backed
//! by Pdfium when the `pdfium` feature is enabled.

#[cfg(feature = "pdfium")]
mod bindings;
pub mod document;
pub mod error;
pub mod rendering;

pub use document::PdfDocument;
pub use error::PdfError;
pub use rendering::{PageRenderer, UnavailableRenderer, default_page_renderer};

#[cfg(feature = "pdfium")]
pub use rendering::PdfiumRenderer;
