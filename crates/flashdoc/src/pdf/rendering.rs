use super::error::{PdfError, Result};
use image::DynamicImage;

/// Upper bound on either bitmap dimension, whatever the requested scale.
const MAX_IMAGE_DIMENSION: f32 = 10_000.0;

/// Rasterizes single PDF pages for OCR.
pub trait PageRenderer: Send + Sync {
    /// Render the page at zero-based `page_index` at `scale` times its native size.
    fn render_page(&self, pdf_bytes: &[u8], page_index: usize, scale: f32) -> Result<DynamicImage>;
}

/// Renderer used when no rasterization backend was compiled in.
///
/// Every call fails, which the PDF extractor treats like any other per-page
/// rendering failure.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableRenderer;

impl PageRenderer for UnavailableRenderer {
    fn render_page(&self, _pdf_bytes: &[u8], page_index: usize, _scale: f32) -> Result<DynamicImage> {
        Err(PdfError::RenderingFailed(format!(
            "cannot render page {}: flashdoc was built without the `pdfium` feature",
            page_index + 1
        )))
    }
}

#[cfg(feature = "pdfium")]
pub use pdfium::PdfiumRenderer;

#[cfg(feature = "pdfium")]
mod pdfium {
    use super::super::bindings::bind_pdfium;
    use super::super::error::{PdfError, Result};
    use super::{PageRenderer, target_size};
    use image::DynamicImage;
    use pdfium_render::prelude::*;

    #[derive(Debug, Default, Clone, Copy)]
    pub struct PdfiumRenderer;

    impl PdfiumRenderer {
        pub fn new() -> Self {
            Self
        }
    }

    impl PageRenderer for PdfiumRenderer {
        fn render_page(&self, pdf_bytes: &[u8], page_index: usize, scale: f32) -> Result<DynamicImage> {
            let binding = bind_pdfium(PdfError::RenderingFailed, "page rendering")?;
            let pdfium = Pdfium::new(binding);

            let document = pdfium.load_pdf_from_byte_slice(pdf_bytes, None).map_err(|e| {
                let err_msg = e.to_string();
                if err_msg.contains("password") || err_msg.contains("Password") {
                    PdfError::PasswordRequired
                } else {
                    PdfError::InvalidPdf(err_msg)
                }
            })?;

            let index = u16::try_from(page_index).map_err(|_| PdfError::PageNotFound(page_index + 1))?;
            let page = document
                .pages()
                .get(index)
                .map_err(|_| PdfError::PageNotFound(page_index + 1))?;

            let (width, height) = target_size(page.width().value, page.height().value, scale);

            let config = PdfRenderConfig::new()
                .set_target_width(width)
                .set_target_height(height)
                .rotate_if_landscape(PdfPageRenderRotation::None, false);

            let bitmap = page
                .render_with_config(&config)
                .map_err(|e| PdfError::RenderingFailed(format!("Failed to render page: {}", e)))?;

            Ok(DynamicImage::ImageRgb8(bitmap.as_image().into_rgb8()))
        }
    }
}

/// Bitmap size for a page of `width` x `height` points at `scale`.
///
/// When either side would exceed `MAX_IMAGE_DIMENSION` the scale is lowered
/// for both sides, so the page keeps its aspect ratio.
#[cfg_attr(not(feature = "pdfium"), allow(dead_code))]
fn target_size(width: f32, height: f32, scale: f32) -> (i32, i32) {
    let longest = width.max(height);
    let scale = if longest * scale > MAX_IMAGE_DIMENSION && longest > 0.0 {
        MAX_IMAGE_DIMENSION / longest
    } else {
        scale
    };

    (((width * scale) as i32).max(1), ((height * scale) as i32).max(1))
}

/// The renderer used when the caller doesn't inject one.
pub fn default_page_renderer() -> std::sync::Arc<dyn PageRenderer> {
    #[cfg(feature = "pdfium")]
    {
        std::sync::Arc::new(PdfiumRenderer::new())
    }
    #[cfg(not(feature = "pdfium"))]
    {
        std::sync::Arc::new(UnavailableRenderer)
    }
}
