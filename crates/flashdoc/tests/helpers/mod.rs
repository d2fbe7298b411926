//! Shared fixtures for integration tests.
//!
//! Documents are built in memory so the suite doesn't depend on binary
//! fixtures. OCR and rasterization are replaced with counting fakes.

#![allow(dead_code)]

use flashdoc::ocr::{OcrEngine, OcrEngineFactory, OcrError, OcrLanguages};
use flashdoc::pdf::{PageRenderer, PdfError};
use flashdoc::{ExtractionConfig, JobRequest, Pipeline, ProgressEvent};
use image::DynamicImage;
use lopdf::{Document, Object, Stream, dictionary};
use std::collections::HashSet;
use std::io::{Cursor, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio_util::sync::CancellationToken;
use zip::write::{SimpleFileOptions, ZipWriter};

/// Build a PDF with one page per entry. Empty entries produce pages with no text layer.
pub fn pdf_with_pages(page_texts: &[&str]) -> Vec<u8> {
    let mut doc = build_document(page_texts);
    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).expect("in-memory PDF should serialize");
    buffer
}

/// A PDF whose trailer declares standard-security encryption.
pub fn encrypted_pdf() -> Vec<u8> {
    let mut doc = build_document(&["This text is behind a password"]);
    let encrypt_id = doc.add_object(dictionary! {
        "Filter" => "Standard",
        "V" => 1,
        "R" => 2,
        "O" => Object::string_literal(vec![0x41u8; 32]),
        "U" => Object::string_literal(vec![0x42u8; 32]),
        "P" => -4,
    });
    doc.trailer.set("Encrypt", encrypt_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).expect("in-memory PDF should serialize");
    buffer
}

fn build_document(page_texts: &[&str]) -> Document {
    let mut doc = Document::with_version("1.4");
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut page_ids = Vec::new();
    for text in page_texts {
        let content = if text.is_empty() {
            String::new()
        } else {
            format!("BT /F1 12 Tf 72 720 Td ({}) Tj ET", text)
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
        page_ids.push(doc.add_object(dictionary! {
            "Type" => "Page",
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Resources" => resources_id,
            "Contents" => content_id,
        }));
    }

    let kids: Vec<Object> = page_ids.iter().map(|&id| id.into()).collect();
    let pages_id = doc.add_object(dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => Object::Integer(page_texts.len() as i64),
    });
    for page_id in &page_ids {
        if let Ok(Object::Dictionary(dict)) = doc.get_object_mut(*page_id) {
            dict.set("Parent", pages_id);
        }
    }
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc
}

/// Build a minimal Word document with one paragraph per entry.
pub fn docx_with_paragraphs(paragraphs: &[&str]) -> Vec<u8> {
    let body: String = paragraphs
        .iter()
        .map(|p| format!("<w:p><w:r><w:t xml:space=\"preserve\">{}</w:t></w:r></w:p>", p))
        .collect();
    let document_xml = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
         <w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\">\
         <w:body>{}</w:body></w:document>",
        body
    );

    let content_types = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
        <Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\">\
        <Default Extension=\"rels\" ContentType=\"application/vnd.openxmlformats-package.relationships+xml\"/>\
        <Default Extension=\"xml\" ContentType=\"application/xml\"/>\
        <Override PartName=\"/word/document.xml\" \
        ContentType=\"application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml\"/>\
        </Types>";

    let rels = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
        <Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">\
        <Relationship Id=\"rId1\" \
        Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument\" \
        Target=\"word/document.xml\"/>\
        </Relationships>";

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut zip = ZipWriter::new(&mut cursor);
        let options = SimpleFileOptions::default();

        zip.start_file("[Content_Types].xml", options).unwrap();
        zip.write_all(content_types.as_bytes()).unwrap();

        zip.start_file("_rels/.rels", options).unwrap();
        zip.write_all(rels.as_bytes()).unwrap();

        zip.start_file("word/document.xml", options).unwrap();
        zip.write_all(document_xml.as_bytes()).unwrap();

        zip.finish().unwrap();
    }
    cursor.into_inner()
}

/// A small PNG for the image extractor.
pub fn png_bytes() -> Vec<u8> {
    let image = DynamicImage::new_rgb8(16, 16);
    let mut cursor = Cursor::new(Vec::new());
    image
        .write_to(&mut cursor, image::ImageFormat::Png)
        .expect("PNG encoding should succeed");
    cursor.into_inner()
}

/// Counters shared between a [`FakeOcrFactory`] and the engines it creates.
#[derive(Default)]
pub struct OcrCounters {
    pub created: AtomicUsize,
    pub terminated: AtomicUsize,
    pub recognized: AtomicUsize,
}

impl OcrCounters {
    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub fn terminated(&self) -> usize {
        self.terminated.load(Ordering::SeqCst)
    }

    pub fn recognized(&self) -> usize {
        self.recognized.load(Ordering::SeqCst)
    }
}

/// Engine factory returning scripted engines.
///
/// The n-th recognition call (1-based) returns `Recognized text n` unless
/// listed in `failing_calls`.
#[derive(Clone, Default)]
pub struct FakeOcrFactory {
    pub counters: Arc<OcrCounters>,
    fail_init: bool,
    failing_calls: HashSet<usize>,
    cancel_on_call: Option<(usize, CancellationToken)>,
}

impl FakeOcrFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_init() -> Self {
        Self {
            fail_init: true,
            ..Self::default()
        }
    }

    pub fn fail_on_call(mut self, call: usize) -> Self {
        self.failing_calls.insert(call);
        self
    }

    /// Trigger `token` while serving recognition call `call`.
    pub fn cancel_on_call(mut self, call: usize, token: CancellationToken) -> Self {
        self.cancel_on_call = Some((call, token));
        self
    }
}

impl OcrEngineFactory for FakeOcrFactory {
    fn create(&self, _languages: &OcrLanguages) -> Result<Box<dyn OcrEngine>, OcrError> {
        if self.fail_init {
            return Err(OcrError::InitializationFailed(
                "traineddata for 'ind' not found".to_string(),
            ));
        }
        self.counters.created.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeOcrEngine {
            factory: self.clone(),
            terminated: false,
        }))
    }
}

struct FakeOcrEngine {
    factory: FakeOcrFactory,
    terminated: bool,
}

impl OcrEngine for FakeOcrEngine {
    fn name(&self) -> &str {
        "fake"
    }

    fn recognize(&mut self, _image: &DynamicImage, progress: &mut dyn FnMut(u8)) -> Result<String, OcrError> {
        assert!(!self.terminated, "recognize called after terminate");
        let call = self.factory.counters.recognized.fetch_add(1, Ordering::SeqCst) + 1;

        if let Some((at, token)) = &self.factory.cancel_on_call
            && *at == call
        {
            token.cancel();
        }

        progress(0);
        progress(50);
        if self.factory.failing_calls.contains(&call) {
            return Err(OcrError::ProcessingFailed(format!("scripted failure on call {}", call)));
        }
        progress(100);
        Ok(format!("Recognized text {}", call))
    }

    fn terminate(&mut self) {
        self.terminated = true;
        self.factory.counters.terminated.fetch_add(1, Ordering::SeqCst);
    }
}

/// Renderer producing a blank bitmap, optionally failing on chosen pages (0-based).
#[derive(Default)]
pub struct FakeRenderer {
    pub failing_pages: HashSet<usize>,
}

impl FakeRenderer {
    pub fn failing_on(pages: &[usize]) -> Self {
        Self {
            failing_pages: pages.iter().copied().collect(),
        }
    }
}

impl PageRenderer for FakeRenderer {
    fn render_page(&self, _pdf_bytes: &[u8], page_index: usize, scale: f32) -> Result<DynamicImage, PdfError> {
        assert!(scale >= 2.0, "pages must be rendered at scale 2.0 or higher");
        if self.failing_pages.contains(&page_index) {
            return Err(PdfError::RenderingFailed(format!("page {}", page_index + 1)));
        }
        Ok(DynamicImage::new_rgb8(8, 8))
    }
}

pub fn pipeline_with(factory: &FakeOcrFactory, renderer: FakeRenderer) -> Pipeline {
    pipeline_with_config(ExtractionConfig::default(), factory, renderer)
}

pub fn pipeline_with_config(config: ExtractionConfig, factory: &FakeOcrFactory, renderer: FakeRenderer) -> Pipeline {
    Pipeline::new(config)
        .with_ocr_factory(Arc::new(factory.clone()))
        .with_renderer(Arc::new(renderer))
}

/// Submit a job and collect every event it emits.
pub async fn run_job(pipeline: &Pipeline, request: JobRequest) -> Vec<ProgressEvent> {
    pipeline.submit(request).collect_events().await
}

/// Assert the stream ends in exactly one terminal event and return it.
pub fn single_terminal(events: &[ProgressEvent]) -> &ProgressEvent {
    let terminals: Vec<_> = events.iter().filter(|e| e.is_terminal()).collect();
    assert_eq!(terminals.len(), 1, "expected exactly one terminal event, got {:?}", events);
    let last = events.last().expect("event stream should not be empty");
    assert!(last.is_terminal(), "terminal event must be last, got {:?}", events);
    last
}

pub fn progress_events(events: &[ProgressEvent]) -> Vec<&ProgressEvent> {
    events
        .iter()
        .filter(|e| matches!(e, ProgressEvent::Progress { .. }))
        .collect()
}
