//! Job orchestration.
//!
//! A [`Pipeline`] turns a [`JobRequest`] into a stream of [`ProgressEvent`]s
//! ending in exactly one terminal event. Each job runs on its own blocking
//! worker and owns everything it touches, including its OCR engine. The caller
//! only ever sees the event channel and a cancellation handle.
//!
//! # Example
//!
//! ```rust,no_run
//! use flashdoc::{ExtractionConfig, JobRequest, Pipeline, ProgressEvent};
//!
//! # async fn run() -> flashdoc::Result<()> {
//! let pipeline = Pipeline::new(ExtractionConfig::default());
//! let mut handle = pipeline.submit(JobRequest::from_path("lecture.pdf")?);
//!
//! while let Some(event) = handle.next_event().await {
//!     if let ProgressEvent::Ready { content, .. } = &event {
//!         println!("{}", content.text);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

use super::config::ExtractionConfig;
use super::job::{Job, JobId, JobState};
use super::mime::dispatch;
use super::progress::{ProgressEvent, ProgressReporter};
use crate::error::ErrorKind;
use crate::extractors::{ExtractionContext, extractor_for};
use crate::ocr::{OcrEngineFactory, OcrSession, default_engine_factory};
use crate::pdf::{PageRenderer, default_page_renderer};
use crate::text::{TextStats, normalize, parse_structure, preview, strip_page_markers};
use crate::types::{ExtractionMetadata, ExtractionResult, JobRequest, title_from_file_name};
use crate::{FlashdocError, Result};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// How a job ended.
#[derive(Debug)]
pub enum JobOutcome {
    Ready(Box<ExtractionResult>),
    Failed(FlashdocError),
    Cancelled,
}

impl JobOutcome {
    /// The terminal event announcing this outcome.
    pub fn into_event(self) -> ProgressEvent {
        match self {
            JobOutcome::Ready(result) => {
                let preview = result.preview.clone();
                ProgressEvent::Ready {
                    content: result,
                    preview,
                }
            }
            JobOutcome::Failed(err) => ProgressEvent::Error {
                kind: err.kind(),
                message: err.user_message(),
                detail: Some(err.to_string()),
            },
            JobOutcome::Cancelled => ProgressEvent::Cancelled,
        }
    }

    pub fn into_result(self) -> Result<ExtractionResult> {
        match self {
            JobOutcome::Ready(result) => Ok(*result),
            JobOutcome::Failed(err) => Err(err),
            JobOutcome::Cancelled => Err(FlashdocError::Cancelled),
        }
    }
}

/// Entry point for submitting extraction jobs.
///
/// Cheap to clone; clones share configuration and injected services.
#[derive(Clone)]
pub struct Pipeline {
    config: Arc<ExtractionConfig>,
    ocr_factory: Arc<dyn OcrEngineFactory>,
    renderer: Arc<dyn PageRenderer>,
}

impl Pipeline {
    pub fn new(config: ExtractionConfig) -> Self {
        let ocr_factory = default_engine_factory(&config.ocr);
        Self {
            config: Arc::new(config),
            ocr_factory,
            renderer: default_page_renderer(),
        }
    }

    pub fn with_ocr_factory(mut self, factory: Arc<dyn OcrEngineFactory>) -> Self {
        self.ocr_factory = factory;
        self
    }

    pub fn with_renderer(mut self, renderer: Arc<dyn PageRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Start a job on a blocking worker and return its handle.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn submit(&self, request: JobRequest) -> JobHandle {
        self.submit_with_cancellation(request, CancellationToken::new())
    }

    /// Like [`submit`](Self::submit), observing an existing cancellation token.
    pub fn submit_with_cancellation(&self, request: JobRequest, cancel: CancellationToken) -> JobHandle {
        let id = JobId::new();
        let (tx, rx) = mpsc::unbounded_channel();
        let pipeline = self.clone();
        let worker_cancel = cancel.clone();

        let task = tokio::spawn(async move {
            let worker_tx = tx.clone();
            let joined = tokio::task::spawn_blocking(move || {
                let mut sink = move |event: ProgressEvent| {
                    // The caller may have stopped listening; the job still runs to completion.
                    let _ = worker_tx.send(event);
                };
                pipeline.execute(id, request, &worker_cancel, &mut sink)
            })
            .await;

            let terminal = match joined {
                Ok(outcome) => outcome.into_event(),
                Err(err) => {
                    tracing::error!(job_id = %id, error = %err, "Job worker crashed");
                    let message = format!("File processor crashed: {}", err);
                    ProgressEvent::Error {
                        kind: ErrorKind::Internal,
                        detail: Some(message.clone()),
                        message,
                    }
                }
            };
            let _ = tx.send(terminal);
        });

        JobHandle {
            id,
            events: rx,
            cancel,
            task,
        }
    }

    /// Run a job on the current thread, delivering every event (terminal included) to `sink`.
    pub fn run_blocking(
        &self,
        request: JobRequest,
        cancel: &CancellationToken,
        sink: &mut dyn FnMut(ProgressEvent),
    ) -> ProgressEvent {
        let terminal = self.execute(JobId::new(), request, cancel, sink).into_event();
        sink(terminal.clone());
        terminal
    }

    /// Extract on the current thread without progress reporting.
    pub fn extract_blocking(&self, request: JobRequest) -> Result<ExtractionResult> {
        self.execute(JobId::new(), request, &CancellationToken::new(), &mut |_| {})
            .into_result()
    }

    /// Extract on a blocking worker without progress reporting.
    pub async fn extract(&self, request: JobRequest) -> Result<ExtractionResult> {
        let pipeline = self.clone();
        tokio::task::spawn_blocking(move || pipeline.extract_blocking(request))
            .await
            .map_err(|e| FlashdocError::Other(format!("File processor crashed: {}", e)))?
    }

    fn execute(
        &self,
        id: JobId,
        request: JobRequest,
        cancel: &CancellationToken,
        sink: &mut dyn FnMut(ProgressEvent),
    ) -> JobOutcome {
        let ocr = OcrSession::new(Arc::clone(&self.ocr_factory), self.config.ocr.language_set())
            .with_label(id.to_string());
        let mut job = Job::new(id, request, cancel.clone(), ocr);
        let mut progress = ProgressReporter::new(sink);

        tracing::info!(job_id = %id, file = %job.request().name, size = job.request().size, "Job received");
        progress.processing(format!("Processing {}", job.request().name));

        let (state, outcome) = match self.drive(&mut job, &mut progress) {
            Ok(result) => (JobState::Ready, JobOutcome::Ready(Box::new(result))),
            Err(FlashdocError::Cancelled) => (JobState::Cancelled, JobOutcome::Cancelled),
            Err(err) => (JobState::Error, JobOutcome::Failed(err)),
        };

        if let Err(err) = job.transition(state) {
            tracing::warn!(job_id = %id, error = %err, "Could not record terminal state");
        }

        match &outcome {
            JobOutcome::Ready(result) => tracing::info!(
                job_id = %id,
                format = %result.format,
                chars = result.metadata.char_count,
                words = result.metadata.word_count,
                "Job ready"
            ),
            JobOutcome::Failed(err) => tracing::warn!(job_id = %id, kind = %err.kind(), error = %err, "Job failed"),
            JobOutcome::Cancelled => tracing::info!(job_id = %id, "Job cancelled"),
        }

        outcome
    }

    fn drive(&self, job: &mut Job, progress: &mut ProgressReporter<'_>) -> Result<ExtractionResult> {
        self.config.validate()?;
        check_size(job.request(), self.config.max_file_size)?;
        check_cancelled(job)?;

        job.transition(JobState::Dispatching)?;
        let format = dispatch(job.request().declared_type.as_deref(), &job.request().name)?;
        tracing::debug!(job_id = %job.id(), %format, "Format dispatched");

        job.transition(JobState::Extracting)?;
        let extractor = extractor_for(format);
        let raw = {
            let cancel = job.cancellation_token().clone();
            let (request, ocr) = job.request_and_ocr();
            let mut ctx = ExtractionContext {
                config: &self.config,
                ocr,
                renderer: self.renderer.as_ref(),
                cancel: &cancel,
                progress,
            };
            extractor.extract(&request.file, &mut ctx)?
        };
        check_cancelled(job)?;

        job.transition(JobState::Normalizing)?;
        let cleaned = if self.config.strip_page_markers {
            strip_page_markers(&raw.text)
        } else {
            raw.text.clone()
        };
        let text = normalize(&cleaned);
        let stats = TextStats::of(&text);
        let request = job.request();

        Ok(ExtractionResult {
            title: title_from_file_name(&request.name),
            format,
            preview: preview(&text, self.config.preview_length),
            structured: parse_structure(&text),
            metadata: ExtractionMetadata {
                file_name: request.name.clone(),
                file_size: request.size,
                file_type: declared_or_guessed_type(request),
                char_count: stats.char_count,
                word_count: stats.word_count,
                page_count: raw.page_count,
                ocr_page_count: raw.ocr_page_count,
            },
            text,
            raw_text: raw.text,
        })
    }
}

fn check_size(request: &JobRequest, max_file_size: u64) -> Result<()> {
    let size = request.size.max(request.file.len() as u64);
    if size > max_file_size {
        return Err(FlashdocError::validation(format!(
            "File is too large ({:.1} MB, max {} MB)",
            size as f64 / (1024.0 * 1024.0),
            max_file_size / (1024 * 1024)
        )));
    }
    Ok(())
}

fn check_cancelled(job: &Job) -> Result<()> {
    if job.is_cancelled() {
        return Err(FlashdocError::Cancelled);
    }
    Ok(())
}

fn declared_or_guessed_type(request: &JobRequest) -> String {
    match request.declared_type.as_deref().map(str::trim) {
        Some(declared) if !declared.is_empty() => declared.to_string(),
        _ => mime_guess::from_path(&request.name)
            .first_raw()
            .unwrap_or_default()
            .to_string(),
    }
}

/// Caller's side of a running job.
pub struct JobHandle {
    id: JobId,
    events: mpsc::UnboundedReceiver<ProgressEvent>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl JobHandle {
    pub fn id(&self) -> JobId {
        self.id
    }

    /// Request cancellation. Takes effect at the next page boundary; a no-op once the job has finished.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Next event, or `None` once the terminal event has been delivered.
    pub async fn next_event(&mut self) -> Option<ProgressEvent> {
        self.events.recv().await
    }

    /// Drain every remaining event.
    pub async fn collect_events(mut self) -> Vec<ProgressEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.events.recv().await {
            events.push(event);
        }
        if let Err(err) = self.task.await {
            tracing::error!(job_id = %self.id, error = %err, "Job task failed");
        }
        events
    }

    /// Wait for the terminal event, discarding progress.
    pub async fn wait(self) -> Option<ProgressEvent> {
        self.collect_events()
            .await
            .into_iter()
            .rev()
            .find(ProgressEvent::is_terminal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_size() {
        let request = JobRequest::new("a.txt", vec![0; 10]);
        assert!(check_size(&request, 10).is_ok());
        let err = check_size(&request, 9).unwrap_err();
        assert!(err.to_string().contains("too large"));

        let mut declared = JobRequest::new("b.txt", vec![]);
        declared.size = 30 * 1024 * 1024;
        assert!(check_size(&declared, 25 * 1024 * 1024).is_err());
    }

    #[test]
    fn test_declared_or_guessed_type() {
        let request = JobRequest::new("a.pdf", vec![]).with_declared_type("application/pdf");
        assert_eq!(declared_or_guessed_type(&request), "application/pdf");

        let request = JobRequest::new("notes.txt", vec![]);
        assert_eq!(declared_or_guessed_type(&request), "text/plain");

        let request = JobRequest::new("blob", vec![]);
        assert_eq!(declared_or_guessed_type(&request), "");
    }

    #[test]
    fn test_outcome_events() {
        assert_eq!(JobOutcome::Cancelled.into_event(), ProgressEvent::Cancelled);

        let event = JobOutcome::Failed(FlashdocError::UnsupportedFormat("application/zip".to_string())).into_event();
        assert!(matches!(
            event,
            ProgressEvent::Error { kind: ErrorKind::UnsupportedFormat, .. }
        ));

        let event = JobOutcome::Failed(FlashdocError::corrupt_document("DOCX text extraction failed: bad zip")).into_event();
        match event {
            ProgressEvent::Error { kind, message, detail } => {
                assert_eq!(kind, ErrorKind::CorruptDocument);
                assert!(!message.contains("bad zip"));
                assert_eq!(detail.as_deref(), Some("Corrupt document: DOCX text extraction failed: bad zip"));
            }
            other => panic!("expected error, got {:?}", other),
        }
    }

    #[test]
    fn test_extract_blocking_plain_text() {
        let pipeline = Pipeline::new(ExtractionConfig::default());
        let request = JobRequest::new("notes.md", b"# Cells\n\n\n\nThe  cell is the unit of life.".to_vec());
        let result = pipeline.extract_blocking(request).unwrap();

        assert_eq!(result.title, "notes");
        assert_eq!(result.text, "# Cells\n\nThe cell is the unit of life.");
        assert_eq!(result.metadata.word_count, 9);
        assert_eq!(result.metadata.file_type, "text/markdown");
        assert!(result.metadata.page_count.is_none());
    }

    #[test]
    fn test_run_blocking_emits_terminal_last() {
        let pipeline = Pipeline::new(ExtractionConfig::default());
        let mut events = Vec::new();
        let terminal = pipeline.run_blocking(
            JobRequest::new("a.xyz123", b"data".to_vec()),
            &CancellationToken::new(),
            &mut |e| events.push(e),
        );

        assert!(matches!(terminal, ProgressEvent::Error { kind: ErrorKind::UnsupportedFormat, .. }));
        assert_eq!(events.first().map(ProgressEvent::status), Some("processing"));
        assert_eq!(events.last(), Some(&terminal));
        assert_eq!(events.iter().filter(|e| e.is_terminal()).count(), 1);
    }
}
