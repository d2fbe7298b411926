//! Progress and terminal events.
//!
//! A job emits zero or more non-terminal events (`processing`, `progress`)
//! followed by exactly one terminal event (`ready`, `error`, `cancelled`).

use crate::error::ErrorKind;
use crate::types::ExtractionResult;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What the extractor is doing while it reports progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    #[serde(rename = "reading text")]
    ReadingText,
    #[serde(rename = "preparing engine")]
    PreparingEngine,
    #[serde(rename = "running recognition")]
    RunningRecognition,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::ReadingText => "reading text",
            Phase::PreparingEngine => "preparing engine",
            Phase::RunningRecognition => "running recognition",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ProgressEvent {
    Processing {
        detail: String,
    },
    Progress {
        percent: u8,
        phase: Phase,
        detail: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        page: Option<usize>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        total_pages: Option<usize>,
    },
    Ready {
        content: Box<ExtractionResult>,
        preview: String,
    },
    Error {
        kind: ErrorKind,
        /// Message fit for the uploader.
        message: String,
        /// What actually went wrong, for logs and diagnostics.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        detail: Option<String>,
    },
    Cancelled,
}

impl ProgressEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ProgressEvent::Ready { .. } | ProgressEvent::Error { .. } | ProgressEvent::Cancelled
        )
    }

    pub fn status(&self) -> &'static str {
        match self {
            ProgressEvent::Processing { .. } => "processing",
            ProgressEvent::Progress { .. } => "progress",
            ProgressEvent::Ready { .. } => "ready",
            ProgressEvent::Error { .. } => "error",
            ProgressEvent::Cancelled => "cancelled",
        }
    }

    pub fn phase(&self) -> Option<Phase> {
        match self {
            ProgressEvent::Progress { phase, .. } => Some(*phase),
            _ => None,
        }
    }
}

/// Emits non-terminal events for one job, keeping `percent` non-decreasing.
pub struct ProgressReporter<'a> {
    sink: &'a mut dyn FnMut(ProgressEvent),
    last_percent: Option<u8>,
    last_phase: Option<Phase>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new(sink: &'a mut dyn FnMut(ProgressEvent)) -> Self {
        Self {
            sink,
            last_percent: None,
            last_phase: None,
        }
    }

    pub fn processing(&mut self, detail: impl Into<String>) {
        (self.sink)(ProgressEvent::Processing { detail: detail.into() });
    }

    /// Per-page progress. Always emitted; `percent` is raised to the last reported value if lower.
    pub fn page(&mut self, page: usize, total_pages: usize, phase: Phase) {
        let percent = if total_pages == 0 {
            100
        } else {
            ((page as f64 / total_pages as f64) * 100.0).round().min(100.0) as u8
        };
        let percent = self.last_percent.map_or(percent, |last| percent.max(last));
        self.last_percent = Some(percent);
        self.last_phase = Some(phase);
        (self.sink)(ProgressEvent::Progress {
            percent,
            phase,
            detail: format!("Page {} of {}", page, total_pages),
            page: Some(page),
            total_pages: Some(total_pages),
        });
    }

    /// Progress from a single unit of work (an image recognition).
    ///
    /// Repeats and decreases are dropped, so the emitted sequence is strictly
    /// increasing within a phase.
    pub fn step(&mut self, percent: u8, phase: Phase, detail: &str) {
        let percent = percent.min(100);
        if self.last_phase == Some(phase)
            && let Some(last) = self.last_percent
            && percent <= last
        {
            return;
        }
        if let Some(last) = self.last_percent
            && percent < last
        {
            return;
        }
        self.last_percent = Some(percent);
        self.last_phase = Some(phase);
        (self.sink)(ProgressEvent::Progress {
            percent,
            phase,
            detail: detail.to_string(),
            page: None,
            total_pages: None,
        });
    }
}
