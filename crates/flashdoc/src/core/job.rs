//! Job identity and state machine.

use crate::ocr::OcrSession;
use crate::types::JobRequest;
use crate::{FlashdocError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Received,
    Dispatching,
    Extracting,
    Normalizing,
    Ready,
    Error,
    Cancelled,
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Ready | JobState::Error | JobState::Cancelled)
    }

    /// Legal moves: forward one step along the happy path, or from any
    /// non-terminal state into `Error` or `Cancelled`.
    pub fn can_transition_to(&self, next: JobState) -> bool {
        use JobState::*;

        match (self, next) {
            (Received, Dispatching) | (Dispatching, Extracting) | (Extracting, Normalizing) | (Normalizing, Ready) => {
                true
            }
            (from, Error | Cancelled) => !from.is_terminal(),
            _ => false,
        }
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JobState::Received => "received",
            JobState::Dispatching => "dispatching",
            JobState::Extracting => "extracting",
            JobState::Normalizing => "normalizing",
            JobState::Ready => "ready",
            JobState::Error => "error",
            JobState::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// One file's end-to-end extraction.
///
/// Owns the job's OCR session. Entering a terminal state terminates the
/// engine; dropping the job does the same if that never happened.
pub struct Job {
    id: JobId,
    request: JobRequest,
    state: JobState,
    cancel: CancellationToken,
    ocr: OcrSession,
}

impl Job {
    pub fn new(id: JobId, request: JobRequest, cancel: CancellationToken, ocr: OcrSession) -> Self {
        Self {
            id,
            request,
            state: JobState::Received,
            cancel,
            ocr,
        }
    }

    pub fn id(&self) -> JobId {
        self.id
    }

    pub fn request(&self) -> &JobRequest {
        &self.request
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    /// Borrow the request and the OCR session at the same time.
    pub(crate) fn request_and_ocr(&mut self) -> (&JobRequest, &mut OcrSession) {
        (&self.request, &mut self.ocr)
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Move to `next`.
    ///
    /// # Errors
    ///
    /// Returns `FlashdocError::Other` for an illegal transition; the state is left unchanged.
    pub fn transition(&mut self, next: JobState) -> Result<()> {
        if !self.state.can_transition_to(next) {
            return Err(FlashdocError::Other(format!(
                "Illegal job state transition: {} -> {}",
                self.state, next
            )));
        }

        tracing::debug!(job_id = %self.id, from = %self.state, to = %next, "Job state transition");
        self.state = next;

        if next.is_terminal() {
            self.ocr.terminate();
        }
        Ok(())
    }
}
