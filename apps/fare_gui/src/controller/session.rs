//! Per-window holder of the latest prediction.
//!
//! One session exists per running window and starts empty. Each completed
//! submission overwrites the previous entry; nothing is merged or kept.

use shared::{
    domain::RideRequest,
    protocol::{PredictionOutcome, PredictionResult},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubmissionId(pub u64);

#[derive(Debug, Clone)]
pub struct SessionEntry {
    pub submission: SubmissionId,
    pub request: RideRequest,
    pub outcome: PredictionOutcome,
}

#[derive(Debug, Default)]
pub struct PredictionSession {
    latest: Option<SessionEntry>,
    pending: Option<(SubmissionId, RideRequest)>,
    issued: u64,
}

impl PredictionSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves the single in-flight slot. Returns `None` while a request is
    /// still running.
    pub fn begin(&mut self, request: &RideRequest) -> Option<SubmissionId> {
        if self.pending.is_some() {
            return None;
        }
        self.issued += 1;
        let submission = SubmissionId(self.issued);
        self.pending = Some((submission, request.clone()));
        Some(submission)
    }

    /// Stores the outcome if it belongs to the in-flight submission.
    pub fn complete(&mut self, submission: SubmissionId, outcome: PredictionOutcome) -> bool {
        match self.pending.take() {
            Some((pending, request)) if pending == submission => {
                self.latest = Some(SessionEntry {
                    submission,
                    request,
                    outcome,
                });
                true
            }
            other => {
                self.pending = other;
                false
            }
        }
    }

    /// Releases the in-flight slot when the request never reached the backend.
    pub fn release_pending(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn latest(&self) -> Option<&SessionEntry> {
        self.latest.as_ref()
    }

    pub fn latest_result(&self) -> Option<&PredictionResult> {
        self.latest.as_ref().map(|entry| &entry.outcome.result)
    }
}
