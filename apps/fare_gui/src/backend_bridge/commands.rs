//! Backend commands queued from UI to backend worker.

use shared::domain::RideRequest;

use crate::controller::session::SubmissionId;

#[derive(Debug)]
pub enum BackendCommand {
    Predict {
        submission: SubmissionId,
        request: RideRequest,
    },
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BackendCommand::Predict { .. } => "predict",
        }
    }
}
