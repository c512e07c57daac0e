//! Backend-to-UI events and error modeling for the fare form.

use shared::protocol::PredictionOutcome;

use crate::controller::session::SubmissionId;

#[derive(Debug)]
pub enum UiEvent {
    BackendReady {
        endpoint: String,
    },
    PredictionFinished {
        submission: SubmissionId,
        outcome: PredictionOutcome,
    },
    Error(UiError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Configuration,
    Transport,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    Dispatch,
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        let message = message.into();
        let message_lower = message.to_ascii_lowercase();
        let category = if message_lower.contains("endpoint")
            || message_lower.contains("settings")
            || message_lower.contains("http client")
        {
            UiErrorCategory::Configuration
        } else if message_lower.contains("timeout")
            || message_lower.contains("timed out")
            || message_lower.contains("connection")
            || message_lower.contains("disconnected")
            || message_lower.contains("queue")
        {
            UiErrorCategory::Transport
        } else {
            UiErrorCategory::Unknown
        };

        Self {
            category,
            context,
            message,
        }
    }

    /// A worker that never started leaves nothing to retry against.
    pub fn blocks_submission(&self) -> bool {
        self.context == UiErrorContext::BackendStartup
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

pub fn err_label(category: UiErrorCategory) -> &'static str {
    match category {
        UiErrorCategory::Configuration => "Configuration",
        UiErrorCategory::Transport => "Transport",
        UiErrorCategory::Unknown => "Unexpected",
    }
}
