//! Outbound call failures

use thiserror::Error;

/// Shown when the request never produced a usable reply
pub const FAILED_TO_GET_RESPONSE: &str = "Failed to get response";
/// Shown when the server answered with an error but no message
pub const SOMETHING_WENT_WRONG: &str = "Something went wrong";
/// Shown when the assistant itself could not produce an answer
pub const FAILED_TO_GET_AI_RESPONSE: &str = "Failed to get AI response";

/// Failure of one outbound call
///
/// `message` is what the user sees in the transcript; `detail` is only
/// logged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ChatFailure {
    pub kind: FailureKind,
    pub message: String,
    pub detail: Option<String>,
}

impl ChatFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            detail: None,
        }
    }

    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// The request never reached the server, or the reply could not be read
    pub fn transport() -> Self {
        Self::new(FailureKind::Transport, FAILED_TO_GET_RESPONSE)
    }

    /// The server answered with an error payload
    pub fn provider(error: Option<&str>) -> Self {
        let message = error
            .filter(|e| !e.is_empty())
            .unwrap_or(SOMETHING_WENT_WRONG);
        Self::new(FailureKind::Provider, message)
    }

    /// Success status but the body lacks the expected fields
    pub fn malformed() -> Self {
        Self::new(FailureKind::MalformedResponse, FAILED_TO_GET_RESPONSE)
    }

    /// The collaborator itself failed (model error, panic)
    pub fn collaborator() -> Self {
        Self::new(FailureKind::Collaborator, FAILED_TO_GET_AI_RESPONSE)
    }
}

/// Failure classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Transport,
    Provider,
    MalformedResponse,
    Collaborator,
}

impl FailureKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Transport => "transport",
            Self::Provider => "provider",
            Self::MalformedResponse => "malformed_response",
            Self::Collaborator => "collaborator",
        }
    }
}
