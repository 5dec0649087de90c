//! Submission state

use crate::collaborator::OutboundRequest;

/// Where the current submission stands
///
/// `Idle -> UserAppended -> Pending -> Idle`. The resolved outcome is
/// carried by the `Resolve` effect on the way back to `Idle`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SubmissionState {
    /// Ready for a question
    #[default]
    Idle,

    /// User turn recorded; the request is built but not yet dispatched
    UserAppended { request: OutboundRequest },

    /// Collaborator call in flight
    Pending,
}

impl SubmissionState {
    /// Whether a new submission would be refused
    pub fn is_busy(&self) -> bool {
        !matches!(self, SubmissionState::Idle)
    }

    pub fn name(&self) -> &'static str {
        match self {
            SubmissionState::Idle => "idle",
            SubmissionState::UserAppended { .. } => "user_appended",
            SubmissionState::Pending => "pending",
        }
    }
}
