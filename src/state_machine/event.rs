//! Events that drive a submission

use crate::collaborator::ChatFailure;

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    // User events
    Submit { question: String },

    // Executor events
    /// The user turn is recorded; send the request out
    Dispatch,

    // Collaborator events
    CompletionSucceeded { text: String },
    CompletionFailed { failure: ChatFailure },
}
