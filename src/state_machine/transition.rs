//! Pure state transition function

use super::{Effect, Event, SubmissionState};
use crate::collaborator::OutboundRequest;
use crate::session::Exchange;
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: SubmissionState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: SubmissionState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    #[must_use]
    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Errors that can occur during transition
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("Question is empty")]
    EmptyInput,
    #[error("A request is already pending, wait for it to finish")]
    AlreadyPending,
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// Pure transition function
///
/// `transcript` is the session as it stands before the event is applied;
/// a submission captures it as the request context before anything is
/// appended.
pub fn transition(
    state: &SubmissionState,
    transcript: &[Exchange],
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (state, event) {
        // Blank input is ignored whatever the state
        (_, Event::Submit { question }) if question.trim().is_empty() => {
            Err(TransitionError::EmptyInput)
        }

        // Idle + Submit -> UserAppended
        (SubmissionState::Idle, Event::Submit { question }) => {
            let request = OutboundRequest::new(question.clone(), transcript.to_vec());
            Ok(
                TransitionResult::new(SubmissionState::UserAppended { request })
                    .with_effect(Effect::AppendUser { text: question }),
            )
        }

        // Busy + Submit -> Reject
        (SubmissionState::UserAppended { .. } | SubmissionState::Pending, Event::Submit { .. }) => {
            Err(TransitionError::AlreadyPending)
        }

        // UserAppended + Dispatch -> Pending
        (SubmissionState::UserAppended { request }, Event::Dispatch) => {
            Ok(TransitionResult::new(SubmissionState::Pending)
                .with_effect(Effect::BeginPending)
                .with_effect(Effect::RequestCompletion {
                    request: request.clone(),
                }))
        }

        // Pending + completion -> Idle, resolved exactly once
        (SubmissionState::Pending, Event::CompletionSucceeded { text }) => {
            Ok(TransitionResult::new(SubmissionState::Idle).with_effect(Effect::Resolve {
                exchange: Exchange::assistant(text),
            }))
        }

        (SubmissionState::Pending, Event::CompletionFailed { failure }) => {
            Ok(TransitionResult::new(SubmissionState::Idle).with_effect(Effect::Resolve {
                exchange: Exchange::error(failure.message),
            }))
        }

        (state, event) => Err(TransitionError::InvalidTransition(format!(
            "No transition from {} with event {event:?}",
            state.name()
        ))),
    }
}
