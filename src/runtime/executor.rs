//! Session runtime executor

use super::{SessionCommand, SubmitAck, SubmitError};
use crate::collaborator::{ChatFailure, Collaborator, OutboundRequest};
use crate::session::{Exchange, ExchangeKind, Session, SessionError};
use crate::state_machine::{transition, Effect, Event, SubmissionState, TransitionError};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio::sync::mpsc;

/// Why an event could not be applied
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error("Session store refused effect: {0}")]
    Session(#[from] SessionError),
}

/// Generic session runtime that can work with any collaborator
pub struct SessionRuntime<C>
where
    C: Collaborator + ?Sized + 'static,
{
    session_id: String,
    state: SubmissionState,
    session: Session,
    collaborator: Arc<C>,
    command_rx: mpsc::Receiver<SessionCommand>,
    /// Upgraded for completion tasks so results come back through the queue.
    /// Weak so the loop ends once every handle is gone.
    command_tx: mpsc::WeakSender<SessionCommand>,
}

impl<C> SessionRuntime<C>
where
    C: Collaborator + ?Sized + 'static,
{
    pub fn new(
        session_id: String,
        session: Session,
        collaborator: Arc<C>,
        command_rx: mpsc::Receiver<SessionCommand>,
        command_tx: mpsc::WeakSender<SessionCommand>,
    ) -> Self {
        Self {
            session_id,
            state: SubmissionState::Idle,
            session,
            collaborator,
            command_rx,
            command_tx,
        }
    }

    pub async fn run(mut self) {
        tracing::info!(session_id = %self.session_id, "Starting session runtime");

        while let Some(command) = self.command_rx.recv().await {
            match command {
                SessionCommand::Submit { question, ack } => {
                    let _ = ack.send(self.submit(question));
                }
                SessionCommand::Snapshot { reply } => {
                    let _ = reply.send(self.session.snapshot());
                }
                SessionCommand::Complete(event) => {
                    if let Err(e) = self.process_event(event) {
                        self.recover(&e);
                    }
                }
                SessionCommand::Close => break,
            }
            debug_assert_eq!(self.state.is_busy(), self.session.is_pending());
        }

        tracing::info!(
            session_id = %self.session_id,
            exchanges = self.session.transcript().len(),
            "Session runtime stopped"
        );
    }

    /// Record the question and dispatch the request
    fn submit(&mut self, question: String) -> Result<SubmitAck, SubmitError> {
        match self.process_event(Event::Submit { question }) {
            Ok(()) => {}
            Err(RuntimeError::Transition(TransitionError::EmptyInput)) => {
                tracing::debug!(session_id = %self.session_id, "Ignoring blank question");
                return Ok(SubmitAck::Ignored);
            }
            Err(RuntimeError::Transition(TransitionError::AlreadyPending)) => {
                tracing::debug!(session_id = %self.session_id, "Rejecting question while pending");
                return Err(SubmitError::Busy);
            }
            Err(e) => {
                self.recover(&e);
                return Err(SubmitError::Internal);
            }
        }

        // UserAppended always dispatches straight away. If that fails the
        // recorded question is resolved with an error instead.
        if let Err(e) = self.process_event(Event::Dispatch) {
            self.recover(&e);
        }
        Ok(SubmitAck::Accepted)
    }

    /// Bring state and store back in line after a failed event.
    ///
    /// Ends in `Idle` with nothing pending, and a trailing user turn gets
    /// exactly one error exchange.
    fn recover(&mut self, error: &RuntimeError) {
        tracing::error!(
            session_id = %self.session_id,
            state = self.state.name(),
            error = %error,
            "Event failed, resetting session"
        );
        self.state = SubmissionState::Idle;

        let awaiting_answer = self.session.is_pending()
            || self.session.transcript().last().map(Exchange::kind) == Some(ExchangeKind::User);
        if !awaiting_answer {
            return;
        }
        if !self.session.is_pending() {
            if let Err(e) = self.session.begin_pending() {
                tracing::error!(session_id = %self.session_id, error = %e, "Recovery failed");
                return;
            }
        }
        let failure = ChatFailure::collaborator().with_detail(error.to_string());
        if let Err(e) = self.session.resolve(Exchange::error(failure.message)) {
            tracing::error!(session_id = %self.session_id, error = %e, "Recovery failed");
        }
    }

    fn process_event(&mut self, event: Event) -> Result<(), RuntimeError> {
        let result = transition(&self.state, self.session.transcript(), event)?;

        tracing::debug!(
            session_id = %self.session_id,
            from = self.state.name(),
            to = result.new_state.name(),
            effects = result.effects.len(),
            "Transition"
        );

        self.state = result.new_state;
        for effect in result.effects {
            self.execute_effect(effect)?;
        }
        Ok(())
    }

    fn execute_effect(&mut self, effect: Effect) -> Result<(), RuntimeError> {
        match effect {
            Effect::AppendUser { text } => {
                self.session.append_user(&text)?;
            }
            Effect::BeginPending => self.session.begin_pending()?,
            Effect::RequestCompletion { request } => self.spawn_completion(request),
            Effect::Resolve { exchange } => {
                self.session.resolve(exchange)?;
            }
        }
        Ok(())
    }

    /// Run the collaborator on its own task and feed the outcome back.
    ///
    /// The call is spawned separately and its `JoinHandle` awaited, so a
    /// panicking collaborator still produces a `CompletionFailed`.
    fn spawn_completion(&self, request: OutboundRequest) {
        let Some(command_tx) = self.command_tx.upgrade() else {
            // No handle left to observe the answer; the loop is about to end
            tracing::debug!(session_id = %self.session_id, "Session abandoned, skipping request");
            return;
        };
        let collaborator = Arc::clone(&self.collaborator);
        let session_id = self.session_id.clone();

        tokio::spawn(async move {
            let start = Instant::now();
            let call = tokio::spawn(async move { collaborator.complete(&request).await });

            let event = match call.await {
                Ok(Ok(text)) => {
                    tracing::info!(
                        session_id = %session_id,
                        duration_ms = %start.elapsed().as_millis(),
                        "Completion succeeded"
                    );
                    Event::CompletionSucceeded { text }
                }
                Ok(Err(failure)) => {
                    tracing::warn!(
                        session_id = %session_id,
                        duration_ms = %start.elapsed().as_millis(),
                        kind = failure.kind.as_str(),
                        error = %failure.message,
                        detail = failure.detail.as_deref().unwrap_or(""),
                        "Completion failed"
                    );
                    Event::CompletionFailed { failure }
                }
                Err(join_error) => {
                    tracing::error!(
                        session_id = %session_id,
                        error = %join_error,
                        "Collaborator task aborted"
                    );
                    Event::CompletionFailed {
                        failure: ChatFailure::collaborator().with_detail(join_error.to_string()),
                    }
                }
            };

            if command_tx.send(SessionCommand::Complete(event)).await.is_err() {
                tracing::debug!(session_id = %session_id, "Session closed before completion");
            }
        });
    }
}
