//! Session state store
//!
//! Holds the ordered transcript of one browsing session and the in-flight
//! flag. The transcript only ever grows; every mutation is announced to
//! observers over a broadcast channel.

mod exchange;

#[cfg(test)]
mod proptests;

pub use exchange::{Exchange, ExchangeKind};

use serde::Serialize;
use thiserror::Error;
use tokio::sync::broadcast;

/// Observer notifications, one per changed field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    ExchangeAppended { index: usize, exchange: Exchange },
    PendingChanged { pending: bool },
}

/// Refused store mutations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("Input is empty")]
    EmptyInput,
    #[error("A request is already pending")]
    AlreadyPending,
    #[error("No request is pending")]
    NotPending,
    #[error("A user exchange cannot resolve a request")]
    UserResolution,
}

/// Read-only copy of a session for renderers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub transcript: Vec<Exchange>,
    pub pending: bool,
}

/// Transcript plus in-flight status
pub struct Session {
    transcript: Vec<Exchange>,
    pending: bool,
    notifier: broadcast::Sender<SessionEvent>,
}

impl Session {
    pub fn new(notifier: broadcast::Sender<SessionEvent>) -> Self {
        Self {
            transcript: Vec::new(),
            pending: false,
            notifier,
        }
    }

    /// Append a user turn. Whitespace-only text is refused and nothing changes.
    pub fn append_user(&mut self, text: &str) -> Result<usize, SessionError> {
        if text.trim().is_empty() {
            return Err(SessionError::EmptyInput);
        }
        Ok(self.push(Exchange::user(text)))
    }

    /// Mark a request as in flight. At most one may be pending.
    pub fn begin_pending(&mut self) -> Result<(), SessionError> {
        if self.pending {
            return Err(SessionError::AlreadyPending);
        }
        self.set_pending(true);
        Ok(())
    }

    /// Close the pending request with its answer or error.
    pub fn resolve(&mut self, exchange: Exchange) -> Result<usize, SessionError> {
        if !self.pending {
            return Err(SessionError::NotPending);
        }
        if !exchange.kind().resolves_request() {
            return Err(SessionError::UserResolution);
        }
        let index = self.push(exchange);
        self.set_pending(false);
        Ok(index)
    }

    pub fn transcript(&self) -> &[Exchange] {
        &self.transcript
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            transcript: self.transcript.clone(),
            pending: self.pending,
        }
    }

    fn push(&mut self, exchange: Exchange) -> usize {
        let index = self.transcript.len();
        self.transcript.push(exchange.clone());
        self.notify(SessionEvent::ExchangeAppended { index, exchange });
        index
    }

    fn set_pending(&mut self, pending: bool) {
        self.pending = pending;
        self.notify(SessionEvent::PendingChanged { pending });
    }

    fn notify(&self, event: SessionEvent) {
        // No subscribers is fine; the state is still readable via snapshot()
        let _ = self.notifier.send(event);
    }
}
