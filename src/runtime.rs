//! Runtime for chat sessions
//!
//! Each session runs as one tokio task that owns its [`Session`] and is the
//! only writer to it. Callers talk to the task through a [`SessionHandle`].

mod executor;

#[cfg(test)]
pub mod testing;

pub use executor::SessionRuntime;

use crate::collaborator::Collaborator;
use crate::session::{Session, SessionEvent, SessionSnapshot};
use crate::state_machine::Event;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, oneshot, RwLock};

/// Commands processed by a session task, one at a time
#[derive(Debug)]
pub enum SessionCommand {
    Submit {
        question: String,
        ack: oneshot::Sender<Result<SubmitAck, SubmitError>>,
    },
    Snapshot {
        reply: oneshot::Sender<SessionSnapshot>,
    },
    /// Outcome of the collaborator call, sent by the completion task
    Complete(Event),
    Close,
}

/// How a submission was taken
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitAck {
    /// User turn recorded and the request is in flight
    Accepted,
    /// Blank question; nothing changed
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("A request is already pending, wait for it to finish")]
    Busy,
    #[error("Session is closed")]
    Closed,
    #[error("Session could not record the question")]
    Internal,
}

/// Handle to interact with a running session
///
/// The session task runs for as long as any handle (or an in-flight
/// completion) is alive.
#[derive(Clone)]
pub struct SessionHandle {
    id: String,
    command_tx: mpsc::Sender<SessionCommand>,
    broadcast_tx: broadcast::Sender<SessionEvent>,
    last_active: Arc<Mutex<Instant>>,
}

impl SessionHandle {
    pub fn id(&self) -> &str {
        &self.id
    }

    fn touch(&self) {
        *self.last_active.lock().unwrap_or_else(PoisonError::into_inner) = Instant::now();
    }

    /// Time since the last submit, snapshot or subscribe
    pub fn idle_for(&self) -> Duration {
        self.last_active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .elapsed()
    }

    /// Number of live observers, e.g. open SSE streams
    pub fn observer_count(&self) -> usize {
        self.broadcast_tx.receiver_count()
    }

    /// Submit a question. Returns once the user turn is recorded and the
    /// request dispatched; the answer arrives later as a [`SessionEvent`].
    pub async fn submit(&self, question: impl Into<String>) -> Result<SubmitAck, SubmitError> {
        self.touch();
        let (ack, rx) = oneshot::channel();
        self.command_tx
            .send(SessionCommand::Submit {
                question: question.into(),
                ack,
            })
            .await
            .map_err(|_| SubmitError::Closed)?;
        rx.await.map_err(|_| SubmitError::Closed)?
    }

    pub async fn snapshot(&self) -> Option<SessionSnapshot> {
        self.touch();
        let (reply, rx) = oneshot::channel();
        self.command_tx
            .send(SessionCommand::Snapshot { reply })
            .await
            .ok()?;
        rx.await.ok()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.touch();
        self.broadcast_tx.subscribe()
    }

    /// Stop the session task. An in-flight request still runs, its result
    /// is dropped.
    pub async fn close(&self) {
        let _ = self.command_tx.send(SessionCommand::Close).await;
    }
}

/// Start a session task over `collaborator` and return its handle
pub fn spawn_session<C>(id: impl Into<String>, collaborator: Arc<C>) -> SessionHandle
where
    C: Collaborator + ?Sized + 'static,
{
    let id = id.into();
    let (command_tx, command_rx) = mpsc::channel(32);
    let (broadcast_tx, _) = broadcast::channel(128);

    let runtime = SessionRuntime::new(
        id.clone(),
        Session::new(broadcast_tx.clone()),
        collaborator,
        command_rx,
        command_tx.downgrade(),
    );

    let session_id = id.clone();
    tokio::spawn(async move {
        runtime.run().await;
        tracing::info!(session_id = %session_id, "Session runtime finished");
    });

    SessionHandle {
        id,
        command_tx,
        broadcast_tx,
        last_active: Arc::new(Mutex::new(Instant::now())),
    }
}

/// Manager for all live sessions
pub struct SessionManager {
    collaborator: Arc<dyn Collaborator>,
    sessions: RwLock<HashMap<String, SessionHandle>>,
}

impl SessionManager {
    pub fn new(collaborator: Arc<dyn Collaborator>) -> Self {
        Self {
            collaborator,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Start a fresh, empty session
    pub async fn create(&self) -> SessionHandle {
        let id = uuid::Uuid::new_v4().to_string();
        let handle = spawn_session(id.clone(), Arc::clone(&self.collaborator));
        self.sessions.write().await.insert(id.clone(), handle.clone());
        tracing::info!(session_id = %id, "Session created");
        handle
    }

    pub async fn get(&self, session_id: &str) -> Option<SessionHandle> {
        self.sessions.read().await.get(session_id).cloned()
    }

    /// Drop a session and its transcript. Returns false if it did not exist.
    pub async fn discard(&self, session_id: &str) -> bool {
        let removed = self.sessions.write().await.remove(session_id);
        match removed {
            Some(handle) => {
                handle.close().await;
                tracing::info!(session_id = %session_id, "Session discarded");
                true
            }
            None => false,
        }
    }

    pub async fn count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Discard sessions idle for at least `max_idle` with nobody watching.
    /// Returns how many were removed.
    pub async fn evict_idle(&self, max_idle: Duration) -> usize {
        let evicted: Vec<SessionHandle> = {
            let mut sessions = self.sessions.write().await;
            let stale: Vec<String> = sessions
                .values()
                .filter(|h| h.observer_count() == 0 && h.idle_for() >= max_idle)
                .map(|h| h.id().to_string())
                .collect();
            stale.iter().filter_map(|id| sessions.remove(id)).collect()
        };

        for handle in &evicted {
            handle.close().await;
            tracing::info!(session_id = %handle.id(), "Idle session evicted");
        }
        evicted.len()
    }

    /// Periodically evict sessions abandoned by navigation or reload
    pub fn spawn_idle_sweeper(self: Arc<Self>, max_idle: Duration) {
        let period = (max_idle / 4).max(Duration::from_secs(1));
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                let evicted = self.evict_idle(max_idle).await;
                if evicted > 0 {
                    let remaining = self.count().await;
                    tracing::info!(evicted, remaining, "Idle sweep");
                }
            }
        });
    }
}
