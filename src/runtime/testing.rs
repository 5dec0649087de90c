//! Mock collaborators and a small harness for driving session runtimes
//!
//! These mocks enable integration testing without real I/O.

use super::{spawn_session, SessionHandle};
use crate::collaborator::{ChatFailure, Collaborator, OutboundRequest};
use crate::session::SessionEvent;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{broadcast, Notify};

// ============================================================================
// Mock Collaborator
// ============================================================================

/// Collaborator that returns queued outcomes
pub struct MockCollaborator {
    outcomes: Mutex<VecDeque<Result<String, ChatFailure>>>,
    /// Record of all requests made
    pub requests: Mutex<Vec<OutboundRequest>>,
}

impl MockCollaborator {
    pub fn new() -> Self {
        Self {
            outcomes: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn queue_answer(&self, text: impl Into<String>) {
        self.outcomes.lock().unwrap().push_back(Ok(text.into()));
    }

    pub fn queue_failure(&self, failure: ChatFailure) {
        self.outcomes.lock().unwrap().push_back(Err(failure));
    }

    pub fn recorded_requests(&self) -> Vec<OutboundRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn next(&self, request: &OutboundRequest) -> Result<String, ChatFailure> {
        self.requests.lock().unwrap().push(request.clone());
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ChatFailure::transport().with_detail("No mock outcome queued")))
    }
}

impl Default for MockCollaborator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Collaborator for MockCollaborator {
    async fn complete(&self, request: &OutboundRequest) -> Result<String, ChatFailure> {
        self.next(request)
    }
}

// ============================================================================
// Gated Mock Collaborator (holds the request open)
// ============================================================================

/// Collaborator that waits for `release` before answering
pub struct GatedMockCollaborator {
    inner: MockCollaborator,
    /// Notified when a request starts (for test synchronization)
    pub request_started: Arc<Notify>,
    pub release: Arc<Notify>,
}

impl GatedMockCollaborator {
    pub fn new() -> Self {
        Self {
            inner: MockCollaborator::new(),
            request_started: Arc::new(Notify::new()),
            release: Arc::new(Notify::new()),
        }
    }

    pub fn queue_answer(&self, text: impl Into<String>) {
        self.inner.queue_answer(text);
    }

    pub fn recorded_requests(&self) -> Vec<OutboundRequest> {
        self.inner.recorded_requests()
    }
}

#[async_trait]
impl Collaborator for GatedMockCollaborator {
    async fn complete(&self, request: &OutboundRequest) -> Result<String, ChatFailure> {
        self.request_started.notify_one();
        self.release.notified().await;
        self.inner.next(request)
    }
}

/// Collaborator that panics mid-call
pub struct PanickingCollaborator;

#[async_trait]
impl Collaborator for PanickingCollaborator {
    async fn complete(&self, _request: &OutboundRequest) -> Result<String, ChatFailure> {
        panic!("collaborator blew up");
    }
}

// ============================================================================
// Test Harness
// ============================================================================

/// A running session plus a subscription opened before any submit
pub struct TestSession<C: Collaborator + 'static> {
    pub handle: SessionHandle,
    pub events: broadcast::Receiver<SessionEvent>,
    pub collaborator: Arc<C>,
}

impl<C: Collaborator + 'static> TestSession<C> {
    pub fn start(collaborator: C) -> Self {
        let collaborator = Arc::new(collaborator);
        let handle = spawn_session("test-session", Arc::clone(&collaborator));
        let events = handle.subscribe();
        Self {
            handle,
            events,
            collaborator,
        }
    }

    /// Wait until the pending flag clears
    pub async fn wait_for_idle(&mut self, timeout: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;
        while tokio::time::Instant::now() < deadline {
            match tokio::time::timeout(Duration::from_millis(50), self.events.recv()).await {
                Ok(Ok(SessionEvent::PendingChanged { pending: false })) => return true,
                _ => continue,
            }
        }
        false
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborator::{FailureKind, FAILED_TO_GET_AI_RESPONSE, FAILED_TO_GET_RESPONSE};
    use crate::runtime::{SessionManager, SubmitAck, SubmitError};
    use crate::session::{Exchange, ExchangeKind};

    const WAIT: Duration = Duration::from_secs(2);
    const ACE: &str = "How do I pass the Associate Cloud Engineer exam?";

    #[tokio::test]
    async fn test_mock_collaborator() {
        let mock = MockCollaborator::new();
        mock.queue_answer("Hello");

        let request = OutboundRequest::new("hi", vec![]);
        assert_eq!(mock.complete(&request).await.unwrap(), "Hello");

        // Second call should fail (nothing queued)
        let failure = mock.complete(&request).await.unwrap_err();
        assert_eq!(failure.kind, FailureKind::Transport);
        assert_eq!(mock.recorded_requests().len(), 2);
    }

    /// Answer lands after the user turn
    #[tokio::test]
    async fn test_successful_answer() {
        let mock = MockCollaborator::new();
        mock.queue_answer("Study the exam guide...");

        let mut rt = TestSession::start(mock);
        assert_eq!(rt.handle.submit(ACE).await, Ok(SubmitAck::Accepted));
        assert!(rt.wait_for_idle(WAIT).await);

        let snapshot = rt.handle.snapshot().await.unwrap();
        assert_eq!(
            snapshot.transcript,
            vec![Exchange::user(ACE), Exchange::assistant("Study the exam guide...")]
        );
        assert!(!snapshot.pending);
    }

    /// Provider error message is shown verbatim
    #[tokio::test]
    async fn test_provider_error_resolves_as_error() {
        let mock = MockCollaborator::new();
        mock.queue_failure(ChatFailure::provider(Some("rate limited")));

        let mut rt = TestSession::start(mock);
        rt.handle.submit(ACE).await.unwrap();
        assert!(rt.wait_for_idle(WAIT).await);

        let snapshot = rt.handle.snapshot().await.unwrap();
        assert_eq!(
            snapshot.transcript,
            vec![Exchange::user(ACE), Exchange::error("rate limited")]
        );
    }

    #[tokio::test]
    async fn test_transport_failure_resolves_as_error() {
        let mock = MockCollaborator::new();
        mock.queue_failure(ChatFailure::transport());

        let mut rt = TestSession::start(mock);
        rt.handle.submit(ACE).await.unwrap();
        assert!(rt.wait_for_idle(WAIT).await);

        let snapshot = rt.handle.snapshot().await.unwrap();
        assert_eq!(snapshot.transcript[1], Exchange::error(FAILED_TO_GET_RESPONSE));
        assert!(!snapshot.pending);
    }

    #[tokio::test]
    async fn test_blank_question_changes_nothing() {
        let rt = TestSession::start(MockCollaborator::new());
        assert_eq!(rt.handle.submit("   ").await, Ok(SubmitAck::Ignored));

        let snapshot = rt.handle.snapshot().await.unwrap();
        assert!(snapshot.transcript.is_empty());
        assert!(!snapshot.pending);
        assert!(rt.collaborator.recorded_requests().is_empty());
    }

    /// A second question while the first is in flight is refused
    #[tokio::test]
    async fn test_second_submit_rejected_while_pending() {
        let gated = GatedMockCollaborator::new();
        gated.queue_answer("first answer");
        gated.queue_answer("second answer");

        let mut rt = TestSession::start(gated);
        let started = Arc::clone(&rt.collaborator.request_started);
        let release = Arc::clone(&rt.collaborator.release);

        rt.handle.submit("first").await.unwrap();
        started.notified().await;

        assert_eq!(rt.handle.submit("second").await, Err(SubmitError::Busy));
        let snapshot = rt.handle.snapshot().await.unwrap();
        assert_eq!(snapshot.transcript, vec![Exchange::user("first")]);
        assert!(snapshot.pending);

        release.notify_one();
        assert!(rt.wait_for_idle(WAIT).await);

        let snapshot = rt.handle.snapshot().await.unwrap();
        assert_eq!(
            snapshot.transcript,
            vec![Exchange::user("first"), Exchange::assistant("first answer")]
        );

        // Accepted once the first resolved
        assert_eq!(rt.handle.submit("second").await, Ok(SubmitAck::Accepted));
        started.notified().await;
        release.notify_one();
        assert!(rt.wait_for_idle(WAIT).await);

        let snapshot = rt.handle.snapshot().await.unwrap();
        assert_eq!(snapshot.transcript.len(), 4);
        assert_eq!(snapshot.transcript[3], Exchange::assistant("second answer"));
        assert_eq!(rt.collaborator.recorded_requests().len(), 2);
    }

    /// Pending is observable between submit and resolution
    #[tokio::test]
    async fn test_events_follow_submission_order() {
        let mock = MockCollaborator::new();
        mock.queue_answer("answer");

        let mut rt = TestSession::start(mock);
        rt.handle.submit("question").await.unwrap();

        let mut seen = Vec::new();
        for _ in 0..4 {
            let event = tokio::time::timeout(WAIT, rt.events.recv())
                .await
                .unwrap()
                .unwrap();
            seen.push(event);
        }

        assert_eq!(
            seen,
            vec![
                SessionEvent::ExchangeAppended {
                    index: 0,
                    exchange: Exchange::user("question"),
                },
                SessionEvent::PendingChanged { pending: true },
                SessionEvent::ExchangeAppended {
                    index: 1,
                    exchange: Exchange::assistant("answer"),
                },
                SessionEvent::PendingChanged { pending: false },
            ]
        );
    }

    /// Each request carries the transcript as it stood before the question
    #[tokio::test]
    async fn test_history_sent_with_follow_up() {
        let mock = MockCollaborator::new();
        mock.queue_answer("ACE is entry level");
        mock.queue_failure(ChatFailure::provider(None));
        mock.queue_answer("Start with the exam guide");

        let mut rt = TestSession::start(mock);
        for question in ["Tell me about ACE", "And PCA?", "Where do I start?"] {
            rt.handle.submit(question).await.unwrap();
            assert!(rt.wait_for_idle(WAIT).await);
        }

        let requests = rt.collaborator.recorded_requests();
        assert_eq!(requests.len(), 3);
        assert!(requests[0].prior_turns.is_empty());
        assert_eq!(requests[1].prior_turns.len(), 2);
        assert_eq!(requests[2].question, "Where do I start?");
        assert_eq!(requests[2].prior_turns[3].kind(), ExchangeKind::Error);

        // Strict user / resolution alternation
        let transcript = rt.handle.snapshot().await.unwrap().transcript;
        assert_eq!(transcript.len(), 6);
        for pair in transcript.chunks(2) {
            assert_eq!(pair[0].kind(), ExchangeKind::User);
            assert!(pair[1].kind().resolves_request());
        }
    }

    /// A panic in the collaborator still resolves the request
    #[tokio::test]
    async fn test_panicking_collaborator_resolves() {
        let mut rt = TestSession::start(PanickingCollaborator);
        rt.handle.submit(ACE).await.unwrap();
        assert!(rt.wait_for_idle(WAIT).await);

        let snapshot = rt.handle.snapshot().await.unwrap();
        assert_eq!(snapshot.transcript[1], Exchange::error(FAILED_TO_GET_AI_RESPONSE));
        assert!(!snapshot.pending);
    }

    #[tokio::test]
    async fn test_closed_session_refuses_work() {
        let rt = TestSession::start(MockCollaborator::new());
        rt.handle.close().await;

        // Give the task a moment to exit
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(rt.handle.submit("hello").await, Err(SubmitError::Closed));
        assert!(rt.handle.snapshot().await.is_none());
    }

    #[tokio::test]
    async fn test_manager_tracks_sessions() {
        let manager = SessionManager::new(Arc::new(MockCollaborator::new()));
        let a = manager.create().await;
        let b = manager.create().await;
        assert_ne!(a.id(), b.id());
        assert_eq!(manager.count().await, 2);

        assert!(manager.get(a.id()).await.is_some());
        assert!(manager.discard(a.id()).await);
        assert!(!manager.discard(a.id()).await);
        assert!(manager.get(a.id()).await.is_none());
        assert_eq!(manager.count().await, 1);
    }

    /// Dropping every handle ends the session task and its transcript
    #[tokio::test]
    async fn test_dropped_handle_ends_session() {
        let handle = spawn_session("orphan", Arc::new(MockCollaborator::new()));
        let mut events = handle.subscribe();
        drop(handle);

        let closed = tokio::time::timeout(WAIT, events.recv()).await.unwrap();
        assert_eq!(closed, Err(broadcast::error::RecvError::Closed));
    }

    /// An in-flight answer still lands after the caller lets go of the handle
    #[tokio::test]
    async fn test_pending_request_outlives_handle() {
        let mock = MockCollaborator::new();
        mock.queue_answer("late answer");
        let handle = spawn_session("orphan", Arc::new(mock));
        let mut events = handle.subscribe();

        handle.submit("question").await.unwrap();
        drop(handle);

        let mut seen = Vec::new();
        while let Ok(Ok(event)) = tokio::time::timeout(WAIT, events.recv()).await {
            seen.push(event);
        }
        assert_eq!(
            seen.last(),
            Some(&SessionEvent::PendingChanged { pending: false })
        );
    }

    #[tokio::test]
    async fn test_evict_idle_spares_watched_sessions() {
        let manager = SessionManager::new(Arc::new(MockCollaborator::new()));
        let idle = manager.create().await;
        let watched = manager.create().await;
        let observer = watched.subscribe();

        assert_eq!(manager.evict_idle(Duration::from_secs(3600)).await, 0);
        assert_eq!(manager.evict_idle(Duration::ZERO).await, 1);
        assert!(manager.get(idle.id()).await.is_none());
        assert!(manager.get(watched.id()).await.is_some());

        // Evicted session task is gone
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(idle.submit("hello").await, Err(SubmitError::Closed));

        drop(observer);
        assert_eq!(manager.evict_idle(Duration::ZERO).await, 1);
        assert_eq!(manager.count().await, 0);
    }

    /// Sessions never see each other's transcripts
    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let mock = Arc::new(MockCollaborator::new());
        mock.queue_answer("one");
        let manager = SessionManager::new(mock);

        let a = manager.create().await;
        let b = manager.create().await;
        let mut events = a.subscribe();
        a.submit("only in a").await.unwrap();

        loop {
            let event = tokio::time::timeout(WAIT, events.recv()).await.unwrap().unwrap();
            if event == (SessionEvent::PendingChanged { pending: false }) {
                break;
            }
        }

        assert_eq!(a.snapshot().await.unwrap().transcript.len(), 2);
        assert!(b.snapshot().await.unwrap().transcript.is_empty());
    }
}
