//! HTTP API for Thinkr
//!
//! Hosts the assistant backend (`/api/chat`) and the session surface
//! (`/api/sessions/...`).

mod handlers;
mod sse;
mod types;

pub use handlers::create_router;

use crate::collaborator::{AssistantCollaborator, Collaborator};
use crate::llm::ModelRegistry;
use crate::runtime::SessionManager;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionManager>,
    pub assistant: Arc<AssistantCollaborator>,
    pub llm_registry: Arc<ModelRegistry>,
}

impl AppState {
    /// `sessions_via` answers session questions; `/api/chat` always uses the
    /// in-process assistant.
    pub fn new(
        llm_registry: Arc<ModelRegistry>,
        sessions_via: Option<Arc<dyn Collaborator>>,
    ) -> Self {
        let assistant = Arc::new(AssistantCollaborator::new(llm_registry.clone()));
        let collaborator =
            sessions_via.unwrap_or_else(|| assistant.clone() as Arc<dyn Collaborator>);
        Self {
            sessions: Arc::new(SessionManager::new(collaborator)),
            assistant,
            llm_registry,
        }
    }
}
