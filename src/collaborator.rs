//! The orchestrator's outbound capability
//!
//! A collaborator turns a question plus the transcript before it into
//! answer text. It may be slow and it may fail; every failure comes back
//! as a [`ChatFailure`] carrying the message to show the user.

mod assistant;
mod error;
mod http;

pub use assistant::AssistantCollaborator;
pub use error::{
    ChatFailure, FailureKind, FAILED_TO_GET_AI_RESPONSE, FAILED_TO_GET_RESPONSE,
    SOMETHING_WENT_WRONG,
};
pub use http::HttpCollaborator;

use crate::session::Exchange;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One submission as sent to the collaborator
///
/// Serializes to the chat endpoint body: `{query, chatHistory}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundRequest {
    #[serde(rename = "query")]
    pub question: String,
    #[serde(rename = "chatHistory", default)]
    pub prior_turns: Vec<Exchange>,
}

impl OutboundRequest {
    pub fn new(question: impl Into<String>, prior_turns: Vec<Exchange>) -> Self {
        Self {
            question: question.into(),
            prior_turns,
        }
    }
}

/// Produces answer text for a submission
#[async_trait]
pub trait Collaborator: Send + Sync {
    async fn complete(&self, request: &OutboundRequest) -> Result<String, ChatFailure>;
}

#[async_trait]
impl<T: Collaborator + ?Sized> Collaborator for Arc<T> {
    async fn complete(&self, request: &OutboundRequest) -> Result<String, ChatFailure> {
        (**self).complete(request).await
    }
}
