//! In-process assistant: prompt template plus the registry's default model

use super::{ChatFailure, Collaborator, OutboundRequest};
use crate::llm::ModelRegistry;
use crate::prompt::build_request;
use async_trait::async_trait;
use std::sync::Arc;

pub struct AssistantCollaborator {
    registry: Arc<ModelRegistry>,
}

impl AssistantCollaborator {
    pub fn new(registry: Arc<ModelRegistry>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl Collaborator for AssistantCollaborator {
    async fn complete(&self, request: &OutboundRequest) -> Result<String, ChatFailure> {
        let llm = self.registry.default().ok_or_else(|| {
            ChatFailure::collaborator().with_detail(format!(
                "model {} is not configured",
                self.registry.default_model_id()
            ))
        })?;

        let llm_request = build_request(&request.question, &request.prior_turns);
        let response = llm
            .complete(&llm_request)
            .await
            .map_err(|e| ChatFailure::collaborator().with_detail(e.message))?;

        Ok(response.text)
    }
}
