//! LLM provider abstraction
//!
//! The assistant reaches hosted models only through [`LlmService`]; the
//! registry decides which models exist for the current credentials.

mod error;
mod gemini;
mod models;
mod registry;
mod types;

pub use error::{LlmError, LlmErrorKind};
pub use models::{all_models, ModelDef, DEFAULT_MODEL_ID};
pub use registry::{LlmConfig, ModelInfo, ModelRegistry};
pub use types::*;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;

/// A hosted model that answers single prompts
#[async_trait]
pub trait LlmService: Send + Sync {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError>;

    fn model_id(&self) -> &str;
}

/// Records timing and token usage for every call to `inner`
pub struct LoggingService {
    inner: Arc<dyn LlmService>,
}

impl LoggingService {
    pub fn new(inner: Arc<dyn LlmService>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl LlmService for LoggingService {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let prompt_chars = request.prompt_chars();
        let start = Instant::now();
        let result = self.inner.complete(request).await;
        let duration_ms = start.elapsed().as_millis();

        match &result {
            Ok(response) => tracing::info!(
                model = self.inner.model_id(),
                duration_ms = %duration_ms,
                prompt_chars,
                answer_chars = response.text.len(),
                input_tokens = response.usage.input_tokens,
                output_tokens = response.usage.output_tokens,
                end_turn = response.end_turn,
                "Model answered"
            ),
            Err(e) => tracing::warn!(
                model = self.inner.model_id(),
                duration_ms = %duration_ms,
                prompt_chars,
                kind = ?e.kind,
                retryable = e.kind.is_retryable(),
                error = %e.message,
                "Model call failed"
            ),
        }

        result
    }

    fn model_id(&self) -> &str {
        self.inner.model_id()
    }
}
