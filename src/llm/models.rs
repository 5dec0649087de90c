//! Model definitions
//!
//! Every model the assistant can be pointed at, with the factory that
//! builds its service.

use super::gemini::{GeminiModel, GeminiService};
use super::LlmService;
use std::sync::Arc;

/// Model definition with metadata
#[derive(Debug, Clone)]
pub struct ModelDef {
    /// User-facing model ID (e.g., "gemini-2.5-flash")
    pub id: &'static str,
    /// Human-readable description
    pub description: &'static str,
    /// Context window size in tokens
    pub context_window: usize,
    /// Factory function to create the service
    pub factory: fn(&str, Option<&str>) -> Result<Arc<dyn LlmService>, String>,
}

/// Model used when `DEFAULT_MODEL` is not set
pub const DEFAULT_MODEL_ID: &str = "gemini-2.5-flash";

/// Get all available model definitions
pub fn all_models() -> &'static [ModelDef] {
    &[
        ModelDef {
            id: "gemini-2.5-flash",
            description: "Gemini 2.5 Flash (fast, default)",
            context_window: 1_048_576,
            factory: |api_key, gateway| gemini(api_key, GeminiModel::Gemini25Flash, gateway),
        },
        ModelDef {
            id: "gemini-2.5-pro",
            description: "Gemini 2.5 Pro (most capable, slower)",
            context_window: 1_048_576,
            factory: |api_key, gateway| gemini(api_key, GeminiModel::Gemini25Pro, gateway),
        },
    ]
}

fn gemini(
    api_key: &str,
    model: GeminiModel,
    gateway: Option<&str>,
) -> Result<Arc<dyn LlmService>, String> {
    // Accept any non-empty key (including "implicit" for gateway mode)
    if api_key.is_empty() {
        return Err(format!(
            "{} requires GOOGLE_API_KEY or gateway",
            model.api_name()
        ));
    }
    GeminiService::new(api_key.to_string(), model, gateway)
        .map(|service| Arc::new(service) as Arc<dyn LlmService>)
        .map_err(|e| e.message)
}
