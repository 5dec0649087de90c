//! Model registry for managing available LLM providers

use super::{all_models, LlmService, LoggingService, ModelDef, DEFAULT_MODEL_ID};
use std::collections::HashMap;
use std::sync::Arc;

/// Configuration for LLM providers
#[derive(Debug, Clone, Default)]
pub struct LlmConfig {
    pub google_api_key: Option<String>,
    /// Gateway URL that fronts the provider and injects credentials
    pub gateway: Option<String>,
    /// Default model ID
    pub default_model: Option<String>,
}

impl LlmConfig {
    pub fn from_env() -> Self {
        Self {
            google_api_key: std::env::var("GOOGLE_API_KEY").ok(),
            gateway: std::env::var("LLM_GATEWAY").ok(),
            default_model: std::env::var("DEFAULT_MODEL").ok(),
        }
    }
}

/// Summary of a registered model
#[derive(Debug, Clone, serde::Serialize)]
pub struct ModelInfo {
    pub id: String,
    pub description: String,
    pub context_window: usize,
}

/// Registry of available LLM models
pub struct ModelRegistry {
    services: HashMap<String, Arc<dyn LlmService>>,
    default_model: String,
}

impl ModelRegistry {
    pub fn new(config: &LlmConfig) -> Self {
        let mut services: HashMap<String, Arc<dyn LlmService>> = HashMap::new();

        for model_def in all_models() {
            if let Some(service) = Self::try_create_model(model_def, config) {
                services.insert(model_def.id.to_string(), service);
            }
        }

        let default_model = config
            .default_model
            .clone()
            .unwrap_or_else(|| DEFAULT_MODEL_ID.to_string());

        Self {
            services,
            default_model,
        }
    }

    /// Registry over prebuilt services
    #[cfg(test)]
    pub fn from_services(
        default_model: &str,
        services: impl IntoIterator<Item = Arc<dyn LlmService>>,
    ) -> Self {
        Self {
            services: services
                .into_iter()
                .map(|s| (s.model_id().to_string(), s))
                .collect(),
            default_model: default_model.to_string(),
        }
    }

    /// Try to create a model service, validating prerequisites
    fn try_create_model(model_def: &ModelDef, config: &LlmConfig) -> Option<Arc<dyn LlmService>> {
        // In gateway mode, use "implicit" as the API key
        let api_key = if config.gateway.is_some() {
            "implicit".to_string()
        } else {
            config.google_api_key.clone()?
        };

        if config.gateway.is_none() && api_key.is_empty() {
            return None;
        }

        match (model_def.factory)(&api_key, config.gateway.as_deref()) {
            Ok(service) => Some(Arc::new(LoggingService::new(service))),
            Err(e) => {
                tracing::warn!(model = model_def.id, error = %e, "Model unavailable");
                None
            }
        }
    }

    /// Get a model by ID
    pub fn get(&self, model_id: &str) -> Option<Arc<dyn LlmService>> {
        self.services.get(model_id).cloned()
    }

    /// Get the default model
    pub fn default(&self) -> Option<Arc<dyn LlmService>> {
        self.get(&self.default_model)
    }

    pub fn default_model_id(&self) -> &str {
        &self.default_model
    }

    /// List all available model IDs
    pub fn available_models(&self) -> Vec<String> {
        let mut models: Vec<_> = self.services.keys().cloned().collect();
        models.sort();
        models
    }

    pub fn available_model_info(&self) -> Vec<ModelInfo> {
        all_models()
            .iter()
            .filter(|def| self.services.contains_key(def.id))
            .map(|def| ModelInfo {
                id: def.id.to_string(),
                description: def.description.to_string(),
                context_window: def.context_window,
            })
            .collect()
    }

    pub fn has_models(&self) -> bool {
        !self.services.is_empty()
    }
}
