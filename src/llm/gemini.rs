//! Google Gemini provider implementation

use super::types::{LlmMessage, LlmRequest, LlmResponse, MessageRole, Usage};
use super::{LlmError, LlmService};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Gemini models
#[derive(Debug, Clone, Copy)]
pub enum GeminiModel {
    Gemini25Flash,
    Gemini25Pro,
}

impl GeminiModel {
    pub fn api_name(self) -> &'static str {
        match self {
            GeminiModel::Gemini25Flash => "gemini-2.5-flash",
            GeminiModel::Gemini25Pro => "gemini-2.5-pro",
        }
    }
}

/// Gemini service implementation
pub struct GeminiService {
    client: Client,
    api_key: String,
    model: GeminiModel,
    url: String,
}

impl GeminiService {
    pub fn new(api_key: String, model: GeminiModel, gateway: Option<&str>) -> Result<Self, LlmError> {
        let url = match gateway {
            Some(gw) => format!(
                "{}/gemini/v1beta/models/{}:generateContent",
                gw.trim_end_matches('/'),
                model.api_name()
            ),
            None => format!(
                "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent",
                model.api_name()
            ),
        };

        // No client-side timeout: a request runs until the provider answers or fails
        let client = Client::builder()
            .build()
            .map_err(|e| LlmError::unknown(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            model,
            url,
        })
    }

    fn translate_request(request: &LlmRequest) -> GeminiRequest {
        let system_instruction = request.system.as_ref().map(|text| GeminiContent {
            role: None,
            parts: vec![GeminiPart { text: text.clone() }],
        });

        let contents = request
            .messages
            .iter()
            .filter(|msg| !msg.text.is_empty())
            .map(|msg: &LlmMessage| GeminiContent {
                role: Some(
                    match msg.role {
                        MessageRole::User => "user",
                        MessageRole::Assistant => "model",
                    }
                    .to_string(),
                ),
                parts: vec![GeminiPart {
                    text: msg.text.clone(),
                }],
            })
            .collect();

        GeminiRequest {
            contents,
            system_instruction,
            generation_config: request.max_tokens.map(|max| GeminiGenerationConfig {
                max_output_tokens: Some(max),
            }),
        }
    }

    fn normalize_response(resp: GeminiResponse) -> Result<LlmResponse, LlmError> {
        let candidate = resp
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::unknown("No candidates in response"))?;

        let text = candidate
            .content
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .map(|part| part.text)
                    .collect::<String>()
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(LlmError::unknown(format!(
                "Empty response (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            )));
        }

        let end_turn = candidate.finish_reason.as_deref() == Some("STOP");
        let usage = resp.usage_metadata.unwrap_or_default();

        Ok(LlmResponse {
            text,
            end_turn,
            usage: Usage {
                input_tokens: u64::from(usage.prompt_token_count),
                output_tokens: u64::from(usage.candidates_token_count),
            },
        })
    }
}

#[async_trait]
impl LlmService for GeminiService {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let gemini_request = Self::translate_request(request);

        let mut builder = self.client.post(&self.url).json(&gemini_request);
        if self.api_key != "implicit" {
            // Direct mode; the gateway handles authentication otherwise
            builder = builder.header("x-goog-api-key", &self.api_key);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                LlmError::network(format!("Request timeout: {e}"))
            } else if e.is_connect() {
                LlmError::network(format!("Connection failed: {e}"))
            } else {
                LlmError::unknown(format!("Request failed: {e}"))
            }
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| LlmError::network(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            let message = serde_json::from_str::<GeminiErrorResponse>(&body)
                .map_or(body, |error_resp| error_resp.error.message);
            return Err(LlmError::from_status(status.as_u16(), &message));
        }

        let gemini_response: GeminiResponse = serde_json::from_str(&body)
            .map_err(|e| LlmError::unknown(format!("Failed to parse response: {e} - body: {body}")))?;

        Self::normalize_response(gemini_response)
    }

    fn model_id(&self) -> &str {
        self.model.api_name()
    }
}

// Gemini API types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GeminiGenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    usage_metadata: Option<GeminiUsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorResponse {
    error: GeminiError,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    message: String,
}
