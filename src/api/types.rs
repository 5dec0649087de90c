//! API request and response types

use crate::llm::ModelInfo;
use crate::session::Exchange;
use serde::{Deserialize, Serialize};

/// Body of `POST /api/chat`
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub query: String,
    #[serde(rename = "chatHistory", default)]
    pub chat_history: Vec<ChatTurn>,
}

/// One prior turn as sent by chat clients
///
/// `type` is free-form here: `user` is the asker, `error` an error
/// exchange, anything else is read as the assistant.
#[derive(Debug, Deserialize)]
pub struct ChatTurn {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub content: String,
}

impl From<ChatTurn> for Exchange {
    fn from(turn: ChatTurn) -> Self {
        match turn.kind.as_str() {
            "user" => Exchange::user(turn.content),
            "error" => Exchange::error(turn.content),
            _ => Exchange::assistant(turn.content),
        }
    }
}

/// Answer from the assistant backend
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
}

/// Response with a new session's id
#[derive(Debug, Serialize)]
pub struct CreateSessionResponse {
    pub id: String,
}

/// Request to ask a question in a session
#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    #[serde(default)]
    pub question: String,
}

/// Response for submit; `accepted` is false for blank questions
#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub accepted: bool,
}

/// Response for lifecycle actions
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Response for model list
#[derive(Debug, Serialize)]
pub struct ModelsResponse {
    pub models: Vec<ModelInfo>,
    pub default: String,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
