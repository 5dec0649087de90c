//! Common types for LLM interactions

/// LLM request
#[derive(Debug, Clone)]
pub struct LlmRequest {
    pub system: Option<String>,
    pub messages: Vec<LlmMessage>,
    pub max_tokens: Option<u32>,
}

impl LlmRequest {
    /// Total characters of system and message text
    pub fn prompt_chars(&self) -> usize {
        let system = self.system.as_deref().map_or(0, str::len);
        system + self.messages.iter().map(|m| m.text.len()).sum::<usize>()
    }
}

/// Message in conversation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmMessage {
    pub role: MessageRole,
    pub text: String,
}

impl LlmMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            text: text.into(),
        }
    }
}

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageRole {
    User,
    #[allow(dead_code)] // Prompts are single-turn; history is inlined as text
    Assistant,
}

/// LLM response
#[derive(Debug, Clone)]
pub struct LlmResponse {
    /// Concatenated text parts of the first candidate
    pub text: String,
    pub end_turn: bool,
    pub usage: Usage,
}

/// Usage statistics
#[derive(Debug, Clone, Default)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}
