//! Transcript entries

use serde::{Deserialize, Serialize};

/// Who produced an exchange
///
/// Wire names follow the chat front-end: assistant turns travel as `bot`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExchangeKind {
    User,
    #[serde(rename = "bot", alias = "assistant")]
    Assistant,
    Error,
}

impl ExchangeKind {
    /// Kinds that may close a pending request
    pub fn resolves_request(self) -> bool {
        matches!(self, Self::Assistant | Self::Error)
    }
}

/// One immutable turn of the transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exchange {
    #[serde(rename = "type")]
    kind: ExchangeKind,
    #[serde(rename = "content")]
    text: String,
}

impl Exchange {
    pub fn new(kind: ExchangeKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(ExchangeKind::User, text)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(ExchangeKind::Assistant, text)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(ExchangeKind::Error, text)
    }

    pub fn kind(&self) -> ExchangeKind {
        self.kind
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}
