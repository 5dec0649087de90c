//! Certification-assistant prompt construction
//!
//! Turns a question and the prior transcript into a single-turn model
//! request. Prior turns are inlined as text so the model sees the thread
//! the follow-up refers to.

use crate::llm::{LlmMessage, LlmRequest};
use crate::session::{Exchange, ExchangeKind};
use std::fmt::Write;

/// Role the assistant plays for every request
const ASSISTANT_ROLE: &str = "You are a helpful assistant that can answer questions and concerns about Google Cloud Certifications. You can help users with questions about the certification process, exam details, and project ideas. You can also provide information about the different certification paths and the benefits of getting certified.";

const FOLLOW_UP_GUIDANCE: &str = r#"IMPORTANT: If this is a follow-up question (like "What about this?" or "What career paths?"), focus your answer specifically on the certification or topic mentioned in the previous conversation. Only mention other certifications if they are directly relevant to the specific question being asked. Stay focused on the context of the ongoing conversation."#;

const CLOSING: &str = "Please provide a helpful and detailed response that stays on topic.";

/// How many prior turns are quoted back to the model
const HISTORY_WINDOW: usize = 6;

/// Build the model request for `question` given the turns before it.
pub fn build_request(question: &str, history: &[Exchange]) -> LlmRequest {
    let mut prompt = format!(
        "Please answer this question about Google Cloud Certifications: {}",
        question.trim()
    );

    if let Some(context) = history_context(history) {
        prompt.push_str("\n\n");
        prompt.push_str(&context);
    }

    let _ = write!(prompt, "\n\n{FOLLOW_UP_GUIDANCE}\n\n{CLOSING}");

    LlmRequest {
        system: Some(ASSISTANT_ROLE.to_string()),
        messages: vec![LlmMessage::user(prompt)],
        max_tokens: None,
    }
}

/// Render the most recent turns as `Role: text` lines.
fn history_context(history: &[Exchange]) -> Option<String> {
    if history.is_empty() {
        return None;
    }

    let start = history.len().saturating_sub(HISTORY_WINDOW);
    let mut context = String::from("Previous conversation context:");
    for exchange in &history[start..] {
        let role = match exchange.kind() {
            ExchangeKind::User => "User",
            ExchangeKind::Assistant | ExchangeKind::Error => "Assistant",
        };
        let _ = write!(context, "\n{role}: {}", exchange.text());
    }
    Some(context)
}
