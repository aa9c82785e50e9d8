//! Provider response types in canonical form

use serde::{Deserialize, Serialize};

use super::message::ToolCall;

/// Shown to the caller when a provider returns no text at all
pub const EMPTY_RESPONSE_PLACEHOLDER: &str =
    "The model returned an empty response. Please try rephrasing your request.";

/// Token accounting for one completion
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl Usage {
    pub fn total_tokens(&self) -> u32 {
        self.prompt_tokens + self.completion_tokens
    }

    /// Combine usage across a tool round and its follow-up completion
    pub fn accumulate(&mut self, other: Usage) {
        self.prompt_tokens += other.prompt_tokens;
        self.completion_tokens += other.completion_tokens;
    }
}

/// One completion as returned by a provider adapter
///
/// `text` and `tool_calls` are not exclusive: a provider may emit
/// commentary alongside the calls it requests.
#[derive(Debug, Clone)]
pub struct ProviderResponse {
    /// Model that actually produced the completion
    pub model: String,
    pub text: Option<String>,
    pub tool_calls: Vec<ToolCall>,
    pub usage: Usage,
}

impl ProviderResponse {
    /// Response text, substituting the empty-response placeholder
    pub fn text_or_placeholder(self) -> String {
        match self.text {
            Some(text) if !text.trim().is_empty() => text,
            _ => EMPTY_RESPONSE_PLACEHOLDER.to_owned(),
        }
    }
}

/// Final result of a buffered chat request
#[derive(Debug, Clone, Serialize)]
pub struct CompletionResult {
    pub text: String,
    /// Model that produced the answer, after any fallback
    pub model: String,
    pub usage: Usage,
}
