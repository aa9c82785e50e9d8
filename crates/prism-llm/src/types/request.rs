//! Inbound chat request and the canonical completion request built from it

use serde::{Deserialize, Serialize};

use prism_config::ProviderKind;
use prism_tools::ToolSpec;

use super::message::Message;

/// How terse the assistant should be, expressed through the system preamble
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStyle {
    #[default]
    Concise,
    Detailed,
}

impl ResponseStyle {
    /// Instruction fragment embedded in the system preamble
    pub fn instruction(self) -> &'static str {
        match self {
            Self::Concise => "Keep answers concise and to the point.",
            Self::Detailed => "Give thorough, well-structured answers with supporting detail.",
        }
    }
}

/// A chat request as posted by a client
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<Message>,
    /// Provider family to route to, defaulting to completions-style
    #[serde(default)]
    pub provider: Option<ProviderKind>,
    /// Model override; the provider default is used when absent
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub response_style: Option<ResponseStyle>,
    /// Attach the web-search tool to this request
    #[serde(default)]
    pub use_web_search: bool,
    #[serde(default)]
    pub max_tokens: Option<u32>,
}

/// Fully resolved request handed to a provider adapter
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    /// Already clamped to the model's output ceiling
    pub max_tokens: u32,
    pub temperature: Option<f64>,
    /// Tool schemas attached to the request, `None` withholds tools
    pub tools: Option<Vec<ToolSpec>>,
}
