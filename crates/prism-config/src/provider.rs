use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

/// Configuration for a single chat provider
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderConfig {
    /// Wire protocol spoken by this provider
    #[serde(rename = "type")]
    pub kind: ProviderKind,
    /// API key for authentication
    #[serde(default)]
    pub api_key: Option<SecretString>,
    /// Base URL override
    #[serde(default)]
    pub base_url: Option<Url>,
    /// Default model when the caller does not name one
    #[serde(default)]
    pub default_model: Option<String>,
}

/// Supported chat provider wire protocols
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// Completions-style API: one flat message array, function-call tool turns
    Completions,
    /// Messages-style API: top-level system field, tool use as content blocks
    Messages,
}

impl ProviderKind {
    /// Human-readable label used in system preambles and logs
    pub const fn label(self) -> &'static str {
        match self {
            Self::Completions => "completions",
            Self::Messages => "messages",
        }
    }
}
