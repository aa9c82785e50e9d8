use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

/// Web search tool configuration
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SearchConfig {
    /// API key for the search backend
    #[serde(default)]
    pub api_key: Option<SecretString>,
    /// Base URL override for the search API
    #[serde(default)]
    pub base_url: Option<Url>,
    /// Default number of results returned per query
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    /// Whether result pages are fetched and summarized into `content`
    #[serde(default = "default_fetch_pages")]
    pub fetch_pages: bool,
    /// Per-page fetch timeout in seconds
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
}

const fn default_max_results() -> usize {
    4
}

const fn default_fetch_pages() -> bool {
    true
}

const fn default_fetch_timeout_secs() -> u64 {
    5
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            max_results: default_max_results(),
            fetch_pages: default_fetch_pages(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
        }
    }
}
