//! Web search tool backed by the Brave Search API

use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use url::Url;

use prism_config::SearchConfig;

use crate::error::ToolError;
use crate::fetch::PageFetcher;
use crate::registry::{Tool, ToolSpec};

/// Default search API base URL
const DEFAULT_BASE_URL: &str = "https://api.search.brave.com/res/v1";

/// Hard cap on results per query regardless of caller input
const MAX_RESULTS_CAP: usize = 8;

/// Simultaneous page fetches during result enrichment
const FETCH_CONCURRENCY: usize = 3;

/// One ranked search hit, optionally enriched with page text
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    /// Result title
    pub title: String,
    /// Result URL
    pub url: String,
    /// Search-engine snippet
    pub description: String,
    /// Sanitized page text, absent when fetching failed or is disabled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

// -- Brave wire types --

#[derive(Debug, Deserialize)]
struct BraveResponse {
    web: Option<BraveWebResults>,
}

#[derive(Debug, Deserialize)]
struct BraveWebResults {
    results: Vec<BraveWebResult>,
}

#[derive(Debug, Deserialize)]
struct BraveWebResult {
    title: String,
    url: String,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchArgs {
    query: String,
    #[serde(default)]
    max_results: Option<usize>,
}

/// Web search tool querying an external search API
pub struct WebSearchTool {
    client: reqwest::Client,
    api_key: Option<SecretString>,
    base_url: Url,
    default_max_results: usize,
    fetcher: Option<PageFetcher>,
}

impl WebSearchTool {
    /// Create from search configuration
    ///
    /// # Panics
    ///
    /// Panics if the hardcoded default base URL is invalid (should never happen).
    pub fn new(config: &SearchConfig) -> Self {
        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| Url::parse(DEFAULT_BASE_URL).expect("valid default URL"));

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        let fetcher = config
            .fetch_pages
            .then(|| PageFetcher::new(Duration::from_secs(config.fetch_timeout_secs)));

        Self {
            client,
            api_key: config.api_key.clone(),
            base_url,
            default_max_results: config.max_results,
            fetcher,
        }
    }

    /// Query the search API and enrich results with page text
    pub async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>, ToolError> {
        if query.trim().is_empty() {
            return Err(ToolError::InvalidArguments("query must not be empty".to_owned()));
        }

        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| ToolError::MissingCredential("search API key is not configured".to_owned()))?;

        let count = max_results.clamp(1, MAX_RESULTS_CAP);

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ToolError::ExecutionFailed("search base URL cannot be a base".to_owned()))?
            .pop_if_empty()
            .extend(["web", "search"]);
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("count", &count.to_string());

        tracing::debug!(query, count, "issuing web search");

        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .header("X-Subscription-Token", api_key.expose_secret())
            .send()
            .await
            .map_err(|e| ToolError::ExecutionFailed(format!("search request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ToolError::ExecutionFailed(format!(
                "search API returned {status}: {body}"
            )));
        }

        let data: BraveResponse = response
            .json()
            .await
            .map_err(|e| ToolError::ExecutionFailed(format!("failed to parse search response: {e}")))?;

        let hits: Vec<SearchHit> = data
            .web
            .map(|web| web.results)
            .unwrap_or_default()
            .into_iter()
            .take(count)
            .map(|r| SearchHit {
                title: r.title,
                url: r.url,
                description: r.description.unwrap_or_default(),
                content: None,
            })
            .collect();

        Ok(self.enrich(hits).await)
    }

    /// Fetch page text for each hit with bounded concurrency
    ///
    /// Result order is preserved; a fetch failure leaves that hit's
    /// `content` absent while the others stay enriched.
    async fn enrich(&self, hits: Vec<SearchHit>) -> Vec<SearchHit> {
        let Some(fetcher) = &self.fetcher else {
            return hits;
        };

        futures_util::stream::iter(hits)
            .map(|mut hit| async move {
                hit.content = fetcher.fetch_text(&hit.url).await;
                hit
            })
            .buffered(FETCH_CONCURRENCY)
            .collect()
            .await
    }
}

fn search_parameters() -> &'static serde_json::Value {
    static PARAMS: OnceLock<serde_json::Value> = OnceLock::new();
    PARAMS.get_or_init(|| {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query"
                },
                "max_results": {
                    "type": "integer",
                    "description": "Maximum number of results to return"
                }
            },
            "required": ["query"]
        })
    })
}

#[async_trait]
impl Tool for WebSearchTool {
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: "web_search".to_owned(),
            description: "Search the web for current information. Returns ranked results with \
                          titles, URLs, descriptions, and page content where available."
                .to_owned(),
            parameters: search_parameters().clone(),
        }
    }

    async fn execute(&self, arguments: &str) -> Result<String, ToolError> {
        let args: SearchArgs =
            serde_json::from_str(arguments).map_err(|e| ToolError::InvalidArguments(e.to_string()))?;

        let max_results = args.max_results.unwrap_or(self.default_max_results);
        let hits = self.search(&args.query, max_results).await?;

        if hits.is_empty() {
            return Ok(format!("No search results found for '{}'.", args.query));
        }

        serde_json::to_string_pretty(&hits).map_err(|e| ToolError::ExecutionFailed(e.to_string()))
    }
}
