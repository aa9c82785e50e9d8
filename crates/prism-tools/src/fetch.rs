//! Page fetching and HTML-to-text sanitization
//!
//! Reduces an arbitrary web page to plain, bounded-length body text. Every
//! failure mode (timeout, non-200, parse error) yields `None`: one
//! unreachable page must not abort a multi-result search.

use std::sync::OnceLock;
use std::time::Duration;

use ego_tree::NodeRef;
use scraper::{Html, Node, Selector};

/// Character budget for extracted page text
const CONTENT_BUDGET: usize = 3000;

/// User agent sent to third-party pages; many sites reject unknown clients
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36";

/// Elements whose subtrees carry no readable body text
const STRIP_TAGS: &[&str] = &["script", "style", "nav", "footer", "header", "iframe", "noscript"];

/// Containers tried in order before falling back to the full body
const CONTENT_SELECTORS: &[&str] = &["main", "article", "[role=\"main\"]", "#content", ".content"];

/// Fetches web pages and reduces them to plain text
pub struct PageFetcher {
    client: reqwest::Client,
}

impl PageFetcher {
    /// Create a fetcher with the given per-page timeout
    pub fn new(timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self { client }
    }

    /// Fetch a URL and extract readable text, `None` on any failure
    pub async fn fetch_text(&self, url: &str) -> Option<String> {
        let response = match self.client.get(url).send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!(url, error = %e, "page fetch failed");
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::debug!(url, status = %response.status(), "page returned non-success status");
            return None;
        }

        let html = response.text().await.ok()?;
        extract_readable_text(&html, CONTENT_BUDGET)
    }
}

fn content_selectors() -> &'static Vec<Selector> {
    static SELECTORS: OnceLock<Vec<Selector>> = OnceLock::new();
    SELECTORS.get_or_init(|| {
        CONTENT_SELECTORS
            .iter()
            .map(|s| Selector::parse(s).expect("valid static selector"))
            .collect()
    })
}

fn body_selector() -> &'static Selector {
    static BODY: OnceLock<Selector> = OnceLock::new();
    BODY.get_or_init(|| Selector::parse("body").expect("valid static selector"))
}

/// Reduce an HTML document to collapsed plain text within `budget` characters
///
/// Picks the first matching main-content container, falling back to `body`,
/// then the document root. Returns `None` when no text survives stripping.
pub fn extract_readable_text(html: &str, budget: usize) -> Option<String> {
    let document = Html::parse_document(html);

    let root = content_selectors()
        .iter()
        .find_map(|sel| document.select(sel).next())
        .or_else(|| document.select(body_selector()).next())
        .unwrap_or_else(|| document.root_element());

    let mut raw = String::new();
    collect_text(*root, &mut raw);

    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        return None;
    }

    Some(truncate_chars(&collapsed, budget))
}

/// Depth-first text collection skipping stripped subtrees
fn collect_text(node: NodeRef<'_, Node>, out: &mut String) {
    match node.value() {
        Node::Text(text) => {
            out.push_str(&text);
            out.push(' ');
        }
        Node::Element(element) => {
            if STRIP_TAGS.contains(&element.name()) {
                return;
            }
            for child in node.children() {
                collect_text(child, out);
            }
        }
        _ => {
            for child in node.children() {
                collect_text(child, out);
            }
        }
    }
}

/// Truncate to a character budget with a trailing ellipsis marker
fn truncate_chars(text: &str, budget: usize) -> String {
    match text.char_indices().nth(budget) {
        Some((cut, _)) => format!("{}…", &text[..cut]),
        None => text.to_owned(),
    }
}
