//! Mock search backend and page host for web-search tests
//!
//! Serves a Brave-compatible search endpoint whose results point back at
//! the mock's own page routes, plus one URL that is never reachable.

use std::net::SocketAddr;
use std::sync::{Arc, OnceLock};
use std::sync::atomic::{AtomicU32, Ordering};

use axum::extract::State;
use axum::response::{Html, IntoResponse};
use axum::{Json, Router, routing};
use tokio_util::sync::CancellationToken;

pub struct MockSearch {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockState>,
}

struct MockState {
    /// Own listen address, filled in once the listener is bound
    addr: OnceLock<SocketAddr>,
    search_count: AtomicU32,
    page_count: AtomicU32,
    /// Include a result whose URL points at a closed port
    include_unreachable: bool,
}

impl MockSearch {
    pub async fn start() -> anyhow::Result<Self> {
        Self::start_inner(false).await
    }

    /// Start with one result pointing at an unreachable host
    pub async fn start_with_unreachable_result() -> anyhow::Result<Self> {
        Self::start_inner(true).await
    }

    async fn start_inner(include_unreachable: bool) -> anyhow::Result<Self> {
        let state = Arc::new(MockState {
            addr: OnceLock::new(),
            search_count: AtomicU32::new(0),
            page_count: AtomicU32::new(0),
            include_unreachable,
        });

        let app = Router::new()
            .route("/res/v1/web/search", routing::get(handle_search))
            .route("/page/{id}", routing::get(handle_page))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        state.addr.set(addr).expect("address set once");
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self { addr, shutdown, state })
    }

    /// Base URL for the search tool configuration
    pub fn base_url(&self) -> String {
        format!("http://{}/res/v1", self.addr)
    }

    pub fn search_count(&self) -> u32 {
        self.state.search_count.load(Ordering::Relaxed)
    }

    pub fn page_count(&self) -> u32 {
        self.state.page_count.load(Ordering::Relaxed)
    }
}

impl Drop for MockSearch {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn handle_search(State(state): State<Arc<MockState>>) -> impl IntoResponse {
    state.search_count.fetch_add(1, Ordering::Relaxed);
    let host = state.addr.get().expect("address set at startup");

    let mut results = vec![
        serde_json::json!({
            "title": "First result",
            "url": format!("http://{host}/page/1"),
            "description": "A relevant page"
        }),
        serde_json::json!({
            "title": "Second result",
            "url": format!("http://{host}/page/2"),
            "description": "Another relevant page"
        }),
    ];
    if state.include_unreachable {
        results.insert(
            1,
            serde_json::json!({
                "title": "Dead link",
                "url": "http://127.0.0.1:9/unreachable",
                "description": "This host never answers"
            }),
        );
    }

    Json(serde_json::json!({"web": {"results": results}}))
}

async fn handle_page(
    State(state): State<Arc<MockState>>,
    axum::extract::Path(id): axum::extract::Path<u32>,
) -> impl IntoResponse {
    state.page_count.fetch_add(1, Ordering::Relaxed);
    Html(format!(
        "<html><body><nav>menu</nav><main><p>Readable text of page {id}.</p></main>\
         <script>ignored()</script></body></html>"
    ))
}
