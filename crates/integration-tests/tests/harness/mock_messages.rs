//! Mock messages-style backend for integration tests
//!
//! Speaks the Anthropic-compatible messages endpoint with content blocks,
//! including a tool-use turn when tool schemas are attached.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Json, Router, routing};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

pub struct MockMessages {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockState>,
}

struct MockState {
    request_count: AtomicU32,
    unavailable_count: AtomicU32,
    response_content: Option<String>,
}

impl MockMessages {
    pub async fn start() -> anyhow::Result<Self> {
        Self::start_inner(0, None).await
    }

    pub async fn start_with_response(content: &str) -> anyhow::Result<Self> {
        Self::start_inner(0, Some(content.to_owned())).await
    }

    /// Declare the model unavailable for the first `n` requests
    pub async fn start_unavailable(n: u32) -> anyhow::Result<Self> {
        Self::start_inner(n, None).await
    }

    async fn start_inner(
        unavailable_count: u32,
        response_content: Option<String>,
    ) -> anyhow::Result<Self> {
        let state = Arc::new(MockState {
            request_count: AtomicU32::new(0),
            unavailable_count: AtomicU32::new(unavailable_count),
            response_content,
        });

        let app = Router::new()
            .route("/v1/messages", routing::post(handle_messages))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
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

    pub fn base_url(&self) -> String {
        format!("http://{}/v1", self.addr)
    }

    pub fn request_count(&self) -> u32 {
        self.state.request_count.load(Ordering::Relaxed)
    }
}

impl Drop for MockMessages {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

#[derive(Debug, Deserialize)]
struct MessagesRequest {
    model: String,
    messages: Vec<WireMessage>,
    #[serde(default)]
    tools: Option<Vec<serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
struct WireMessage {
    #[allow(dead_code)]
    role: String,
    content: serde_json::Value,
}

async fn handle_messages(
    State(state): State<Arc<MockState>>,
    Json(req): Json<MessagesRequest>,
) -> axum::response::Response {
    state.request_count.fetch_add(1, Ordering::Relaxed);

    if state.unavailable_count.load(Ordering::Relaxed) > 0 {
        state.unavailable_count.fetch_sub(1, Ordering::Relaxed);
        return (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({
                "type": "error",
                "error": {
                    "type": "not_found_error",
                    "message": format!("model: {}", req.model)
                }
            })),
        )
            .into_response();
    }

    let has_tool_results = req.messages.iter().any(|m| {
        m.content
            .as_array()
            .is_some_and(|blocks| blocks.iter().any(|b| b["type"] == "tool_result"))
    });

    let content = if req.tools.is_some() && !has_tool_results {
        serde_json::json!([{
            "type": "tool_use",
            "id": "toolu_mock_1",
            "name": "web_search",
            "input": {"query": "rust"}
        }])
    } else if has_tool_results {
        serde_json::json!([{"type": "text", "text": "Answer grounded in tool results"}])
    } else {
        let text = state
            .response_content
            .clone()
            .unwrap_or_else(|| "Hello from mock messages".to_owned());
        serde_json::json!([{"type": "text", "text": text}])
    };

    Json(serde_json::json!({
        "id": "msg_mock",
        "type": "message",
        "role": "assistant",
        "model": req.model,
        "content": content,
        "stop_reason": if req.tools.is_some() && !has_tool_results { "tool_use" } else { "end_turn" },
        "usage": {"input_tokens": 20, "output_tokens": 8}
    }))
    .into_response()
}
