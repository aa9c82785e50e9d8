//! Mock completions-style backend for integration tests
//!
//! Implements a minimal OpenAI-compatible chat endpoint returning canned
//! responses, including streamed bodies and simulated tool calls.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Json, Router, routing};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

/// Mock completions backend that returns predictable responses
pub struct MockCompletions {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockState>,
}

struct MockState {
    request_count: AtomicU32,
    /// Requests to reject with a model-not-found error before succeeding
    unavailable_count: AtomicU32,
    response_content: Option<String>,
}

impl MockCompletions {
    /// Start the mock server, returning immediately
    pub async fn start() -> anyhow::Result<Self> {
        Self::start_inner(0, None).await
    }

    /// Start a mock server with custom response content
    pub async fn start_with_response(content: &str) -> anyhow::Result<Self> {
        Self::start_inner(0, Some(content.to_owned())).await
    }

    /// Start a mock server that declares the model unavailable for the
    /// first `n` requests
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
            .route("/v1/chat/completions", routing::post(handle_chat))
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

    /// Base URL for configuring the mock as a provider
    pub fn base_url(&self) -> String {
        format!("http://{}/v1", self.addr)
    }

    /// Number of completion requests received
    pub fn request_count(&self) -> u32 {
        self.state.request_count.load(Ordering::Relaxed)
    }
}

impl Drop for MockCompletions {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(default)]
    stream: Option<bool>,
    #[serde(default)]
    tools: Option<Vec<serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    role: String,
    #[serde(default)]
    #[allow(dead_code)]
    content: Option<serde_json::Value>,
}

async fn handle_chat(
    State(state): State<Arc<MockState>>,
    Json(req): Json<ChatRequest>,
) -> axum::response::Response {
    state.request_count.fetch_add(1, Ordering::Relaxed);

    if state.unavailable_count.load(Ordering::Relaxed) > 0 {
        state.unavailable_count.fetch_sub(1, Ordering::Relaxed);
        return (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({
                "error": {
                    "message": format!("The model '{}' does not exist", req.model),
                    "type": "invalid_request_error",
                    "param": "model",
                    "code": "model_not_found"
                }
            })),
        )
            .into_response();
    }

    let has_tool_results = req.messages.iter().any(|m| m.role == "tool");
    let content = if has_tool_results {
        "Answer grounded in tool results".to_owned()
    } else {
        state
            .response_content
            .clone()
            .unwrap_or_else(|| "Hello from mock completions".to_owned())
    };

    // A request carrying tool schemas gets a tool call; the follow-up
    // round withholds tools and gets text.
    let wants_tool_call = req.tools.is_some() && !has_tool_results;

    if req.stream.unwrap_or(false) {
        return streaming_body(&req.model, &content, wants_tool_call).into_response();
    }

    let message = if wants_tool_call {
        serde_json::json!({
            "role": "assistant",
            "content": null,
            "tool_calls": [{
                "id": "call_mock_1",
                "type": "function",
                "function": {
                    "name": "web_search",
                    "arguments": "{\"query\":\"rust\"}"
                }
            }]
        })
    } else {
        serde_json::json!({"role": "assistant", "content": content})
    };

    Json(serde_json::json!({
        "id": "chatcmpl-mock",
        "object": "chat.completion",
        "created": 1_700_000_000u64,
        "model": req.model,
        "choices": [{
            "index": 0,
            "message": message,
            "finish_reason": if wants_tool_call { "tool_calls" } else { "stop" }
        }],
        "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
    }))
    .into_response()
}

/// Build an SSE body in the completions stream framing
fn streaming_body(model: &str, content: &str, tool_call: bool) -> impl IntoResponse + use<> {
    let mut body = String::new();
    let mut push = |value: serde_json::Value| {
        body.push_str(&format!("data: {value}\n\n"));
    };

    if tool_call {
        // id and name arrive on the first fragment, arguments split
        // across the following ones
        push(serde_json::json!({
            "model": model,
            "choices": [{"index": 0, "delta": {"role": "assistant", "tool_calls": [{
                "index": 0,
                "id": "call_mock_stream",
                "type": "function",
                "function": {"name": "web_search", "arguments": ""}
            }]}, "finish_reason": null}]
        }));
        push(serde_json::json!({
            "model": model,
            "choices": [{"index": 0, "delta": {"tool_calls": [{
                "index": 0,
                "function": {"arguments": "{\"query\":"}
            }]}, "finish_reason": null}]
        }));
        push(serde_json::json!({
            "model": model,
            "choices": [{"index": 0, "delta": {"tool_calls": [{
                "index": 0,
                "function": {"arguments": "\"rust\"}"}
            }]}, "finish_reason": null}]
        }));
        push(serde_json::json!({
            "model": model,
            "choices": [{"index": 0, "delta": {}, "finish_reason": "tool_calls"}]
        }));
    } else {
        push(serde_json::json!({
            "model": model,
            "choices": [{"index": 0, "delta": {"role": "assistant", "content": ""},
                         "finish_reason": null}]
        }));
        for word in content.split_whitespace() {
            push(serde_json::json!({
                "model": model,
                "choices": [{"index": 0, "delta": {"content": format!("{word} ")},
                             "finish_reason": null}]
            }));
        }
        push(serde_json::json!({
            "model": model,
            "choices": [{"index": 0, "delta": {}, "finish_reason": "stop"}]
        }));
    }

    push(serde_json::json!({
        "model": model,
        "choices": [],
        "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
    }));
    body.push_str("data: [DONE]\n\n");

    (
        StatusCode::OK,
        [(axum::http::header::CONTENT_TYPE, "text/event-stream")],
        body,
    )
}
