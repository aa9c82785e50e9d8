//! HTTP surface for the chat gateway

use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::response::sse::Event;
use axum::response::{IntoResponse, Response, Sse};
use axum::routing::post;
use axum::Json;
use futures_util::StreamExt;
use serde::Serialize;

use crate::error::GatewayError;
use crate::gateway::ChatGateway;
use crate::types::ChatRequest;

#[derive(Clone)]
struct AppState {
    gateway: Arc<ChatGateway>,
}

/// Build the chat routes
pub fn router(gateway: Arc<ChatGateway>) -> Router {
    Router::new()
        .route("/chat", post(chat))
        .route("/chat/stream", post(chat_stream))
        .with_state(AppState { gateway })
}

#[derive(Serialize)]
struct ChatResponseBody {
    message: String,
    model: String,
    usage: UsageBody,
}

#[derive(Serialize)]
struct UsageBody {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

async fn chat(State(state): State<AppState>, Json(request): Json<ChatRequest>) -> Response {
    match state.gateway.chat(request).await {
        Ok(result) => Json(ChatResponseBody {
            message: result.text,
            model: result.model,
            usage: UsageBody {
                prompt_tokens: result.usage.prompt_tokens,
                completion_tokens: result.usage.completion_tokens,
                total_tokens: result.usage.total_tokens(),
            },
        })
        .into_response(),
        Err(e) => error_response(&e),
    }
}

async fn chat_stream(State(state): State<AppState>, Json(request): Json<ChatRequest>) -> Response {
    match state.gateway.chat_stream(request).await {
        Ok(stream) => {
            let events = stream.map(|event| Event::default().json_data(&event));
            Sse::new(events).into_response()
        }
        Err(e) => error_response(&e),
    }
}

fn error_response(error: &GatewayError) -> Response {
    tracing::warn!(error = %error, error_type = error.error_type(), "chat request failed");
    let body = serde_json::json!({
        "error": {
            "type": error.error_type(),
            "message": error.client_message(),
        }
    });
    (error.status_code(), Json(body)).into_response()
}
