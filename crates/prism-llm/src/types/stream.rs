//! Streaming event types
//!
//! [`StreamEvent`] is the adapter-level event decoded from the provider
//! wire; [`ChatEvent`] is what the gateway relays to clients.

use std::pin::Pin;

use futures_util::Stream;
use serde::Serialize;

use crate::error::GatewayError;

use super::response::Usage;

/// A live stream of adapter-level events from a provider
pub type EventStream = Pin<Box<dyn Stream<Item = Result<StreamEvent, GatewayError>> + Send>>;

/// Why the provider stopped generating
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    Stop,
    Length,
    ToolCalls,
}

/// One decoded frame of a provider response stream
#[derive(Debug, Clone)]
pub enum StreamEvent {
    Delta(StreamDelta),
    /// Token accounting, carried on the final frame by most providers
    Usage(Usage),
    /// Graceful end of the stream
    Done,
}

/// Incremental content from one stream frame
#[derive(Debug, Clone, Default)]
pub struct StreamDelta {
    pub content: Option<String>,
    /// Partial tool-call fragment, to be accumulated across frames
    pub tool_call: Option<ToolCallDelta>,
    pub finish_reason: Option<FinishReason>,
}

/// A fragment of a tool call spread across stream frames
///
/// The first fragment for an index carries `id` and `name`; later
/// fragments append to `arguments`.
#[derive(Debug, Clone)]
pub struct ToolCallDelta {
    pub index: u32,
    pub id: Option<String>,
    pub name: Option<String>,
    pub arguments: Option<String>,
}

/// One event relayed to a streaming client
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ChatEvent {
    /// A fragment of assistant text
    Content { content: String },
    /// Terminal event for a successful stream
    Done { model: String, usage: Usage },
    /// Terminal event after a mid-stream failure
    Error { error: String },
}
