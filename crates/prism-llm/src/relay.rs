//! Stream relay
//!
//! Drives a provider event stream, forwarding content deltas to the client
//! while accumulating tool-call fragments. When the stream finishes with
//! pending tool calls, the relay executes them and splices in one follow-up
//! stream before emitting the terminal event.

use std::collections::BTreeMap;
use std::sync::Arc;

use futures_util::StreamExt;
use tokio::sync::mpsc;

use prism_tools::ToolRegistry;

use crate::gateway::MAX_TOOL_ROUNDS;
use crate::provider::ChatProvider;
use crate::types::{
    ChatEvent, CompletionRequest, EventStream, FunctionCall, Message, StreamEvent, ToolCall,
    ToolCallDelta, Usage,
};

/// Assembles tool calls from fragments spread across stream frames
#[derive(Default)]
pub(crate) struct ToolCallAccumulator {
    calls: BTreeMap<u32, PartialCall>,
}

#[derive(Default)]
struct PartialCall {
    id: Option<String>,
    name: Option<String>,
    arguments: String,
}

impl ToolCallAccumulator {
    pub(crate) fn absorb(&mut self, fragment: ToolCallDelta) {
        let entry = self.calls.entry(fragment.index).or_default();
        if let Some(id) = fragment.id {
            entry.id = Some(id);
        }
        if let Some(name) = fragment.name {
            entry.name = Some(name);
        }
        if let Some(arguments) = fragment.arguments {
            entry.arguments.push_str(&arguments);
        }
    }

    /// Finished calls in index order; fragments that never received an id
    /// or name are dropped
    pub(crate) fn take(&mut self) -> Vec<ToolCall> {
        std::mem::take(&mut self.calls)
            .into_values()
            .filter_map(|partial| match (partial.id, partial.name) {
                (Some(id), Some(name)) => Some(ToolCall {
                    id,
                    function: FunctionCall { name, arguments: partial.arguments },
                }),
                _ => None,
            })
            .collect()
    }
}

/// Pump a provider stream into the client channel until a terminal event
///
/// A dropped receiver means the client disconnected; the relay stops and
/// the upstream stream is dropped with it.
pub(crate) async fn drive(
    provider: Arc<dyn ChatProvider>,
    tools: Arc<ToolRegistry>,
    mut request: CompletionRequest,
    resolved_model: String,
    mut upstream: EventStream,
    tx: mpsc::Sender<ChatEvent>,
) {
    let mut usage = Usage::default();
    let mut accumulator = ToolCallAccumulator::default();
    let mut rounds = 0;

    loop {
        match upstream.next().await {
            Some(Ok(StreamEvent::Delta(delta))) => {
                if let Some(content) = delta.content {
                    if !content.is_empty()
                        && tx.send(ChatEvent::Content { content }).await.is_err()
                    {
                        return;
                    }
                }
                if let Some(fragment) = delta.tool_call {
                    accumulator.absorb(fragment);
                }
            }
            Some(Ok(StreamEvent::Usage(u))) => usage.accumulate(u),
            Some(Ok(StreamEvent::Done)) | None => {
                let calls = accumulator.take();
                if !calls.is_empty() && rounds < MAX_TOOL_ROUNDS {
                    rounds += 1;
                    request.model = resolved_model.clone();
                    request.messages
                        .push(Message::assistant_tool_calls(String::new(), calls.clone()));
                    for call in &calls {
                        tracing::info!(tool = %call.function.name, "executing streamed tool call");
                        let output =
                            tools.run(&call.function.name, &call.function.arguments).await;
                        request.messages.push(Message::tool_result(&call.id, output));
                    }
                    // Tools are withheld on the final round.
                    request.tools = None;

                    match provider.complete_stream(&request).await {
                        Ok(next) => {
                            upstream = next;
                            continue;
                        }
                        Err(e) => {
                            let _ = tx
                                .send(ChatEvent::Error { error: e.client_message() })
                                .await;
                            return;
                        }
                    }
                }

                let _ = tx.send(ChatEvent::Done { model: resolved_model, usage }).await;
                return;
            }
            Some(Err(e)) => {
                tracing::warn!(error = %e, "stream decode failed");
                let _ = tx.send(ChatEvent::Error { error: e.client_message() }).await;
                return;
            }
        }
    }
}
