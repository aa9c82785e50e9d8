//! Conversion between canonical types and the completions wire dialect

use crate::models;
use crate::protocol::completions as wire;
use crate::types::{
    CompletionRequest, FinishReason, FunctionCall, ProviderResponse, StreamDelta, StreamEvent,
    Role, ToolCall, ToolCallDelta, Usage,
};

fn role_name(role: Role) -> String {
    match role {
        Role::System => "system",
        Role::User => "user",
        Role::Assistant => "assistant",
        Role::Tool => "tool",
    }
    .to_owned()
}

/// Build the wire request for a canonical one
///
/// Restricted reasoning models take `max_completion_tokens` and reject
/// temperature and tools, so those are withheld for them.
pub fn to_wire(request: &CompletionRequest, streaming: bool) -> wire::CompletionsRequest {
    let restricted = models::is_restricted(&request.model);

    let messages = request
        .messages
        .iter()
        .map(|m| wire::WireMessage {
            role: role_name(m.role),
            content: (!m.content.is_empty() || m.tool_calls.is_empty())
                .then(|| m.content.clone()),
            tool_calls: (!m.tool_calls.is_empty()).then(|| {
                m.tool_calls
                    .iter()
                    .map(|c| wire::WireToolCall {
                        id: c.id.clone(),
                        kind: "function".to_owned(),
                        function: wire::WireFunctionCall {
                            name: c.function.name.clone(),
                            arguments: c.function.arguments.clone(),
                        },
                    })
                    .collect()
            }),
            tool_call_id: m.tool_call_id.clone(),
        })
        .collect();

    let tools = (!restricted)
        .then(|| request.tools.as_ref())
        .flatten()
        .filter(|t| !t.is_empty())
        .map(|tools| {
            tools
                .iter()
                .map(|t| wire::WireTool {
                    kind: "function",
                    function: wire::WireToolFunction {
                        name: t.name.clone(),
                        description: t.description.clone(),
                        parameters: t.parameters.clone(),
                    },
                })
                .collect::<Vec<_>>()
        });
    let tool_choice = tools.is_some().then_some("auto");

    wire::CompletionsRequest {
        model: request.model.clone(),
        messages,
        temperature: if restricted { None } else { request.temperature },
        max_tokens: (!restricted).then_some(request.max_tokens),
        max_completion_tokens: restricted.then_some(request.max_tokens),
        tools,
        tool_choice,
        stream: streaming.then_some(true),
        stream_options: streaming.then_some(wire::StreamOptions { include_usage: true }),
    }
}

/// Normalize a buffered wire response
pub fn from_wire(
    response: wire::CompletionsResponse,
    requested_model: &str,
) -> ProviderResponse {
    let model = response
        .model
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| requested_model.to_owned());

    let usage = response.usage.map(usage_from_wire).unwrap_or_default();

    let (text, tool_calls) = match response.choices.into_iter().next() {
        Some(choice) => {
            let calls = choice
                .message
                .tool_calls
                .unwrap_or_default()
                .into_iter()
                .map(|c| ToolCall {
                    id: c.id,
                    function: FunctionCall {
                        name: c.function.name,
                        arguments: c.function.arguments,
                    },
                })
                .collect();
            (choice.message.content, calls)
        }
        None => (None, Vec::new()),
    };

    ProviderResponse { model, text, tool_calls, usage }
}

/// Decode one stream chunk into adapter events
pub fn chunk_to_events(chunk: wire::StreamChunk) -> Vec<StreamEvent> {
    let mut events = Vec::new();

    for choice in chunk.choices {
        let finish_reason = choice.finish_reason.as_deref().and_then(parse_finish_reason);
        let fragments = choice.delta.tool_calls.unwrap_or_default();

        if fragments.is_empty() {
            if choice.delta.content.is_some() || finish_reason.is_some() {
                events.push(StreamEvent::Delta(StreamDelta {
                    content: choice.delta.content,
                    tool_call: None,
                    finish_reason,
                }));
            }
            continue;
        }

        // Content and the finish reason ride on the first fragment's delta.
        let mut content = choice.delta.content;
        let mut finish = finish_reason;
        for fragment in fragments {
            events.push(StreamEvent::Delta(StreamDelta {
                content: content.take(),
                tool_call: Some(ToolCallDelta {
                    index: fragment.index,
                    id: fragment.id,
                    name: fragment.function.as_ref().and_then(|f| f.name.clone()),
                    arguments: fragment.function.and_then(|f| f.arguments),
                }),
                finish_reason: finish.take(),
            }));
        }
    }

    if let Some(usage) = chunk.usage {
        events.push(StreamEvent::Usage(usage_from_wire(usage)));
    }

    events
}

pub fn usage_from_wire(usage: wire::WireUsage) -> Usage {
    Usage {
        prompt_tokens: usage.prompt_tokens,
        completion_tokens: usage.completion_tokens,
    }
}

fn parse_finish_reason(reason: &str) -> Option<FinishReason> {
    match reason {
        "stop" => Some(FinishReason::Stop),
        "length" => Some(FinishReason::Length),
        "tool_calls" => Some(FinishReason::ToolCalls),
        _ => None,
    }
}
