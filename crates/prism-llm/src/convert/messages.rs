//! Conversion between canonical types and the messages wire dialect

use crate::error::GatewayError;
use crate::protocol::messages as wire;
use crate::types::{
    CompletionRequest, FunctionCall, ProviderResponse, Role, ToolCall, Usage,
};

/// Build the wire request for a canonical one
///
/// System messages move to the top-level `system` field. The dialect
/// requires the first remaining message to be user-role.
pub fn to_wire(request: &CompletionRequest) -> Result<wire::MessagesRequest, GatewayError> {
    let mut system_parts = Vec::new();
    let mut messages: Vec<wire::WireMessage> = Vec::new();

    for message in &request.messages {
        match message.role {
            Role::System => system_parts.push(message.content.clone()),
            Role::User => messages.push(wire::WireMessage {
                role: "user",
                content: vec![wire::ContentBlock::Text { text: message.content.clone() }],
            }),
            Role::Assistant => {
                let mut blocks = Vec::new();
                if !message.content.is_empty() {
                    blocks.push(wire::ContentBlock::Text { text: message.content.clone() });
                }
                for call in &message.tool_calls {
                    blocks.push(wire::ContentBlock::ToolUse {
                        id: call.id.clone(),
                        name: call.function.name.clone(),
                        input: parse_arguments(&call.function.arguments),
                    });
                }
                messages.push(wire::WireMessage { role: "assistant", content: blocks });
            }
            Role::Tool => {
                let block = wire::ContentBlock::ToolResult {
                    tool_use_id: message.tool_call_id.clone().unwrap_or_default(),
                    content: message.content.clone(),
                };
                // Consecutive tool results share one user message.
                match messages.last_mut() {
                    Some(last)
                        if last.role == "user"
                            && matches!(
                                last.content.last(),
                                Some(wire::ContentBlock::ToolResult { .. })
                            ) =>
                    {
                        last.content.push(block);
                    }
                    _ => messages.push(wire::WireMessage { role: "user", content: vec![block] }),
                }
            }
        }
    }

    if !matches!(messages.first(), Some(m) if m.role == "user") {
        return Err(GatewayError::Validation(
            "messages-style conversations must start with a user message".to_owned(),
        ));
    }

    let tools = request.tools.as_ref().filter(|t| !t.is_empty()).map(|tools| {
        tools
            .iter()
            .map(|t| wire::WireTool {
                name: t.name.clone(),
                description: t.description.clone(),
                input_schema: t.parameters.clone(),
            })
            .collect()
    });

    Ok(wire::MessagesRequest {
        model: request.model.clone(),
        max_tokens: request.max_tokens,
        system: (!system_parts.is_empty()).then(|| system_parts.join("\n\n")),
        messages,
        temperature: request.temperature,
        tools,
    })
}

/// Normalize a wire response
pub fn from_wire(response: wire::MessagesResponse, requested_model: &str) -> ProviderResponse {
    let model = response
        .model
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| requested_model.to_owned());

    let usage = response
        .usage
        .map(|u| Usage { prompt_tokens: u.input_tokens, completion_tokens: u.output_tokens })
        .unwrap_or_default();

    let mut text = String::new();
    let mut tool_calls = Vec::new();
    for block in response.content {
        match block {
            wire::ContentBlock::Text { text: t } => {
                if !text.is_empty() {
                    text.push('\n');
                }
                text.push_str(&t);
            }
            wire::ContentBlock::ToolUse { id, name, input } => {
                tool_calls.push(ToolCall {
                    id,
                    function: FunctionCall { name, arguments: input.to_string() },
                });
            }
            wire::ContentBlock::ToolResult { .. } => {}
        }
    }

    ProviderResponse {
        model,
        text: (!text.is_empty()).then_some(text),
        tool_calls,
        usage,
    }
}

/// Tool-call arguments are carried as a JSON string; a malformed payload
/// degrades to a string value rather than failing the whole response
fn parse_arguments(arguments: &str) -> serde_json::Value {
    serde_json::from_str(arguments)
        .unwrap_or_else(|_| serde_json::Value::String(arguments.to_owned()))
}
