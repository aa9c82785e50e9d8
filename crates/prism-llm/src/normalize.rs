//! Request normalization
//!
//! Validates the inbound request, fills defaults, clamps the output budget
//! to the model's ceiling, and injects the gateway system preamble.

use prism_config::ProviderKind;

use crate::error::GatewayError;
use crate::models;
use crate::types::{ChatRequest, CompletionRequest, Message, ResponseStyle, Role};

/// Output budget applied when the caller names none
pub const DEFAULT_MAX_TOKENS: u32 = 8000;

/// Sampling temperature for models that accept one
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// A validated request ready for dispatch
#[derive(Debug, Clone)]
pub struct NormalizedRequest {
    pub request: CompletionRequest,
    pub use_web_search: bool,
}

/// Normalize an inbound chat request against the resolved provider
///
/// `default_model` is the provider's configured default, consulted when the
/// request names no model.
pub fn normalize(
    chat: ChatRequest,
    kind: ProviderKind,
    default_model: Option<&str>,
) -> Result<NormalizedRequest, GatewayError> {
    validate(&chat)?;

    let model = chat
        .model
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| {
            default_model
                .unwrap_or_else(|| models::default_model(kind))
                .to_owned()
        });

    let max_tokens =
        models::clamp_max_tokens(&model, chat.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS));

    // Restricted reasoning models reject a temperature outright.
    let temperature = (!models::is_restricted(&model)).then_some(DEFAULT_TEMPERATURE);

    let style = chat.response_style.unwrap_or_default();
    let preamble = system_preamble(&model, kind, style, chat.use_web_search);

    let mut messages = Vec::with_capacity(chat.messages.len() + 1);
    messages.push(Message::system(preamble));
    messages.extend(chat.messages);

    Ok(NormalizedRequest {
        request: CompletionRequest {
            model,
            messages,
            max_tokens,
            temperature,
            tools: None,
        },
        use_web_search: chat.use_web_search,
    })
}

fn validate(chat: &ChatRequest) -> Result<(), GatewayError> {
    if chat.messages.is_empty() {
        return Err(GatewayError::Validation("messages must not be empty".to_owned()));
    }

    if chat.max_tokens == Some(0) {
        return Err(GatewayError::Validation("max_tokens must be positive".to_owned()));
    }

    for message in &chat.messages {
        if message.role == Role::Tool && message.tool_call_id.is_none() {
            return Err(GatewayError::Validation(
                "tool messages must reference a tool_call_id".to_owned(),
            ));
        }
    }

    Ok(())
}

fn system_preamble(
    model: &str,
    kind: ProviderKind,
    style: ResponseStyle,
    use_web_search: bool,
) -> String {
    let today = jiff::Zoned::now().date();
    let mut preamble = format!(
        "You are a helpful assistant answering through the {} provider as model {model}. \
         The current date is {today}. {}",
        kind.label(),
        style.instruction(),
    );
    if use_web_search {
        preamble.push_str(
            " You have access to a web_search tool; use it when the answer depends on \
             current events or information you are unsure about.",
        );
    }
    preamble
}
