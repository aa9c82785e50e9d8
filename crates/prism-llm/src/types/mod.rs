//! Canonical request, response, and streaming types

mod message;
mod request;
mod response;
mod stream;

pub use message::{FunctionCall, Message, Role, ToolCall};
pub use request::{ChatRequest, CompletionRequest, ResponseStyle};
pub use response::{CompletionResult, EMPTY_RESPONSE_PLACEHOLDER, ProviderResponse, Usage};
pub use stream::{ChatEvent, EventStream, FinishReason, StreamDelta, StreamEvent, ToolCallDelta};
