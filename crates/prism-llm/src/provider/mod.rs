//! Provider adapters
//!
//! Each adapter translates the canonical [`CompletionRequest`] into one
//! upstream wire dialect and normalizes the response back.

use async_trait::async_trait;

use crate::error::GatewayError;
use crate::types::{CompletionRequest, EventStream, ProviderResponse};

mod completions;
mod messages;

pub use completions::CompletionsProvider;
pub use messages::MessagesProvider;

/// What an adapter can do natively
#[derive(Debug, Clone, Copy)]
pub struct ProviderCapabilities {
    /// Whether `complete_stream` is backed by a real provider stream or
    /// emulated from a buffered completion
    pub native_streaming: bool,
    /// Whether the provider accepts tool schemas on requests
    pub tool_calling: bool,
}

/// A chat completion backend
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Configured provider name, used in logs and errors
    fn name(&self) -> &str;

    fn capabilities(&self) -> ProviderCapabilities;

    /// Run one buffered completion
    async fn complete(&self, request: &CompletionRequest) -> Result<ProviderResponse, GatewayError>;

    /// Open a response stream for the request
    async fn complete_stream(&self, request: &CompletionRequest)
    -> Result<EventStream, GatewayError>;
}
