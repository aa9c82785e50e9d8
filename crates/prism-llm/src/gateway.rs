//! Chat gateway
//!
//! Routes normalized requests to the configured provider adapters, runs the
//! bounded tool-execution loop for the completions dialect, and enforces the
//! overall request deadline.

use std::sync::Arc;
use std::time::Duration;

use futures_util::Stream;
use tokio::sync::mpsc;

use prism_config::{Config, ProviderKind};
use prism_tools::{ToolRegistry, WebSearchTool};

use crate::error::GatewayError;
use crate::fallback;
use crate::models;
use crate::normalize::{self, NormalizedRequest};
use crate::provider::{ChatProvider, CompletionsProvider, MessagesProvider};
use crate::relay;
use crate::types::{ChatEvent, ChatRequest, CompletionResult, Message};

/// Extra completions the tool loop may run after the initial one
///
/// One round lets the model act on tool results; tools are withheld on the
/// follow-up so the loop cannot recurse.
pub const MAX_TOOL_ROUNDS: usize = 1;

struct ProviderSlot {
    provider: Arc<dyn ChatProvider>,
    default_model: Option<String>,
}

pub struct ChatGateway {
    completions: Option<ProviderSlot>,
    messages: Option<ProviderSlot>,
    tools: Arc<ToolRegistry>,
    deadline: Duration,
}

impl ChatGateway {
    /// Assemble providers and the tool registry from configuration
    pub fn from_config(config: &Config) -> Self {
        let mut registry = ToolRegistry::new();
        if let Some(search) = &config.search {
            registry.register(Arc::new(WebSearchTool::new(search)));
        }
        let tools = Arc::new(registry);

        let completions = config.provider_of_kind(ProviderKind::Completions).map(|(name, pc)| {
            ProviderSlot {
                provider: Arc::new(CompletionsProvider::new(name, pc)) as Arc<dyn ChatProvider>,
                default_model: pc.default_model.clone(),
            }
        });
        let messages = config.provider_of_kind(ProviderKind::Messages).map(|(name, pc)| {
            ProviderSlot {
                provider: Arc::new(MessagesProvider::new(name, pc, Arc::clone(&tools)))
                    as Arc<dyn ChatProvider>,
                default_model: pc.default_model.clone(),
            }
        });

        Self {
            completions,
            messages,
            tools,
            deadline: Duration::from_secs(config.gateway.deadline_secs),
        }
    }

    fn slot(&self, kind: ProviderKind) -> Result<&ProviderSlot, GatewayError> {
        match kind {
            ProviderKind::Completions => self.completions.as_ref(),
            ProviderKind::Messages => self.messages.as_ref(),
        }
        .ok_or_else(|| {
            GatewayError::Validation(format!("no {} provider is configured", kind.label()))
        })
    }

    /// Attach registered tool schemas when the request opts in
    fn attach_tools(&self, normalized: &mut NormalizedRequest) {
        if normalized.use_web_search
            && !self.tools.is_empty()
            && !models::is_restricted(&normalized.request.model)
        {
            normalized.request.tools = Some(self.tools.specs());
        }
    }

    /// Run a buffered chat request under the configured deadline
    pub async fn chat(&self, chat: ChatRequest) -> Result<CompletionResult, GatewayError> {
        tokio::time::timeout(self.deadline, self.chat_inner(chat))
            .await
            .map_err(|_| GatewayError::DeadlineExceeded)?
    }

    async fn chat_inner(&self, chat: ChatRequest) -> Result<CompletionResult, GatewayError> {
        let kind = chat.provider.unwrap_or(ProviderKind::Completions);
        let slot = self.slot(kind)?;
        let mut normalized = normalize::normalize(chat, kind, slot.default_model.as_deref())?;
        self.attach_tools(&mut normalized);

        let provider = slot.provider.as_ref();
        let mut request = normalized.request;
        let mut response = fallback::complete_with_fallback(provider, &request).await?;
        let mut usage = response.usage;

        // The messages adapter resolves tool use internally; the
        // completions dialect hands calls back for the gateway to run.
        if kind == ProviderKind::Completions {
            let mut rounds = 0;
            while !response.tool_calls.is_empty() && rounds < MAX_TOOL_ROUNDS {
                rounds += 1;
                request.model = response.model.clone();
                request.messages.push(Message::assistant_tool_calls(
                    response.text.clone().unwrap_or_default(),
                    response.tool_calls.clone(),
                ));
                for call in &response.tool_calls {
                    tracing::info!(tool = %call.function.name, "executing tool call");
                    let output =
                        self.tools.run(&call.function.name, &call.function.arguments).await;
                    request.messages.push(Message::tool_result(&call.id, output));
                }
                request.tools = None;

                response = provider.complete(&request).await?;
                usage.accumulate(response.usage);
            }
        }

        let model = response.model.clone();
        Ok(CompletionResult { text: response.text_or_placeholder(), model, usage })
    }

    /// Open a streaming chat, relaying events until a terminal one
    ///
    /// Errors before the first frame are returned directly; once the stream
    /// is open, failures arrive as a terminal [`ChatEvent::Error`].
    pub async fn chat_stream(
        &self,
        chat: ChatRequest,
    ) -> Result<impl Stream<Item = ChatEvent> + Send + use<>, GatewayError> {
        let kind = chat.provider.unwrap_or(ProviderKind::Completions);
        let slot = self.slot(kind)?;
        let mut normalized = normalize::normalize(chat, kind, slot.default_model.as_deref())?;
        self.attach_tools(&mut normalized);

        let provider = Arc::clone(&slot.provider);
        let request = normalized.request;

        if !provider.capabilities().native_streaming {
            tracing::debug!(
                provider = provider.name(),
                "provider has no native streaming, emulating from a buffered completion"
            );
        }

        let started = tokio::time::Instant::now();
        let (resolved_model, upstream) =
            tokio::time::timeout(self.deadline, fallback::stream_with_fallback(
                provider.as_ref(),
                &request,
            ))
            .await
            .map_err(|_| GatewayError::DeadlineExceeded)??;

        // One-frame buffer so a stalled client applies backpressure
        // upstream instead of piling frames up in memory.
        let (tx, rx) = mpsc::channel(1);
        let tools = Arc::clone(&self.tools);
        // One deadline budget spans the stream open and the relay.
        let remaining = self.deadline.saturating_sub(started.elapsed());

        tokio::spawn(async move {
            let driver = relay::drive(provider, tools, request, resolved_model, upstream, tx.clone());
            if tokio::time::timeout(remaining, driver).await.is_err() {
                let _ = tx
                    .send(ChatEvent::Error {
                        error: GatewayError::DeadlineExceeded.client_message(),
                    })
                    .await;
            }
        });

        Ok(futures_util::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|event| (event, rx))
        }))
    }
}
