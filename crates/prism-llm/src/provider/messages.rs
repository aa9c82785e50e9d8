//! Adapter for the messages-style chat API
//!
//! Tool use is resolved inside the adapter: when the model requests tools,
//! the adapter executes them and issues exactly one follow-up turn before
//! returning. Streaming is emulated from a buffered completion.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use http::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use url::Url;

use prism_config::ProviderConfig;
use prism_tools::ToolRegistry;

use crate::convert::messages as convert;
use crate::error::GatewayError;
use crate::protocol::messages as wire;
use crate::types::{
    CompletionRequest, EventStream, Message, ProviderResponse, StreamDelta, StreamEvent,
};

use super::{ChatProvider, ProviderCapabilities};

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";
const API_VERSION: &str = "2023-06-01";

pub struct MessagesProvider {
    name: String,
    client: reqwest::Client,
    base_url: Url,
    api_key: Option<SecretString>,
    tools: Arc<ToolRegistry>,
}

impl MessagesProvider {
    /// # Panics
    ///
    /// Panics if the hardcoded default base URL is invalid (should never happen).
    pub fn new(name: impl Into<String>, config: &ProviderConfig, tools: Arc<ToolRegistry>) -> Self {
        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| Url::parse(DEFAULT_BASE_URL).expect("valid default URL"));

        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            name: name.into(),
            client,
            base_url,
            api_key: config.api_key.clone(),
            tools,
        }
    }

    fn endpoint(&self) -> Result<Url, GatewayError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                GatewayError::Internal(anyhow::anyhow!("provider base URL cannot be a base"))
            })?
            .pop_if_empty()
            .extend(["messages"]);
        Ok(url)
    }

    async fn send(
        &self,
        model: &str,
        body: &wire::MessagesRequest,
    ) -> Result<ProviderResponse, GatewayError> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| GatewayError::CredentialMissing(self.name.clone()))?;

        let response = self
            .client
            .post(self.endpoint()?)
            .header("x-api-key", api_key.expose_secret())
            .header("anthropic-version", API_VERSION)
            .json(body)
            .send()
            .await
            .map_err(|e| GatewayError::Provider {
                status: None,
                message: format!("request to '{}' failed: {e}", self.name),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_error(model, status, &body));
        }

        let parsed: wire::MessagesResponse =
            response.json().await.map_err(|e| GatewayError::Provider {
                status: None,
                message: format!("malformed messages response: {e}"),
            })?;

        Ok(convert::from_wire(parsed, model))
    }

    /// Execute requested tools and run the single follow-up turn
    async fn follow_up_with_tools(
        &self,
        request: &CompletionRequest,
        first: ProviderResponse,
    ) -> Result<ProviderResponse, GatewayError> {
        let mut follow = request.clone();
        follow.model = first.model.clone();
        follow.messages.push(Message::assistant_tool_calls(
            first.text.clone().unwrap_or_default(),
            first.tool_calls.clone(),
        ));

        for call in &first.tool_calls {
            tracing::info!(
                provider = %self.name,
                tool = %call.function.name,
                "executing tool requested by model"
            );
            let output = self.tools.run(&call.function.name, &call.function.arguments).await;
            follow.messages.push(Message::tool_result(&call.id, output));
        }

        // Tools are withheld on the follow-up so the loop cannot recurse.
        follow.tools = None;

        let body = convert::to_wire(&follow)?;
        let mut final_response = self.send(&follow.model, &body).await?;
        final_response.usage.accumulate(first.usage);
        Ok(final_response)
    }
}

/// Map a non-success response to the error taxonomy using the provider's
/// declared error type
fn classify_error(model: &str, status: StatusCode, body: &str) -> GatewayError {
    if let Ok(envelope) = serde_json::from_str::<wire::ErrorEnvelope>(body) {
        if envelope.error.is_model_unavailable() {
            return GatewayError::ModelUnavailable {
                model: model.to_owned(),
                message: envelope.error.message,
            };
        }
        return GatewayError::Provider {
            status: Some(status.as_u16()),
            message: envelope.error.message,
        };
    }

    GatewayError::Provider {
        status: Some(status.as_u16()),
        message: format!("upstream returned {status}"),
    }
}

#[async_trait]
impl ChatProvider for MessagesProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities { native_streaming: false, tool_calling: true }
    }

    async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> Result<ProviderResponse, GatewayError> {
        let body = convert::to_wire(request)?;
        let response = self.send(&request.model, &body).await?;

        if response.tool_calls.is_empty() || request.tools.is_none() {
            return Ok(response);
        }

        self.follow_up_with_tools(request, response).await
    }

    /// Emulated: runs the buffered completion and replays it as one
    /// content frame followed by usage and the terminal event
    async fn complete_stream(
        &self,
        request: &CompletionRequest,
    ) -> Result<EventStream, GatewayError> {
        let response = self.complete(request).await?;
        let usage = response.usage;
        let text = response.text_or_placeholder();

        let events = vec![
            Ok(StreamEvent::Delta(StreamDelta { content: Some(text), ..Default::default() })),
            Ok(StreamEvent::Usage(usage)),
            Ok(StreamEvent::Done),
        ];
        Ok(Box::pin(futures_util::stream::iter(events)))
    }
}
