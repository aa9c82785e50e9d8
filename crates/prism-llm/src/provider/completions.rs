//! Adapter for the completions-style chat API

use std::time::Duration;

use async_trait::async_trait;
use eventsource_stream::Eventsource;
use futures_util::StreamExt;
use http::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use url::Url;

use prism_config::ProviderConfig;

use crate::convert::completions as convert;
use crate::error::GatewayError;
use crate::protocol::completions as wire;
use crate::types::{CompletionRequest, EventStream, ProviderResponse, StreamEvent};

use super::{ChatProvider, ProviderCapabilities};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Terminal sentinel frame on completions-style streams
const STREAM_DONE_MARKER: &str = "[DONE]";

pub struct CompletionsProvider {
    name: String,
    client: reqwest::Client,
    base_url: Url,
    api_key: Option<SecretString>,
}

impl CompletionsProvider {
    /// # Panics
    ///
    /// Panics if the hardcoded default base URL is invalid (should never happen).
    pub fn new(name: impl Into<String>, config: &ProviderConfig) -> Self {
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
        }
    }

    fn endpoint(&self) -> Result<Url, GatewayError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                GatewayError::Internal(anyhow::anyhow!("provider base URL cannot be a base"))
            })?
            .pop_if_empty()
            .extend(["chat", "completions"]);
        Ok(url)
    }

    async fn send(
        &self,
        model: &str,
        body: &wire::CompletionsRequest,
    ) -> Result<reqwest::Response, GatewayError> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| GatewayError::CredentialMissing(self.name.clone()))?;

        let response = self
            .client
            .post(self.endpoint()?)
            .bearer_auth(api_key.expose_secret())
            .json(body)
            .send()
            .await
            .map_err(|e| GatewayError::Provider {
                status: None,
                message: format!("request to '{}' failed: {e}", self.name),
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(classify_error(model, status, &body))
    }
}

/// Map a non-success response to the error taxonomy using the provider's
/// declared error code, never message-text sniffing
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
impl ChatProvider for CompletionsProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities { native_streaming: true, tool_calling: true }
    }

    async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> Result<ProviderResponse, GatewayError> {
        let body = convert::to_wire(request, false);
        let response = self.send(&request.model, &body).await?;

        let parsed: wire::CompletionsResponse =
            response.json().await.map_err(|e| GatewayError::Provider {
                status: None,
                message: format!("malformed completion response: {e}"),
            })?;

        Ok(convert::from_wire(parsed, &request.model))
    }

    async fn complete_stream(
        &self,
        request: &CompletionRequest,
    ) -> Result<EventStream, GatewayError> {
        let body = convert::to_wire(request, true);
        let response = self.send(&request.model, &body).await?;

        let stream = response
            .bytes_stream()
            .eventsource()
            .map(|frame| match frame {
                Ok(frame) if frame.data == STREAM_DONE_MARKER => vec![Ok(StreamEvent::Done)],
                Ok(frame) => match serde_json::from_str::<wire::StreamChunk>(&frame.data) {
                    Ok(chunk) => convert::chunk_to_events(chunk).into_iter().map(Ok).collect(),
                    Err(e) => {
                        vec![Err(GatewayError::Stream(format!("malformed stream frame: {e}")))]
                    }
                },
                Err(e) => vec![Err(GatewayError::Stream(e.to_string()))],
            })
            .flat_map(futures_util::stream::iter);

        Ok(Box::pin(stream))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declared_model_not_found_code_is_retryable() {
        let body = r#"{"error":{"message":"The model 'gone' does not exist","type":"invalid_request_error","code":"model_not_found"}}"#;
        let err = classify_error("gone", StatusCode::NOT_FOUND, body);
        assert!(matches!(err, GatewayError::ModelUnavailable { .. }));
    }

    #[test]
    fn other_errors_are_provider_failures() {
        let body = r#"{"error":{"message":"Rate limit reached","type":"rate_limit_error","code":"rate_limit_exceeded"}}"#;
        let err = classify_error("gpt-4o", StatusCode::TOO_MANY_REQUESTS, body);
        assert!(matches!(err, GatewayError::Provider { status: Some(429), .. }));
    }

    #[test]
    fn unparseable_error_body_falls_back_to_status() {
        let err = classify_error("gpt-4o", StatusCode::BAD_GATEWAY, "<html>oops</html>");
        assert!(matches!(err, GatewayError::Provider { status: Some(502), .. }));
    }

    #[tokio::test]
    async fn missing_key_fails_before_any_request() {
        let config = ProviderConfig {
            kind: prism_config::ProviderKind::Completions,
            api_key: None,
            base_url: None,
            default_model: None,
        };
        let provider = CompletionsProvider::new("openai", &config);
        let request = CompletionRequest {
            model: "gpt-4o".to_owned(),
            messages: vec![crate::types::Message::user("hi")],
            max_tokens: 100,
            temperature: None,
            tools: None,
        };
        let err = provider.complete(&request).await.unwrap_err();
        assert!(matches!(err, GatewayError::CredentialMissing(_)));
    }
}
