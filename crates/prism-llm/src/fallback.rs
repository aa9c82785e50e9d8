//! Model fallback resolution
//!
//! Tries the requested model first, then walks its fallback chain. Only a
//! model-unavailable rejection advances the chain; every other failure
//! aborts immediately so auth problems and provider outages surface intact.

use crate::error::GatewayError;
use crate::models;
use crate::provider::ChatProvider;
use crate::types::{CompletionRequest, EventStream, ProviderResponse};

/// Run a buffered completion, falling back across the model chain
pub async fn complete_with_fallback(
    provider: &dyn ChatProvider,
    request: &CompletionRequest,
) -> Result<ProviderResponse, GatewayError> {
    let candidates = models::candidates(&request.model);
    let mut last_err = None;

    for candidate in &candidates {
        match provider.complete(&for_candidate(request, candidate)).await {
            Ok(response) => return Ok(response),
            Err(err @ GatewayError::ModelUnavailable { .. }) => {
                tracing::warn!(
                    provider = provider.name(),
                    model = %candidate,
                    error = %err,
                    "model unavailable, trying next fallback"
                );
                last_err = Some(err);
            }
            Err(err) => return Err(err),
        }
    }

    Err(last_err.unwrap_or_else(|| {
        GatewayError::Internal(anyhow::anyhow!("fallback chain was empty"))
    }))
}

/// Open a stream, falling back across the model chain
///
/// Returns the model that accepted the request alongside the stream, so the
/// relay can report and reuse the resolved model.
pub async fn stream_with_fallback(
    provider: &dyn ChatProvider,
    request: &CompletionRequest,
) -> Result<(String, EventStream), GatewayError> {
    let candidates = models::candidates(&request.model);
    let mut last_err = None;

    for candidate in &candidates {
        match provider.complete_stream(&for_candidate(request, candidate)).await {
            Ok(stream) => return Ok((candidate.clone(), stream)),
            Err(err @ GatewayError::ModelUnavailable { .. }) => {
                tracing::warn!(
                    provider = provider.name(),
                    model = %candidate,
                    error = %err,
                    "model unavailable, trying next fallback"
                );
                last_err = Some(err);
            }
            Err(err) => return Err(err),
        }
    }

    Err(last_err.unwrap_or_else(|| {
        GatewayError::Internal(anyhow::anyhow!("fallback chain was empty"))
    }))
}

/// Clone the request for a fallback candidate, re-clamping the output
/// budget to that model's ceiling
fn for_candidate(request: &CompletionRequest, model: &str) -> CompletionRequest {
    let mut req = request.clone();
    req.model = model.to_owned();
    req.max_tokens = models::clamp_max_tokens(model, req.max_tokens);
    req
}
