//! Gateway error taxonomy
//!
//! Every variant maps to a stable HTTP status and machine-readable error
//! type, so callers can branch on classification instead of message text.

use http::StatusCode;
use thiserror::Error;

/// Errors surfaced by the chat gateway
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The inbound request is structurally invalid
    #[error("invalid request: {0}")]
    Validation(String),

    /// The selected provider has no API key configured
    #[error("no API key configured for provider '{0}'")]
    CredentialMissing(String),

    /// The provider rejected the requested model; the next fallback
    /// candidate may be tried
    #[error("model '{model}' is unavailable: {message}")]
    ModelUnavailable { model: String, message: String },

    /// The provider returned a non-retryable failure
    #[error("provider request failed: {message}")]
    Provider { status: Option<u16>, message: String },

    /// Decoding or transport failure on a response stream
    #[error("stream failed: {0}")]
    Stream(String),

    /// The overall request deadline elapsed
    #[error("request deadline exceeded")]
    DeadlineExceeded,

    /// An unexpected internal failure
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl GatewayError {
    /// HTTP status this error maps to
    ///
    /// A missing credential is a deployment fault, not a client one, so it
    /// maps to 500 rather than 401. An exhausted fallback chain is an
    /// upstream failure and maps to 502 like any other provider error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::CredentialMissing(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ModelUnavailable { .. } | Self::Provider { .. } | Self::Stream(_) => {
                StatusCode::BAD_GATEWAY
            }
            Self::DeadlineExceeded => StatusCode::GATEWAY_TIMEOUT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable error classification
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::CredentialMissing(_) => "credential_missing",
            Self::ModelUnavailable { .. } => "model_unavailable",
            Self::Provider { .. } => "provider_error",
            Self::Stream(_) => "stream_error",
            Self::DeadlineExceeded => "deadline_exceeded",
            Self::Internal(_) => "internal_error",
        }
    }

    /// Message safe to return to the client
    ///
    /// Internal failures are masked; everything else already describes a
    /// client-visible condition.
    pub fn client_message(&self) -> String {
        match self {
            Self::Internal(_) => "internal server error".to_owned(),
            other => other.to_string(),
        }
    }
}
