//! Chat gateway core
//!
//! Normalizes inbound chat requests, routes them to provider adapters for
//! the completions and messages wire dialects, resolves model fallbacks,
//! runs the bounded tool-execution loop, and relays response streams.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

pub mod convert;
pub mod error;
pub mod fallback;
pub mod gateway;
pub mod models;
pub mod normalize;
pub mod protocol;
pub mod provider;
mod relay;
pub mod router;
pub mod types;

pub use error::GatewayError;
pub use gateway::{ChatGateway, MAX_TOOL_ROUNDS};
pub use provider::{ChatProvider, CompletionsProvider, MessagesProvider, ProviderCapabilities};
pub use router::router;
