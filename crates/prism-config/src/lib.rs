#![allow(clippy::must_use_candidate)]

mod env;
pub mod gateway;
mod loader;
pub mod provider;
pub mod search;
pub mod server;

use serde::Deserialize;

pub use gateway::GatewayConfig;
pub use provider::{ProviderConfig, ProviderKind};
pub use search::SearchConfig;
pub use server::{HealthConfig, ServerConfig};

/// Top-level Prism configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Chat provider configurations keyed by name
    #[serde(default)]
    pub providers: indexmap::IndexMap<String, ProviderConfig>,
    /// Web search tool configuration
    #[serde(default)]
    pub search: Option<SearchConfig>,
    /// Gateway-wide request handling options
    #[serde(default)]
    pub gateway: GatewayConfig,
}

impl Config {
    /// Find the configured provider of the given kind, if any
    pub fn provider_of_kind(&self, kind: ProviderKind) -> Option<(&str, &ProviderConfig)> {
        self.providers
            .iter()
            .find(|(_, p)| p.kind == kind)
            .map(|(name, p)| (name.as_str(), p))
    }
}
