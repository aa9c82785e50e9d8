//! Programmatic configuration builder for integration tests

use std::net::SocketAddr;

use secrecy::SecretString;

use prism_config::{Config, ProviderConfig, ProviderKind, SearchConfig, ServerConfig};

/// Builder for constructing test configurations
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder with minimal defaults
    pub fn new() -> Self {
        Self {
            config: Config {
                server: ServerConfig {
                    listen_address: Some(SocketAddr::from(([127, 0, 0, 1], 0))),
                    ..ServerConfig::default()
                },
                ..Config::default()
            },
        }
    }

    /// Add a completions-style provider pointed at a mock backend
    pub fn with_completions_provider(mut self, base_url: &str) -> Self {
        self.config.providers.insert(
            "mock-completions".to_owned(),
            ProviderConfig {
                kind: ProviderKind::Completions,
                api_key: Some(SecretString::from("test-key")),
                base_url: Some(base_url.parse().expect("valid URL")),
                default_model: None,
            },
        );
        self
    }

    /// Add a messages-style provider pointed at a mock backend
    pub fn with_messages_provider(mut self, base_url: &str) -> Self {
        self.config.providers.insert(
            "mock-messages".to_owned(),
            ProviderConfig {
                kind: ProviderKind::Messages,
                api_key: Some(SecretString::from("test-key")),
                base_url: Some(base_url.parse().expect("valid URL")),
                default_model: None,
            },
        );
        self
    }

    /// Point the web-search tool at a mock search backend
    pub fn with_search(mut self, base_url: &str) -> Self {
        self.config.search = Some(SearchConfig {
            api_key: Some(SecretString::from("test-search-key")),
            base_url: Some(base_url.parse().expect("valid URL")),
            ..SearchConfig::default()
        });
        self
    }

    /// Set the overall request deadline
    pub fn with_deadline_secs(mut self, secs: u64) -> Self {
        self.config.gateway.deadline_secs = secs;
        self
    }

    /// Build the final config
    pub fn build(self) -> Config {
        self.config
    }
}
