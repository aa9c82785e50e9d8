use serde::Deserialize;

/// Gateway-wide request handling options
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Overall deadline for one gateway invocation in seconds
    ///
    /// Covers every model round-trip plus any tool round within a single
    /// `/chat` or `/chat/stream` call.
    #[serde(default = "default_deadline_secs")]
    pub deadline_secs: u64,
}

const fn default_deadline_secs() -> u64 {
    120
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            deadline_secs: default_deadline_secs(),
        }
    }
}
