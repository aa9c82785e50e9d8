use std::path::Path;

use crate::{Config, ProviderKind};

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Reads the file, expands `{{ env.VAR }}` placeholders, then
    /// deserializes and validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, environment variable
    /// expansion fails, TOML parsing fails, or validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        let expanded =
            crate::env::expand_env(&raw).map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        let config: Self = toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate that the configuration is internally consistent
    ///
    /// # Errors
    ///
    /// Returns an error if no provider is configured or two providers claim
    /// the same wire protocol
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.providers.is_empty() {
            anyhow::bail!("at least one chat provider must be configured");
        }

        for kind in [ProviderKind::Completions, ProviderKind::Messages] {
            let count = self.providers.values().filter(|p| p.kind == kind).count();
            if count > 1 {
                anyhow::bail!("at most one provider of type '{}' may be configured", kind.label());
            }
        }

        if self.gateway.deadline_secs == 0 {
            anyhow::bail!("gateway.deadline_secs must be greater than 0");
        }

        Ok(())
    }
}
