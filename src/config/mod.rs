//! Configuration types for the Copilot chat client.

use crate::errors::{CopilotError, CopilotResult};
use crate::DEFAULT_TIMEOUT_SECS;
use std::time::Duration;
use url::Url;

/// Configuration for the Copilot chat client.
///
/// The base URL is fixed at construction time; the access token is not part
/// of the configuration because it changes over the session lifetime (see
/// [`crate::session::CopilotSession::set_access_token`]).
#[derive(Debug, Clone)]
pub struct CopilotConfig {
    /// Base URL of the Copilot backend (endpoints are relative to this)
    pub base_url: Url,
    /// Request timeout applied to every HTTP call
    pub timeout: Duration,
}

impl CopilotConfig {
    /// Creates a new configuration builder
    pub fn builder() -> CopilotConfigBuilder {
        CopilotConfigBuilder::default()
    }

    /// Creates a configuration from environment variables.
    ///
    /// `COPILOT_BASE_URL` is required; `COPILOT_TIMEOUT` (seconds) is
    /// optional.
    pub fn from_env() -> CopilotResult<Self> {
        let base_url = std::env::var("COPILOT_BASE_URL").map_err(|_| {
            CopilotError::Configuration {
                message: "COPILOT_BASE_URL environment variable not set".to_string(),
            }
        })?;

        let timeout_secs = std::env::var("COPILOT_TIMEOUT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Ok(Self {
            base_url: Url::parse(&base_url)?,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

/// Builder for CopilotConfig
#[derive(Default)]
pub struct CopilotConfigBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
}

impl CopilotConfigBuilder {
    /// Sets the base URL of the Copilot backend
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Sets the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the configuration
    pub fn build(self) -> CopilotResult<CopilotConfig> {
        let base_url = self.base_url.ok_or_else(|| CopilotError::Configuration {
            message: "Base URL is required".to_string(),
        })?;

        Ok(CopilotConfig {
            base_url: Url::parse(&base_url)?,
            timeout: self
                .timeout
                .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder_defaults() {
        let config = CopilotConfig::builder()
            .base_url("https://api.example.com/copilot")
            .build()
            .unwrap();

        assert_eq!(config.base_url.as_str(), "https://api.example.com/copilot");
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }

    #[test]
    fn test_config_builder_custom_timeout() {
        let config = CopilotConfig::builder()
            .base_url("https://api.example.com/copilot")
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap();

        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_config_builder_requires_base_url() {
        let result = CopilotConfig::builder().build();
        assert!(matches!(
            result,
            Err(CopilotError::Configuration { .. })
        ));
    }

    #[test]
    fn test_config_builder_rejects_invalid_url() {
        let result = CopilotConfig::builder().base_url("not a url").build();
        assert!(matches!(
            result,
            Err(CopilotError::Configuration { .. })
        ));
    }
}
