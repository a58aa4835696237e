//! Gateway connection settings.

use std::time::Duration;

use anyhow::Context;

/// Per-call timeout applied when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct GatewayConfig {
    pub base_url: String,
    pub access_token: String,
    pub timeout: Duration,
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("base_url", &self.base_url)
            .field("access_token", &"***")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl GatewayConfig {
    pub fn new(base_url: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            access_token: access_token.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Reads `GATEWAY_BASE_URL`, `GATEWAY_ACCESS_TOKEN` and `GATEWAY_TIMEOUT_SECS`.
    pub fn from_env() -> anyhow::Result<Self> {
        let base_url = std::env::var("GATEWAY_BASE_URL").context("GATEWAY_BASE_URL must be set")?;
        let access_token =
            std::env::var("GATEWAY_ACCESS_TOKEN").context("GATEWAY_ACCESS_TOKEN must be set")?;

        let timeout = match std::env::var("GATEWAY_TIMEOUT_SECS") {
            Ok(raw) => Duration::from_secs(
                raw.parse()
                    .with_context(|| format!("GATEWAY_TIMEOUT_SECS is not a number: {raw}"))?,
            ),
            Err(_) => DEFAULT_TIMEOUT,
        };

        Ok(Self::new(base_url, access_token).with_timeout(timeout))
    }
}
