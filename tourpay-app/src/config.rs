//! Configuration loading from environment.

use std::env;

use tourpay_gateway::GatewayConfig;

/// Application configuration.
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub gateway: GatewayConfig,
    /// Shared secret for gateway notification signatures.
    pub webhook_secret: Option<String>,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()?;

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let gateway = GatewayConfig::from_env()?;

        let webhook_secret = env::var("GATEWAY_WEBHOOK_SECRET")
            .ok()
            .filter(|s| !s.trim().is_empty());

        Ok(Self {
            port,
            database_url,
            gateway,
            webhook_secret,
        })
    }
}
