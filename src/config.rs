//! Client configuration.
//!
//! Holds the API base URL and the request timeout. Both can be overridden
//! through the environment (`OPEN_MARKET_BASE_URL`,
//! `OPEN_MARKET_TIMEOUT_SECS`), with `.env` files honored when present.

use std::time::Duration;

use anyhow::{Context, Result};

/// Production host serving the open-market endpoints
const DEFAULT_BASE_URL: &str = "https://api.wenivops.co.kr/services/open-market";

/// Request timeout in seconds.
/// 10s allows for slow API responses while failing fast enough for good UX.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl Config {
    /// Build a config from the environment, falling back to defaults.
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (silently ignore if not found)
        let _ = dotenvy::dotenv();

        let mut config = Self::default();
        if let Ok(url) = std::env::var("OPEN_MARKET_BASE_URL") {
            config.base_url = url;
        }
        if let Ok(secs) = std::env::var("OPEN_MARKET_TIMEOUT_SECS") {
            let secs: u64 = secs
                .parse()
                .context("OPEN_MARKET_TIMEOUT_SECS must be a number of seconds")?;
            config.timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }
}
