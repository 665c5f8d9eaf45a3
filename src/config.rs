use std::env;

use url::Url;

use crate::constants::{
    DEFAULT_API_BASE_URL, DEFAULT_GRID_SIZE, DEFAULT_REQUEST_TIMEOUT_SECS, MATCH_POLL_INTERVAL_MS,
};

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Match/auth API base URL, e.g. `https://fleet.example.com`.
    pub base_url: String,
    pub request_timeout_secs: u64,
    /// Re-fetch cadence while a match is reported IN_PROGRESS.
    pub poll_interval_ms: u64,
    pub grid_size: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            poll_interval_ms: MATCH_POLL_INTERVAL_MS,
            grid_size: DEFAULT_GRID_SIZE,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            base_url: env::var("ARMADA_API_URL")
                .unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string()),
            request_timeout_secs: env::var("ARMADA_REQUEST_TIMEOUT_SECS")
                .unwrap_or_else(|_| DEFAULT_REQUEST_TIMEOUT_SECS.to_string())
                .parse()?,
            poll_interval_ms: env::var("ARMADA_POLL_INTERVAL_MS")
                .unwrap_or_else(|_| MATCH_POLL_INTERVAL_MS.to_string())
                .parse()?,
            grid_size: env::var("ARMADA_GRID_SIZE")
                .unwrap_or_else(|_| DEFAULT_GRID_SIZE.to_string())
                .parse()?,
        })
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.base_url.trim().is_empty() {
            anyhow::bail!("ARMADA_API_URL is empty");
        }
        if Url::parse(&self.base_url).is_err() {
            anyhow::bail!("ARMADA_API_URL is not a valid URL: {}", self.base_url);
        }
        if self.grid_size == 0 {
            anyhow::bail!("ARMADA_GRID_SIZE must be > 0");
        }

        if self.poll_interval_ms < 500 {
            tracing::warn!(
                interval_ms = self.poll_interval_ms,
                "Aggressive poll interval; the match server may rate limit"
            );
        }
        if self.request_timeout_secs == 0 {
            tracing::warn!("Request timeout of 0 disables nothing; using it as-is");
        }

        Ok(())
    }
}
