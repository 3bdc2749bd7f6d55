use std::time::Duration;

use anyhow::{anyhow, Context, Result};

use crate::llm_client::{Transport, DEFAULT_TIMEOUT_SECS};

/// Application configuration loaded from environment variables.
/// Everything has a default — the Groq credential is NOT configured here;
/// it is supplied per request by the user and only ever held in memory.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Which `CompletionClient` transport to run: `sdk` (typed) or `http`
    /// (raw). The raw transport is the fallback for SDK connection trouble.
    pub llm_transport: Transport,
    /// Bound on every outbound completion call. Terminal on expiry — no
    /// automatic retry.
    pub llm_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let llm_transport = std::env::var("LLM_TRANSPORT")
            .unwrap_or_else(|_| "sdk".to_string())
            .parse::<Transport>()
            .map_err(|e| anyhow!(e))
            .context("LLM_TRANSPORT must be 'sdk' or 'http'")?;

        let llm_timeout_secs = std::env::var("LLM_TIMEOUT_SECS")
            .unwrap_or_else(|_| DEFAULT_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .context("LLM_TIMEOUT_SECS must be a number of seconds")?;

        Ok(Config {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            llm_transport,
            llm_timeout: Duration::from_secs(llm_timeout_secs),
        })
    }
}

#[cfg(test)]
impl Default for Config {
    fn default() -> Self {
        Config {
            port: 0,
            rust_log: "info".to_string(),
            llm_transport: Transport::Sdk,
            llm_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}
