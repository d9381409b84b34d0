//! Service configuration loaded from the environment (and `.env` via `dotenvy`)

use std::fmt::Display;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result, bail};

use crate::discord::{DISCORD_API_BASE, DiscordClientConfig, RateLimitConfig};
use crate::ingestion::{DEFAULT_MAX_MESSAGES, IngestOptions};

/// Slowest accepted Discord request budget, one call every 100 seconds
const MIN_REQUESTS_PER_SECOND: f64 = 0.01;

/// Runtime configuration for the MediaHub service
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// `MEDIAHUB_BIND_ADDR`
    pub bind_addr: String,
    /// `MEDIAHUB_PORT`
    pub port: u16,
    /// `DISCORD_API_BASE`
    pub discord_api_base: String,
    /// `MEDIAHUB_MAX_MESSAGES`, cap per channel and per thread
    pub max_messages: usize,
    /// `MEDIAHUB_CHANNEL_CONCURRENCY`
    pub channel_concurrency: usize,
    /// `MEDIAHUB_REQUESTS_PER_SECOND`, 0 disables the shared Discord budget
    pub requests_per_second: f64,
    /// `MEDIAHUB_RATE_BURST`
    pub rate_burst: u32,
    /// `MEDIAHUB_REQUEST_TIMEOUT_SECS`, 0 leaves Discord calls without a timeout
    pub request_timeout_secs: u64,
    /// `MEDIAHUB_LOG_LEVEL`, used when `RUST_LOG` is unset
    pub log_level: String,
    /// `MEDIAHUB_LOG_JSON`
    pub log_json: bool,
    /// `MEDIAHUB_ENABLE_CORS`
    pub enable_cors: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0".to_string(),
            port: 3000,
            discord_api_base: DISCORD_API_BASE.to_string(),
            max_messages: DEFAULT_MAX_MESSAGES,
            channel_concurrency: 1,
            requests_per_second: 0.0,
            rate_burst: 5,
            request_timeout_secs: 0,
            log_level: "info".to_string(),
            log_json: false,
            enable_cors: true,
        }
    }
}

impl AppConfig {
    /// Reads the configuration from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, falling back to defaults for
    /// unset or blank variables.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let config = Self {
            bind_addr: get("MEDIAHUB_BIND_ADDR").unwrap_or(defaults.bind_addr),
            port: parse_var(&get, "MEDIAHUB_PORT", defaults.port)?,
            discord_api_base: get("DISCORD_API_BASE").unwrap_or(defaults.discord_api_base),
            max_messages: parse_var(&get, "MEDIAHUB_MAX_MESSAGES", defaults.max_messages)?,
            channel_concurrency: parse_var(
                &get,
                "MEDIAHUB_CHANNEL_CONCURRENCY",
                defaults.channel_concurrency,
            )?,
            requests_per_second: parse_var(
                &get,
                "MEDIAHUB_REQUESTS_PER_SECOND",
                defaults.requests_per_second,
            )?,
            rate_burst: parse_var(&get, "MEDIAHUB_RATE_BURST", defaults.rate_burst)?,
            request_timeout_secs: parse_var(
                &get,
                "MEDIAHUB_REQUEST_TIMEOUT_SECS",
                defaults.request_timeout_secs,
            )?,
            log_level: get("MEDIAHUB_LOG_LEVEL").unwrap_or(defaults.log_level),
            log_json: parse_var(&get, "MEDIAHUB_LOG_JSON", defaults.log_json)?,
            enable_cors: parse_var(&get, "MEDIAHUB_ENABLE_CORS", defaults.enable_cors)?,
        };

        if config.max_messages == 0 {
            bail!("MEDIAHUB_MAX_MESSAGES must be at least 1");
        }
        if config.channel_concurrency == 0 {
            bail!("MEDIAHUB_CHANNEL_CONCURRENCY must be at least 1");
        }
        let rps = config.requests_per_second;
        if !rps.is_finite() || rps < 0.0 || (rps > 0.0 && rps < MIN_REQUESTS_PER_SECOND) {
            bail!(
                "MEDIAHUB_REQUESTS_PER_SECOND must be 0 or at least {MIN_REQUESTS_PER_SECOND}"
            );
        }

        Ok(config)
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let addr = format!("{}:{}", self.bind_addr, self.port);
        addr.parse()
            .with_context(|| format!("Invalid bind address: {addr}"))
    }

    pub fn discord_client_config(&self) -> DiscordClientConfig {
        DiscordClientConfig {
            base_url: self.discord_api_base.clone(),
            timeout: (self.request_timeout_secs > 0)
                .then(|| Duration::from_secs(self.request_timeout_secs)),
            rate_limit: (self.requests_per_second > 0.0).then_some(RateLimitConfig {
                requests_per_second: self.requests_per_second,
                burst_size: self.rate_burst,
            }),
        }
    }

    pub fn ingest_options(&self) -> IngestOptions {
        IngestOptions {
            max_messages: self.max_messages,
            channel_concurrency: self.channel_concurrency,
        }
    }
}

fn parse_var<T>(get: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid value for {key} ({raw:?}): {e}")),
        None => Ok(default),
    }
}
