//! # Discord REST Client
//!
//! This module provides read-only access to the Discord REST API (v10) for the
//! ingestion service. It implements [`DiscordApi`] on top of a shared
//! `reqwest::Client`, one call per page or thread listing.
//!
//! ## Endpoints
//!
//! - `GET /channels/{id}/messages?limit=&before=`: one page of messages, newest first
//! - `GET /channels/{id}/threads/archived/public`: archived public threads
//! - `GET /channels/{id}/threads/archived/private`: archived private threads
//! - `GET /guilds/{id}/threads/active`: every active thread in the guild
//!
//! Every request carries `Authorization: Bot <token>`. The token is supplied per
//! call, so one client serves every caller of the endpoint.
//!
//! ## Error Mapping
//!
//! - **Non-2xx**: the JSON `message` field of the body, or `Discord API error: <status>`
//! - **Network / decode failures**: the `reqwest` error text
//! - **Wrong body shape**: `Unexpected Discord API response format`
//!
//! ## Rate Limits
//!
//! Discord enforces per-route and global limits. When a [`RateLimitConfig`] is
//! set, every call first takes a token from a bucket shared by all clones of the
//! client. There is no retry on `429`; the response is reported like any other
//! failed call.

pub mod rate_limit;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::AUTHORIZATION;
use serde_json::Value;
use tracing::debug;

use crate::error::DiscordError;
use crate::models::{BotToken, RawMessage, ThreadList};
use crate::traits::{DiscordApi, PageRequest, ThreadSource};

pub use rate_limit::{RateLimitConfig, TokenBucket};

/// Default Discord REST API base URL
pub const DISCORD_API_BASE: &str = "https://discord.com/api/v10";

/// Connection settings for [`DiscordClient`]
#[derive(Debug, Clone)]
pub struct DiscordClientConfig {
    /// API base URL without trailing slash
    pub base_url: String,
    /// Per-request timeout; `None` keeps the HTTP client's default behavior
    pub timeout: Option<Duration>,
    /// Shared request budget; `None` disables pacing
    pub rate_limit: Option<RateLimitConfig>,
}

impl Default for DiscordClientConfig {
    fn default() -> Self {
        Self {
            base_url: DISCORD_API_BASE.to_string(),
            timeout: None,
            rate_limit: None,
        }
    }
}

/// Discord REST client used by the ingestion pipeline.
///
/// ## Fields
///
/// - `client`: Reusable HTTP client with connection pooling
/// - `base_url`: API root, overridable for self-hosted proxies
/// - `limiter`: Optional token bucket shared across clones
///
/// ## Thread Safety
///
/// This struct is `Clone` and can be shared across async tasks. Clones share the
/// connection pool and the rate-limit budget.
pub struct DiscordClient {
    client: Client,
    base_url: String,
    limiter: Option<Arc<TokenBucket>>,
}

impl DiscordClient {
    /// Creates a new Discord client.
    ///
    /// The `User-Agent` follows Discord's `DiscordBot (url, version)` convention.
    ///
    /// ## Errors
    ///
    /// Fails only if the underlying HTTP client cannot be built (e.g. the TLS
    /// backend fails to initialize).
    pub fn new(config: &DiscordClientConfig) -> Result<Self> {
        let mut builder = Client::builder().user_agent(format!(
            "DiscordBot (mediahub, {})",
            env!("CARGO_PKG_VERSION")
        ));

        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder.build()?;
        let limiter = config
            .rate_limit
            .map(|limit| Arc::new(TokenBucket::new(limit)));

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            limiter,
        })
    }

    /// Performs an authenticated GET and returns the decoded JSON body.
    ///
    /// Non-2xx responses are turned into [`DiscordError::Api`] using the body's
    /// `message` field when it parses.
    async fn get_json(
        &self,
        token: &BotToken,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Value, DiscordError> {
        if let Some(limiter) = &self.limiter {
            limiter.acquire().await;
        }

        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .get(&url)
            .header(AUTHORIZATION, token.authorization())
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!("Discord GET {} failed with {}", path, status);
            return Err(DiscordError::from_response(status.as_u16(), &body));
        }

        Ok(response.json::<Value>().await?)
    }
}

#[async_trait]
impl DiscordApi for DiscordClient {
    async fn channel_messages(
        &self,
        token: &BotToken,
        channel_id: &str,
        page: PageRequest,
    ) -> Result<Vec<RawMessage>, DiscordError> {
        let mut query = vec![("limit", page.limit.to_string())];
        if let Some(before) = page.before {
            query.push(("before", before));
        }

        let body = self
            .get_json(token, &self.messages_path(channel_id), &query)
            .await?;

        if !body.is_array() {
            return Err(DiscordError::UnexpectedFormat);
        }

        serde_json::from_value(body).map_err(|e| DiscordError::Transport(e.to_string()))
    }

    async fn thread_listing(
        &self,
        token: &BotToken,
        source: ThreadSource,
        id: &str,
    ) -> Result<ThreadList, DiscordError> {
        let body = self.get_json(token, &source.path(id), &[]).await?;
        serde_json::from_value(body).map_err(|e| DiscordError::Transport(e.to_string()))
    }
}

impl Clone for DiscordClient {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            limiter: self.limiter.clone(),
        }
    }
}
