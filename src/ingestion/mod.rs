//! Discord message ingestion: per-channel fetch, thread fan-out and deduplication

pub mod fetcher;
pub mod outcome;
pub mod plan;
pub mod threads;

use std::collections::HashSet;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tracing::{info, warn};

use crate::models::{BotToken, ChannelResult, IngestResponse, Message};
use crate::traits::DiscordApi;

pub use fetcher::{DEFAULT_MAX_MESSAGES, PAGE_SIZE, fetch_channel_messages};
pub use outcome::{BestEffort, FetchOutcome, IgnoredFailure};
pub use plan::{ChannelTarget, IngestPlan};
pub use threads::{discover_threads, fetch_thread_messages};

/// Tuning for [`ChannelIngestor`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestOptions {
    /// Cap on messages per channel and per thread
    pub max_messages: usize,
    /// Channels processed at once. `1` processes them strictly one after another.
    pub channel_concurrency: usize,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            max_messages: DEFAULT_MAX_MESSAGES,
            channel_concurrency: 1,
        }
    }
}

/// Orchestrates ingestion of channels through a [`DiscordApi`].
pub struct ChannelIngestor<A: ?Sized> {
    api: Arc<A>,
    options: IngestOptions,
}

impl<A> ChannelIngestor<A>
where
    A: DiscordApi + ?Sized,
{
    pub fn new(api: Arc<A>, options: IngestOptions) -> Self {
        Self { api, options }
    }

    pub fn options(&self) -> IngestOptions {
        self.options
    }

    /// Fetches one channel's direct messages and all of its thread messages.
    ///
    /// The union is deduplicated by message id with direct messages first. Only
    /// the direct fetch's error is reported; thread failures are logged and dropped.
    pub async fn ingest_channel(
        &self,
        token: &BotToken,
        channel_id: &str,
        guild_id: Option<&str>,
    ) -> FetchOutcome {
        let api = self.api.as_ref();
        let max = self.options.max_messages;

        let direct = fetch_channel_messages(api, token, channel_id, max).await;
        let threads = fetch_thread_messages(api, token, channel_id, guild_id, max).await;

        for skipped in &threads.ignored {
            warn!(
                "Skipped {} for channel {}: {}",
                skipped.context, channel_id, skipped.error
            );
        }

        FetchOutcome {
            messages: dedupe_messages(direct.messages.into_iter().chain(threads.value)),
            error: direct.error,
        }
    }

    /// Ingests one target and reports it under its label.
    pub async fn ingest_target(
        &self,
        token: &BotToken,
        target: &ChannelTarget,
        guild_id: Option<&str>,
    ) -> ChannelResult {
        let outcome = self
            .ingest_channel(token, &target.channel_id, guild_id)
            .await;

        info!(
            "Channel {} ({}): {} messages{}",
            target.channel_id,
            target.label,
            outcome.messages.len(),
            outcome
                .error
                .as_ref()
                .map(|e| format!(", error: {e}"))
                .unwrap_or_default()
        );

        ChannelResult::new(
            target.channel_id.clone(),
            target.label.clone(),
            outcome.messages,
            outcome.error.map(|e| e.to_string()),
        )
    }

    /// Runs a validated plan and assembles the endpoint response.
    ///
    /// Results come back in request order whatever the concurrency setting.
    pub async fn ingest(&self, plan: &IngestPlan) -> IngestResponse {
        let token = &plan.token;
        let guild_id = plan.guild_id.as_deref();

        // Futures are built up front so no closure is held across the await.
        let pending: Vec<_> = plan
            .targets
            .iter()
            .map(|target| self.ingest_target(token, target, guild_id))
            .collect();

        let channels: Vec<ChannelResult> = stream::iter(pending)
            .buffered(self.options.channel_concurrency.max(1))
            .collect()
            .await;

        IngestResponse::from_channels(channels)
    }
}

impl<A: ?Sized> Clone for ChannelIngestor<A> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            options: self.options,
        }
    }
}

/// Keeps the first message for each id, preserving order.
pub fn dedupe_messages(messages: impl IntoIterator<Item = Message>) -> Vec<Message> {
    let mut seen = HashSet::new();
    messages
        .into_iter()
        .filter(|message| seen.insert(message.id.clone()))
        .collect()
}
