//! Traits for the Discord REST and AI-agent seams

use async_trait::async_trait;

use crate::dashboard::agent::AgentReply;
use crate::error::{AgentError, DiscordError};
use crate::models::{BotToken, RawMessage, ThreadList};

/// One page request against `GET /channels/{id}/messages`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// Number of messages to ask for (Discord caps this at 100)
    pub limit: usize,
    /// Return messages older than this message id
    pub before: Option<String>,
}

/// Where a thread listing comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThreadSource {
    /// `GET /channels/{id}/threads/archived/public`
    ArchivedPublic,
    /// `GET /channels/{id}/threads/archived/private`
    ArchivedPrivate,
    /// `GET /guilds/{id}/threads/active`, keyed by guild rather than channel
    ActiveGuild,
}

impl ThreadSource {
    /// Path of the listing endpoint for `id`, relative to the API base
    pub fn path(self, id: &str) -> String {
        let id = urlencoding::encode(id);
        match self {
            Self::ArchivedPublic => format!("/channels/{id}/threads/archived/public"),
            Self::ArchivedPrivate => format!("/channels/{id}/threads/archived/private"),
            Self::ActiveGuild => format!("/guilds/{id}/threads/active"),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::ArchivedPublic => "archived public threads",
            Self::ArchivedPrivate => "archived private threads",
            Self::ActiveGuild => "active guild threads",
        }
    }
}

/// Read-only access to the Discord REST API
#[async_trait]
pub trait DiscordApi: Send + Sync {
    /// Fetch one page of messages, newest first
    ///
    /// # Returns
    /// * `Result<Vec<RawMessage>, DiscordError>` - The page, or the failure for this call
    async fn channel_messages(
        &self,
        token: &BotToken,
        channel_id: &str,
        page: PageRequest,
    ) -> Result<Vec<RawMessage>, DiscordError>;

    /// Fetch one thread listing
    ///
    /// # Arguments
    /// * `source` - Which listing endpoint to call
    /// * `id` - Channel id, or guild id for [`ThreadSource::ActiveGuild`]
    async fn thread_listing(
        &self,
        token: &BotToken,
        source: ThreadSource,
        id: &str,
    ) -> Result<ThreadList, DiscordError>;

    /// Path of the messages endpoint for `channel_id`, relative to the API base
    fn messages_path(&self, channel_id: &str) -> String {
        format!("/channels/{}/messages", urlencoding::encode(channel_id))
    }
}

/// External AI agent that turns natural-language instructions into structured results
#[async_trait]
pub trait MediaAgent: Send + Sync {
    /// Send `message` to the agent identified by `agent_id`
    async fn invoke(&self, message: &str, agent_id: &str) -> Result<AgentReply, AgentError>;
}
