//! Data models for Discord ingestion payloads and raw Discord API responses

mod media;

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub use media::{MediaRequest, MediaType, RequestPatch, Service};

/// Discord bot credential. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct BotToken(String);

impl BotToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Value for the `Authorization` header.
    pub fn authorization(&self) -> String {
        format!("Bot {}", self.0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for BotToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BotToken(***)")
    }
}

/// Author of a Discord message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub username: String,
    pub id: String,
}

/// A Discord message as returned by the ingestion endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub content: String,
    pub author: Author,
    pub timestamp: String,
    pub channel_id: String,
}

impl Message {
    /// Normalizes a raw API message. `channel_id` is the channel or thread it was read from.
    pub fn from_raw(raw: RawMessage, channel_id: &str) -> Self {
        let (username, author_id) = match raw.author {
            Some(author) => (author.username, author.id),
            None => (None, None),
        };

        Self {
            id: raw.id,
            content: raw.content.unwrap_or_default(),
            author: Author {
                username: username
                    .filter(|name| !name.is_empty())
                    .unwrap_or_else(|| "Unknown".to_string()),
                id: author_id.unwrap_or_default(),
            },
            timestamp: raw.timestamp.unwrap_or_default(),
            channel_id: channel_id.to_string(),
        }
    }
}

/// Per-channel slice of an ingestion response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelResult {
    pub channel_id: String,
    pub channel_label: String,
    pub messages: Vec<Message>,
    pub message_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ChannelResult {
    pub fn new(
        channel_id: impl Into<String>,
        channel_label: impl Into<String>,
        messages: Vec<Message>,
        error: Option<String>,
    ) -> Self {
        Self {
            channel_id: channel_id.into(),
            channel_label: channel_label.into(),
            message_count: messages.len(),
            messages,
            error,
        }
    }
}

/// Body of `POST /api/discord`.
///
/// Fields are read leniently: a value of the wrong JSON type is treated as
/// absent so that validation, not deserialization, decides the response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestRequest {
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub bot_token: Option<String>,

    #[serde(
        default,
        deserialize_with = "lenient_string_list",
        skip_serializing_if = "Option::is_none"
    )]
    pub channel_ids: Option<Vec<String>>,

    #[serde(
        default,
        deserialize_with = "lenient_string_list",
        skip_serializing_if = "Option::is_none"
    )]
    pub channel_labels: Option<Vec<String>>,

    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub server_id: Option<String>,
}

/// Successful (HTTP 200) response of the ingestion endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestResponse {
    pub success: bool,
    #[serde(default)]
    pub total_messages: usize,
    pub channels: Vec<ChannelResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl IngestResponse {
    /// Computes the top-level `success` and `error` fields from per-channel results.
    ///
    /// `success` holds when any message was collected or no channel failed.
    /// `error` is only set when channels failed and nothing was collected.
    pub fn from_channels(channels: Vec<ChannelResult>) -> Self {
        let total_messages: usize = channels.iter().map(|c| c.message_count).sum();
        let has_errors = channels.iter().any(|c| c.error.is_some());

        let error = (has_errors && total_messages == 0).then(|| {
            channels
                .iter()
                .filter_map(|c| c.error.as_deref())
                .filter(|e| !e.is_empty())
                .collect::<Vec<_>>()
                .join("; ")
        });

        Self {
            success: total_messages > 0 || !has_errors,
            total_messages,
            channels,
            error,
        }
    }
}

/// Message object from `GET /channels/{id}/messages`
#[derive(Debug, Clone, Deserialize)]
pub struct RawMessage {
    pub id: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub author: Option<RawAuthor>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawAuthor {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

/// Thread listing returned by the archived and active thread endpoints
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ThreadList {
    #[serde(default)]
    pub threads: Vec<ThreadChannel>,
    #[serde(default)]
    pub has_more: bool,
}

/// Thread channel object (only the fields we read)
#[derive(Debug, Clone, Deserialize)]
pub struct ThreadChannel {
    pub id: String,
    #[serde(default)]
    pub parent_id: Option<String>,
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

fn lenient_string_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => Some(
            items
                .into_iter()
                .map(|item| match item {
                    Value::String(s) => s,
                    _ => String::new(),
                })
                .collect(),
        ),
        _ => None,
    })
}
