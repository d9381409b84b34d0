//! AI-agent reply payloads, prompt construction and transcript rendering

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{IngestResponse, MediaRequest, MediaType, RequestPatch};

/// Envelope returned by the agent capability
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentReply {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub response: Option<AgentResponse>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentResponse {
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub message: Option<String>,
}

impl AgentReply {
    /// Structured result of a successful call
    pub fn payload(&self) -> Option<AgentPayload<'_>> {
        if !self.success {
            return None;
        }
        self.response
            .as_ref()?
            .result
            .as_ref()
            .filter(|result| !result.is_null())
            .map(AgentPayload)
    }

    /// Failure text: `error`, then `response.message`
    pub fn failure_message(&self) -> Option<&str> {
        self.error.as_deref().or_else(|| {
            self.response
                .as_ref()
                .and_then(|response| response.message.as_deref())
        })
    }
}

/// View over the agent's `result` object
#[derive(Debug, Clone, Copy)]
pub struct AgentPayload<'a>(&'a Value);

impl AgentPayload<'_> {
    fn request_values(&self) -> &[Value] {
        self.0
            .get("requests")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Length of the raw `requests` array, parseable or not
    pub fn request_count(&self) -> usize {
        self.request_values().len()
    }

    /// Entries of `requests` that parse as media requests
    pub fn requests(&self) -> Vec<MediaRequest> {
        self.request_values()
            .iter()
            .filter_map(|value| serde_json::from_value(value.clone()).ok())
            .collect()
    }

    /// Entries of `requests` as partial updates
    pub fn patches(&self) -> Vec<RequestPatch> {
        self.request_values()
            .iter()
            .filter_map(|value| serde_json::from_value(value.clone()).ok())
            .collect()
    }

    pub fn summary(&self) -> Option<&str> {
        self.0.get("summary").and_then(Value::as_str)
    }

    pub fn movies_count(&self) -> u64 {
        self.0.get("movies_count").and_then(Value::as_u64).unwrap_or(0)
    }

    pub fn tv_shows_count(&self) -> u64 {
        self.0.get("tv_shows_count").and_then(Value::as_u64).unwrap_or(0)
    }
}

/// Instruction asking the agent to extract requests from raw channel text
pub fn sync_prompt(discord_content: &str) -> String {
    format!(
        "Sync media requests from Discord. Parse the following raw Discord thread channel content. \
         Extract every single media request post: each title, IMDb link, requester username, and channel. \
         Classify each as movie or tv_show and route movies to Radarr and TV shows to Sonarr. \
         Do NOT return 0 results if there are posts below.\n\n\
         --- BEGIN DISCORD CHANNEL CONTENT ---\n{discord_content}\n--- END DISCORD CHANNEL CONTENT ---"
    )
}

/// Instruction asking the agent to route a new request and announce it on Discord
pub fn submit_prompt(title: &str, imdb_link: &str, media_type: MediaType) -> String {
    format!(
        "Submit a new media request: Title: \"{title}\", IMDb Link: \"{imdb_link}\", Type: \"{}\". \
         Route this to {} and create a formatted Discord post for the {} thread channel.",
        media_type.as_str(),
        media_type.service().as_str(),
        media_type.discord_channel(),
    )
}

/// Instruction asking the agent for a request's current status
pub fn resync_prompt(request: &MediaRequest) -> String {
    format!(
        "Check the current status of the media request: \"{}\" (IMDb: {}). It was sent to {}. \
         Return its updated status.",
        request.title,
        request.imdb_id,
        request.service.as_str()
    )
}

/// Renders an ingestion response as plain text for [`sync_prompt`].
///
/// One header line per channel, then one line per message with its author.
/// Empty messages are skipped.
pub fn discord_transcript(response: &IngestResponse) -> String {
    let mut out = String::new();

    for channel in &response.channels {
        out.push_str(&format!(
            "# {} ({})\n",
            channel.channel_label, channel.channel_id
        ));

        for message in channel.messages.iter().filter(|m| !m.content.trim().is_empty()) {
            out.push_str(&format!(
                "[{}] {}: {}\n",
                message.timestamp, message.author.username, message.content
            ));
        }
        out.push('\n');
    }

    out.trim_end().to_string()
}
