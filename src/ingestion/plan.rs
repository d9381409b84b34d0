//! Validation of ingestion requests

use crate::error::ValidationError;
use crate::models::{BotToken, IngestRequest};

/// A channel to ingest and the label it is reported under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelTarget {
    pub channel_id: String,
    pub label: String,
}

/// A validated ingestion request
#[derive(Debug, Clone)]
pub struct IngestPlan {
    pub token: BotToken,
    pub targets: Vec<ChannelTarget>,
    pub guild_id: Option<String>,
}

impl IngestPlan {
    /// Validates `request` and resolves channel labels.
    ///
    /// Blank channel ids are dropped and the rest trimmed. The i-th remaining id
    /// takes `channel_labels[i]`, or `channel-<i>` when that label is missing or empty.
    pub fn from_request(request: &IngestRequest) -> Result<Self, ValidationError> {
        let token = BotToken::new(request.bot_token.clone().unwrap_or_default());
        if token.is_empty() {
            return Err(ValidationError::MissingBotToken);
        }

        let channel_ids = match request.channel_ids.as_deref() {
            Some(ids) if !ids.is_empty() => ids,
            _ => return Err(ValidationError::MissingChannelIds),
        };

        let labels = request.channel_labels.as_deref().unwrap_or_default();
        let targets: Vec<ChannelTarget> = channel_ids
            .iter()
            .map(|id| id.trim())
            .filter(|id| !id.is_empty())
            .enumerate()
            .map(|(i, id)| ChannelTarget {
                channel_id: id.to_string(),
                label: labels
                    .get(i)
                    .filter(|label| !label.is_empty())
                    .cloned()
                    .unwrap_or_else(|| format!("channel-{i}")),
            })
            .collect();

        if targets.is_empty() {
            return Err(ValidationError::NoValidChannelIds);
        }

        let guild_id = request
            .server_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string);

        Ok(Self {
            token,
            targets,
            guild_id,
        })
    }
}
