//! Error types shared by the ingestion service and the dashboard controller

use thiserror::Error;

/// Failure talking to the Discord REST API.
///
/// The `Display` text is what ends up in `ChannelResult.error`, so the
/// variants render the bare message without any prefix.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiscordError {
    /// Non-2xx response. `message` is the JSON `message` field of the body
    /// when present, otherwise `Discord API error: <status>`.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// Network failure or an undecodable body.
    #[error("{0}")]
    Transport(String),

    /// A 2xx response whose body was not the expected JSON shape.
    #[error("Unexpected Discord API response format")]
    UnexpectedFormat,
}

impl DiscordError {
    /// Builds an [`DiscordError::Api`] from a failed response's status and raw body.
    pub fn from_response(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|json| {
                json.get("message")
                    .and_then(serde_json::Value::as_str)
                    .filter(|m| !m.is_empty())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| format!("Discord API error: {status}"));

        Self::Api { status, message }
    }

}

impl From<reqwest::Error> for DiscordError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

/// Rejections produced while validating an ingestion request. These map to HTTP 400.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Discord Bot Token is required. Please configure it in Settings.")]
    MissingBotToken,

    #[error("At least one channel ID is required. Please configure channel IDs in Settings.")]
    MissingChannelIds,

    #[error("No valid channel IDs provided. Please configure channel IDs in Settings.")]
    NoValidChannelIds,
}

/// Failure invoking the external AI agent.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Agent request failed: {0}")]
    Request(String),

    #[error("Malformed agent response: {0}")]
    Malformed(String),
}

/// Failure reading or writing the settings file.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Settings IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Settings serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A dashboard action that did not complete. Carries the user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct OperationFailed {
    pub message: String,
}

impl OperationFailed {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
