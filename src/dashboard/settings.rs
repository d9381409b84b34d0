//! Dashboard settings persisted verbatim as a JSON file

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::SettingsError;
use crate::models::IngestRequest;

/// Connection settings for Discord, Radarr and Sonarr
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub discord_server_id: String,
    pub discord_movies_channel: String,
    pub discord_tv_channel: String,
    pub discord_bot_token: String,
    pub radarr_url: String,
    pub radarr_api_key: String,
    pub radarr_quality: String,
    pub sonarr_url: String,
    pub sonarr_api_key: String,
    pub sonarr_quality: String,
    pub auto_sync: bool,
    pub sync_interval: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            discord_server_id: String::new(),
            discord_movies_channel: String::new(),
            discord_tv_channel: String::new(),
            discord_bot_token: String::new(),
            radarr_url: String::new(),
            radarr_api_key: String::new(),
            radarr_quality: "HD-1080p".to_string(),
            sonarr_url: String::new(),
            sonarr_api_key: String::new(),
            sonarr_quality: "HD-1080p".to_string(),
            auto_sync: false,
            sync_interval: "30".to_string(),
        }
    }
}

impl Settings {
    /// Ingestion request for the configured movie and TV channels.
    ///
    /// Unset channels are left out so each label stays with its channel.
    pub fn ingest_request(&self) -> IngestRequest {
        let (channel_ids, channel_labels): (Vec<String>, Vec<String>) = [
            (&self.discord_movies_channel, "movies"),
            (&self.discord_tv_channel, "tv-shows"),
        ]
        .into_iter()
        .filter(|(id, _)| !id.trim().is_empty())
        .map(|(id, label)| (id.clone(), label.to_string()))
        .unzip();

        IngestRequest {
            bot_token: Some(self.discord_bot_token.clone()),
            channel_ids: Some(channel_ids),
            channel_labels: Some(channel_labels),
            server_id: Some(self.discord_server_id.clone()).filter(|id| !id.trim().is_empty()),
        }
    }
}

/// File-backed store for [`Settings`]
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored keys overlaid on the defaults.
    ///
    /// A missing, unreadable or malformed file yields the defaults. Stored keys
    /// whose values have the wrong type are ignored individually.
    pub fn load(&self) -> Settings {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) => {
                debug!("No settings at {}: {}", self.path.display(), e);
                return Settings::default();
            }
        };

        let stored = match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(map)) => map,
            Ok(_) | Err(_) => {
                warn!("Ignoring malformed settings file {}", self.path.display());
                return Settings::default();
            }
        };

        let mut merged = match serde_json::to_value(Settings::default()) {
            Ok(Value::Object(map)) => map,
            _ => return Settings::default(),
        };

        for (key, value) in stored {
            let Some(default) = merged.get(&key) else {
                continue;
            };
            if std::mem::discriminant(default) == std::mem::discriminant(&value) {
                merged.insert(key, value);
            }
        }

        serde_json::from_value(Value::Object(merged)).unwrap_or_default()
    }

    /// Writes `settings` as JSON, creating parent directories as needed.
    pub fn save(&self, settings: &Settings) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(settings)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}
