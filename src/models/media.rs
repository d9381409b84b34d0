//! Media request records produced by the AI agent

use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaType {
    Movie,
    TvShow,
    #[default]
    #[serde(other)]
    Other,
}

impl MediaType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Movie => "movie",
            Self::TvShow => "tv_show",
            Self::Other => "other",
        }
    }

    /// Download manager a request of this type is routed to
    pub fn service(self) -> Service {
        match self {
            Self::Movie => Service::Radarr,
            _ => Service::Sonarr,
        }
    }

    /// Discord thread channel new requests of this type are posted in
    pub fn discord_channel(self) -> &'static str {
        match self {
            Self::Movie => "movies",
            _ => "tv-shows",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Service {
    Radarr,
    Sonarr,
    #[default]
    #[serde(other)]
    Other,
}

impl Service {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Radarr => "Radarr",
            Self::Sonarr => "Sonarr",
            Self::Other => "Other",
        }
    }
}

/// A tracked movie or TV show request. `imdb_id` is the merge key.
///
/// Missing and `null` fields both take their default value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaRequest {
    #[serde(deserialize_with = "null_default")]
    pub title: String,
    #[serde(deserialize_with = "null_default")]
    pub imdb_id: String,
    #[serde(deserialize_with = "null_default")]
    pub imdb_link: String,
    #[serde(deserialize_with = "null_default")]
    pub media_type: MediaType,
    #[serde(deserialize_with = "null_default")]
    pub service: Service,
    #[serde(deserialize_with = "null_default")]
    pub status: String,
    #[serde(deserialize_with = "null_default")]
    pub requester: String,
    #[serde(deserialize_with = "null_default")]
    pub channel: String,
    #[serde(deserialize_with = "null_default")]
    pub discord_post_status: String,
}

fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl MediaRequest {
    /// Overlays every field present in `patch`
    pub fn apply(&mut self, patch: &RequestPatch) {
        macro_rules! overlay {
            ($($field:ident),*) => {
                $(if let Some(value) = &patch.$field {
                    self.$field = value.clone();
                })*
            };
        }

        overlay!(
            title,
            imdb_link,
            media_type,
            service,
            status,
            requester,
            channel,
            discord_post_status
        );
    }
}

/// Partial update for a [`MediaRequest`], as returned by a resync.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestPatch {
    pub title: Option<String>,
    pub imdb_id: Option<String>,
    pub imdb_link: Option<String>,
    pub media_type: Option<MediaType>,
    pub service: Option<Service>,
    pub status: Option<String>,
    pub requester: Option<String>,
    pub channel: Option<String>,
    pub discord_post_status: Option<String>,
}
