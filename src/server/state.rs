use std::sync::Arc;

use crate::ingestion::ChannelIngestor;
use crate::traits::DiscordApi;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Ingestion pipeline bound to the Discord client
    pub ingestor: ChannelIngestor<dyn DiscordApi>,

    /// When the process started serving, for `/health`
    pub started_at: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    pub fn new(ingestor: ChannelIngestor<dyn DiscordApi>) -> Self {
        Self {
            ingestor,
            started_at: chrono::Utc::now(),
        }
    }

    /// State backed by any [`DiscordApi`] implementation
    pub fn with_api(api: Arc<dyn DiscordApi>, options: crate::ingestion::IngestOptions) -> Self {
        Self::new(ChannelIngestor::new(api, options))
    }
}
