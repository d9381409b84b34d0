//! Cursor-paginated message fetch for a single channel or thread

use tracing::debug;

use crate::ingestion::outcome::FetchOutcome;
use crate::models::{BotToken, Message};
use crate::traits::{DiscordApi, PageRequest};

/// Largest page Discord serves for the messages endpoint
pub const PAGE_SIZE: usize = 100;

/// Default cap on messages collected per channel or thread
pub const DEFAULT_MAX_MESSAGES: usize = 500;

/// Fetches up to `max_messages` messages from `channel_id`, newest first.
///
/// Pages are requested with `before=<oldest id seen>` until the cap is reached,
/// a page comes back short, or a call fails. A failure keeps whatever was
/// collected before it.
pub async fn fetch_channel_messages<A>(
    api: &A,
    token: &BotToken,
    channel_id: &str,
    max_messages: usize,
) -> FetchOutcome
where
    A: DiscordApi + ?Sized,
{
    let mut messages: Vec<Message> = Vec::new();
    let mut before: Option<String> = None;
    let mut page_num = 1;

    while messages.len() < max_messages {
        let limit = PAGE_SIZE.min(max_messages - messages.len());
        let page = PageRequest {
            limit,
            before: before.clone(),
        };

        let raw = match api.channel_messages(token, channel_id, page).await {
            Ok(raw) => raw,
            Err(error) => {
                debug!(
                    "Page {} of channel {} failed after {} messages: {}",
                    page_num,
                    channel_id,
                    messages.len(),
                    error
                );
                return FetchOutcome::interrupted(messages, error);
            }
        };

        let received = raw.len();
        debug!(
            "Fetched page {} of channel {} ({} messages)",
            page_num, channel_id, received
        );

        if let Some(oldest) = raw.last() {
            before = Some(oldest.id.clone());
        }
        messages.extend(raw.into_iter().map(|m| Message::from_raw(m, channel_id)));

        if received < limit {
            break;
        }
        page_num += 1;
    }

    messages.truncate(max_messages);
    FetchOutcome::complete(messages)
}
