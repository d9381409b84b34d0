//! Thread discovery for a parent channel and aggregation of thread messages

use std::collections::HashSet;

use tracing::debug;

use crate::ingestion::fetcher::fetch_channel_messages;
use crate::ingestion::outcome::BestEffort;
use crate::models::{BotToken, Message};
use crate::traits::{DiscordApi, ThreadSource};

/// Lists the ids of every thread attached to `channel_id`, in discovery order.
///
/// Sources are archived public threads, archived private threads and, when
/// `guild_id` is given, the guild's active threads whose parent is `channel_id`.
/// A failing source is skipped. A thread listed by several sources appears once.
pub async fn discover_threads<A>(
    api: &A,
    token: &BotToken,
    channel_id: &str,
    guild_id: Option<&str>,
) -> BestEffort<Vec<String>>
where
    A: DiscordApi + ?Sized,
{
    let mut listings = vec![
        (ThreadSource::ArchivedPublic, channel_id),
        (ThreadSource::ArchivedPrivate, channel_id),
    ];
    if let Some(guild_id) = guild_id {
        listings.push((ThreadSource::ActiveGuild, guild_id));
    }

    let mut outcome = BestEffort::new(Vec::new());
    let mut seen = HashSet::new();

    for (source, id) in listings {
        let list = match api.thread_listing(token, source, id).await {
            Ok(list) => list,
            Err(error) => {
                outcome.ignore(source.label(), error);
                continue;
            }
        };

        if list.has_more {
            debug!(
                "Only the first page of {} was read for channel {}",
                source.label(),
                channel_id
            );
        }

        let threads = list.threads.into_iter().filter(|thread| {
            source != ThreadSource::ActiveGuild || thread.parent_id.as_deref() == Some(channel_id)
        });

        for thread in threads {
            if seen.insert(thread.id.clone()) {
                outcome.value.push(thread.id);
            }
        }
    }

    debug!(
        "Discovered {} threads for channel {}",
        outcome.value.len(),
        channel_id
    );
    outcome
}

/// Fetches the messages of every thread of `channel_id`, up to `max_messages`
/// per thread. Thread messages are concatenated in discovery order.
pub async fn fetch_thread_messages<A>(
    api: &A,
    token: &BotToken,
    channel_id: &str,
    guild_id: Option<&str>,
    max_messages: usize,
) -> BestEffort<Vec<Message>>
where
    A: DiscordApi + ?Sized,
{
    let discovered = discover_threads(api, token, channel_id, guild_id).await;

    let mut outcome = BestEffort::new(Vec::new());
    outcome.ignored = discovered.ignored;

    for thread_id in discovered.value {
        let fetched = fetch_channel_messages(api, token, &thread_id, max_messages).await;
        if let Some(error) = fetched.error {
            outcome.ignore(format!("thread {thread_id}"), error);
        }
        outcome.value.extend(fetched.messages);
    }

    outcome
}
