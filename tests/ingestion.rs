mod common;

use std::collections::HashSet;
use std::sync::Arc;

use common::{Call, FakeDiscord, history, raw_message, thread};
use mediahub::error::DiscordError;
use mediahub::ingestion::{
    ChannelIngestor, IngestOptions, IngestPlan, discover_threads, fetch_channel_messages,
};
use mediahub::models::{BotToken, IngestRequest};
use mediahub::traits::ThreadSource;

fn token() -> BotToken {
    BotToken::new("test-token")
}

fn forbidden() -> DiscordError {
    DiscordError::from_response(403, r#"{"message": "Missing Access", "code": 50001}"#)
}

fn plan(ids: &[&str], labels: &[&str], server_id: Option<&str>) -> IngestPlan {
    IngestPlan::from_request(&IngestRequest {
        bot_token: Some("test-token".into()),
        channel_ids: Some(ids.iter().map(|s| s.to_string()).collect()),
        channel_labels: Some(labels.iter().map(|s| s.to_string()).collect()),
        server_id: server_id.map(str::to_string),
    })
    .unwrap()
}

fn ingestor(
    api: FakeDiscord,
    options: IngestOptions,
) -> (Arc<FakeDiscord>, ChannelIngestor<FakeDiscord>) {
    let api = Arc::new(api);
    (Arc::clone(&api), ChannelIngestor::new(api, options))
}

#[tokio::test]
async fn pagination_stops_at_cap() {
    let api = FakeDiscord::new().with_history("100", history(10_000, 750));

    let outcome = fetch_channel_messages(&api, &token(), "100", 500).await;

    assert!(outcome.error.is_none());
    assert_eq!(outcome.messages.len(), 500);
    assert_eq!(outcome.messages[0].id, "10000");
    assert_eq!(outcome.messages[499].id, "9501");

    let pages = api.message_calls("100");
    assert_eq!(pages.len(), 5);
    assert!(pages.iter().all(|p| p.limit == 100));
    assert_eq!(pages[0].before, None);
    assert_eq!(pages[1].before.as_deref(), Some("9901"));
}

#[tokio::test]
async fn pagination_stops_on_short_page() {
    let api = FakeDiscord::new().with_history("100", history(1_000, 230));

    let outcome = fetch_channel_messages(&api, &token(), "100", 500).await;

    assert_eq!(outcome.messages.len(), 230);
    assert_eq!(api.message_calls("100").len(), 3);
}

#[tokio::test]
async fn small_cap_limits_page_size() {
    let api = FakeDiscord::new().with_history("100", history(1_000, 300));

    let outcome = fetch_channel_messages(&api, &token(), "100", 150).await;

    assert_eq!(outcome.messages.len(), 150);
    let limits: Vec<_> = api.message_calls("100").iter().map(|p| p.limit).collect();
    assert_eq!(limits, [100, 50]);
}

#[tokio::test]
async fn failed_page_keeps_earlier_messages() {
    let api = FakeDiscord::new()
        .with_history("100", history(1_000, 300))
        .with_page_error("100", 2, DiscordError::Transport("connection reset".into()));

    let outcome = fetch_channel_messages(&api, &token(), "100", 500).await;

    assert!(outcome.is_partial());
    assert_eq!(outcome.messages.len(), 100);
    assert_eq!(outcome.error.unwrap().to_string(), "connection reset");
}

#[tokio::test]
async fn thread_discovery_order_and_dedupe() {
    let api = FakeDiscord::new()
        .with_threads(
            ThreadSource::ArchivedPublic,
            "100",
            vec![thread("t1", "100"), thread("t2", "100")],
        )
        .with_threads(
            ThreadSource::ArchivedPrivate,
            "100",
            vec![thread("t2", "100"), thread("t3", "100")],
        )
        .with_threads(
            ThreadSource::ActiveGuild,
            "900",
            vec![thread("t4", "100"), thread("other", "555"), thread("t1", "100")],
        );

    let discovered = discover_threads(&api, &token(), "100", Some("900")).await;

    assert!(discovered.is_clean());
    assert_eq!(discovered.value, ["t1", "t2", "t3", "t4"]);
}

#[tokio::test]
async fn active_threads_need_a_guild() {
    let api = FakeDiscord::new()
        .with_threads(ThreadSource::ActiveGuild, "900", vec![thread("t4", "100")]);

    let discovered = discover_threads(&api, &token(), "100", None).await;

    assert!(discovered.value.is_empty());
    assert!(!api
        .calls()
        .iter()
        .any(|c| matches!(c, Call::Threads { source: ThreadSource::ActiveGuild, .. })));
}

#[tokio::test]
async fn failing_listing_is_skipped() {
    let api = FakeDiscord::new()
        .with_listing_error(ThreadSource::ArchivedPublic, "100", forbidden())
        .with_threads(ThreadSource::ArchivedPrivate, "100", vec![thread("t3", "100")]);

    let discovered = discover_threads(&api, &token(), "100", None).await;

    assert_eq!(discovered.value, ["t3"]);
    assert_eq!(discovered.ignored.len(), 1);
    assert_eq!(discovered.ignored[0].error.to_string(), "Missing Access");
}

#[tokio::test]
async fn thread_messages_follow_direct_messages() {
    let mut thread_history = history(500, 2);
    // Thread starter messages share their id with a parent channel message
    thread_history.push(raw_message(1_000, "FilmFan42"));

    let api = FakeDiscord::new()
        .with_history("100", history(1_000, 3))
        .with_history("t1", thread_history)
        .with_threads(ThreadSource::ArchivedPublic, "100", vec![thread("t1", "100")]);
    let (_, ingestor) = ingestor(api, IngestOptions::default());

    let outcome = ingestor.ingest_channel(&token(), "100", None).await;

    let ids: Vec<_> = outcome.messages.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, ["1000", "999", "998", "500", "499"]);
    assert_eq!(outcome.messages[3].channel_id, "t1");

    let unique: HashSet<_> = ids.iter().collect();
    assert_eq!(unique.len(), ids.len());
}

#[tokio::test]
async fn forbidden_channel_reports_discord_message() {
    let api = FakeDiscord::new().with_channel_error("100", forbidden());
    let (_, ingestor) = ingestor(api, IngestOptions::default());

    let response = ingestor.ingest(&plan(&["100"], &["movies"], None)).await;

    assert!(!response.success);
    assert_eq!(response.total_messages, 0);
    assert_eq!(response.channels[0].messages.len(), 0);
    assert_eq!(response.channels[0].error.as_deref(), Some("Missing Access"));
    assert_eq!(response.error.as_deref(), Some("Missing Access"));
}

#[tokio::test]
async fn forbidden_channel_without_json_body() {
    let api = FakeDiscord::new()
        .with_channel_error("100", DiscordError::from_response(403, "<html>Forbidden</html>"));
    let (_, ingestor) = ingestor(api, IngestOptions::default());

    let response = ingestor.ingest(&plan(&["100"], &[], None)).await;

    assert_eq!(
        response.channels[0].error.as_deref(),
        Some("Discord API error: 403")
    );
    assert_eq!(response.channels[0].channel_label, "channel-0");
}

#[tokio::test]
async fn thread_failures_do_not_surface() {
    let api = FakeDiscord::new()
        .with_history("100", history(1_000, 3))
        .with_listing_error(ThreadSource::ArchivedPublic, "100", forbidden())
        .with_listing_error(ThreadSource::ArchivedPrivate, "100", forbidden())
        .with_listing_error(ThreadSource::ActiveGuild, "900", forbidden());
    let (_, ingestor) = ingestor(api, IngestOptions::default());

    let response = ingestor.ingest(&plan(&["100"], &["movies"], Some("900"))).await;

    assert!(response.success);
    assert_eq!(response.total_messages, 3);
    assert!(response.channels[0].error.is_none());
    assert!(response.error.is_none());
}

#[tokio::test]
async fn failing_thread_fetch_is_not_reported() {
    let api = FakeDiscord::new()
        .with_history("100", history(1_000, 2))
        .with_channel_error("t1", forbidden())
        .with_history("t2", history(500, 1))
        .with_threads(
            ThreadSource::ArchivedPublic,
            "100",
            vec![thread("t1", "100"), thread("t2", "100")],
        );
    let (_, ingestor) = ingestor(api, IngestOptions::default());

    let response = ingestor.ingest(&plan(&["100"], &["movies"], None)).await;

    assert!(response.success);
    assert_eq!(response.total_messages, 3);
    assert!(response.channels[0].error.is_none());
    assert!(response.error.is_none());
}

#[tokio::test]
async fn partial_failure_keeps_success() {
    let api = FakeDiscord::new()
        .with_history("100", history(1_000, 2))
        .with_channel_error("200", forbidden());
    let (_, ingestor) = ingestor(api, IngestOptions::default());

    let response = ingestor
        .ingest(&plan(&["100", "200"], &["movies", "tv-shows"], None))
        .await;

    assert!(response.success);
    assert_eq!(response.total_messages, 2);
    assert!(response.error.is_none());
    assert_eq!(response.channels[1].error.as_deref(), Some("Missing Access"));
    assert_eq!(response.channels[1].channel_label, "tv-shows");
}

#[tokio::test]
async fn errors_are_joined_when_nothing_was_collected() {
    let api = FakeDiscord::new()
        .with_channel_error("100", forbidden())
        .with_channel_error("200", DiscordError::Transport("timed out".into()));
    let (_, ingestor) = ingestor(api, IngestOptions::default());

    let response = ingestor.ingest(&plan(&["100", "200"], &[], None)).await;

    assert!(!response.success);
    assert_eq!(response.error.as_deref(), Some("Missing Access; timed out"));
}

#[tokio::test]
async fn repeated_runs_are_identical() {
    let build = || {
        FakeDiscord::new()
            .with_history("100", history(1_000, 120))
            .with_history("t1", history(400, 5))
            .with_threads(ThreadSource::ArchivedPrivate, "100", vec![thread("t1", "100")])
    };
    let plan = plan(&["100"], &["movies"], None);

    let (_, first) = ingestor(build(), IngestOptions::default());
    let (_, second) = ingestor(build(), IngestOptions::default());

    assert_eq!(first.ingest(&plan).await, second.ingest(&plan).await);
}

#[tokio::test]
async fn concurrent_channels_keep_request_order() {
    let api = FakeDiscord::new()
        .with_history("100", history(1_000, 3))
        .with_history("200", history(2_000, 1))
        .with_history("300", history(3_000, 2));
    let options = IngestOptions {
        channel_concurrency: 3,
        ..IngestOptions::default()
    };
    let (_, ingestor) = ingestor(api, options);

    let response = ingestor
        .ingest(&plan(&["300", "100", "200"], &["a", "b", "c"], None))
        .await;

    let order: Vec<_> = response
        .channels
        .iter()
        .map(|c| (c.channel_id.as_str(), c.message_count))
        .collect();
    assert_eq!(order, [("300", 2), ("100", 3), ("200", 1)]);
    assert_eq!(response.total_messages, 6);
}

#[tokio::test]
async fn sequential_ingestion_visits_channels_in_order() {
    let api = FakeDiscord::new()
        .with_history("100", history(1_000, 1))
        .with_history("200", history(2_000, 1));
    let (api, ingestor) = ingestor(api, IngestOptions::default());

    ingestor.ingest(&plan(&["100", "200"], &[], None)).await;

    let channels: Vec<_> = api
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            Call::Messages { channel_id, .. } => Some(channel_id),
            _ => None,
        })
        .collect();
    assert_eq!(channels, ["100", "200"]);
}
