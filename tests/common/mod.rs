#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;

use mediahub::dashboard::AgentReply;
use mediahub::error::{AgentError, DiscordError};
use mediahub::models::{BotToken, RawAuthor, RawMessage, ThreadChannel, ThreadList};
use mediahub::traits::{DiscordApi, MediaAgent, PageRequest, ThreadSource};

pub fn raw_message(id: u64, username: &str) -> RawMessage {
    RawMessage {
        id: id.to_string(),
        content: Some(format!("message {id}")),
        author: Some(RawAuthor {
            id: Some("42".into()),
            username: Some(username.into()),
        }),
        timestamp: Some(format!("2024-03-01T12:00:{:02}+00:00", id % 60)),
    }
}

/// `count` messages with descending ids starting at `newest`, as Discord serves them
pub fn history(newest: u64, count: u64) -> Vec<RawMessage> {
    (0..count).map(|i| raw_message(newest - i, "FilmFan42")).collect()
}

pub fn thread(id: &str, parent_id: &str) -> ThreadChannel {
    ThreadChannel {
        id: id.into(),
        parent_id: Some(parent_id.into()),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Messages {
        channel_id: String,
        limit: usize,
        before: Option<String>,
    },
    Threads {
        source: ThreadSource,
        id: String,
    },
}

/// In-memory Discord serving scripted channel histories and thread listings
#[derive(Default)]
pub struct FakeDiscord {
    histories: HashMap<String, Vec<RawMessage>>,
    channel_errors: HashMap<String, DiscordError>,
    /// Fails the n-th page (1-based) of a channel
    page_errors: HashMap<String, (usize, DiscordError)>,
    listings: HashMap<(ThreadSource, String), Result<Vec<ThreadChannel>, DiscordError>>,
    panic_on: Option<String>,
    calls: Mutex<Vec<Call>>,
}

impl FakeDiscord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_history(mut self, channel_id: &str, messages: Vec<RawMessage>) -> Self {
        self.histories.insert(channel_id.into(), messages);
        self
    }

    pub fn with_channel_error(mut self, channel_id: &str, error: DiscordError) -> Self {
        self.channel_errors.insert(channel_id.into(), error);
        self
    }

    pub fn with_page_error(mut self, channel_id: &str, page: usize, error: DiscordError) -> Self {
        self.page_errors.insert(channel_id.into(), (page, error));
        self
    }

    pub fn with_panic(mut self, channel_id: &str) -> Self {
        self.panic_on = Some(channel_id.into());
        self
    }

    pub fn with_threads(
        mut self,
        source: ThreadSource,
        id: &str,
        threads: Vec<ThreadChannel>,
    ) -> Self {
        self.listings.insert((source, id.into()), Ok(threads));
        self
    }

    pub fn with_listing_error(
        mut self,
        source: ThreadSource,
        id: &str,
        error: DiscordError,
    ) -> Self {
        self.listings.insert((source, id.into()), Err(error));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn message_calls(&self, channel_id: &str) -> Vec<PageRequest> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Messages {
                    channel_id: id,
                    limit,
                    before,
                } if id == channel_id => Some(PageRequest { limit, before }),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl DiscordApi for FakeDiscord {
    async fn channel_messages(
        &self,
        _token: &BotToken,
        channel_id: &str,
        page: PageRequest,
    ) -> Result<Vec<RawMessage>, DiscordError> {
        let page_num = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(Call::Messages {
                channel_id: channel_id.into(),
                limit: page.limit,
                before: page.before.clone(),
            });
            calls
                .iter()
                .filter(|c| matches!(c, Call::Messages { channel_id: id, .. } if id == channel_id))
                .count()
        };

        if self.panic_on.as_deref() == Some(channel_id) {
            panic!("discord client exploded");
        }
        if let Some(error) = self.channel_errors.get(channel_id) {
            return Err(error.clone());
        }
        if let Some((n, error)) = self.page_errors.get(channel_id)
            && *n == page_num
        {
            return Err(error.clone());
        }

        let history = self.histories.get(channel_id).cloned().unwrap_or_default();
        let start = match &page.before {
            Some(before) => history
                .iter()
                .position(|m| &m.id == before)
                .map(|i| i + 1)
                .unwrap_or(history.len()),
            None => 0,
        };

        Ok(history.into_iter().skip(start).take(page.limit).collect())
    }

    async fn thread_listing(
        &self,
        _token: &BotToken,
        source: ThreadSource,
        id: &str,
    ) -> Result<ThreadList, DiscordError> {
        self.calls.lock().unwrap().push(Call::Threads {
            source,
            id: id.into(),
        });

        match self.listings.get(&(source, id.to_string())) {
            Some(Ok(threads)) => Ok(ThreadList {
                threads: threads.clone(),
                has_more: false,
            }),
            Some(Err(error)) => Err(error.clone()),
            None => Ok(ThreadList::default()),
        }
    }
}

/// Agent returning queued replies and recording prompts
#[derive(Default)]
pub struct FakeAgent {
    replies: Mutex<VecDeque<Result<AgentReply, AgentError>>>,
    prompts: Mutex<Vec<(String, String)>>,
}

impl FakeAgent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, reply: serde_json::Value) -> Self {
        let reply = serde_json::from_value(reply).unwrap();
        self.replies.lock().unwrap().push_back(Ok(reply));
        self
    }

    pub fn fail(self, error: AgentError) -> Self {
        self.replies.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn prompts(&self) -> Vec<(String, String)> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaAgent for FakeAgent {
    async fn invoke(&self, message: &str, agent_id: &str) -> Result<AgentReply, AgentError> {
        self.prompts
            .lock()
            .unwrap()
            .push((message.to_string(), agent_id.to_string()));

        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AgentError::Request("no scripted reply".into())))
    }
}
