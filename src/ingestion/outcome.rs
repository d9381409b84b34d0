//! Result shapes for fetches that tolerate failure

use crate::error::DiscordError;
use crate::models::Message;

/// Messages collected from one channel or thread, plus the error that stopped
/// the fetch early, if any. Messages fetched before the error are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchOutcome {
    pub messages: Vec<Message>,
    pub error: Option<DiscordError>,
}

impl FetchOutcome {
    pub fn complete(messages: Vec<Message>) -> Self {
        Self {
            messages,
            error: None,
        }
    }

    pub fn interrupted(messages: Vec<Message>, error: DiscordError) -> Self {
        Self {
            messages,
            error: Some(error),
        }
    }

    pub fn is_partial(&self) -> bool {
        self.error.is_some() && !self.messages.is_empty()
    }
}

/// A secondary failure that was skipped rather than reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnoredFailure {
    /// What was being fetched, e.g. `archived public threads` or `thread 123`
    pub context: String,
    pub error: DiscordError,
}

/// Best-effort augmentation: a value plus the failures skipped while building it.
///
/// The ignored failures never change `value`; they exist so callers can log them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BestEffort<T> {
    pub value: T,
    pub ignored: Vec<IgnoredFailure>,
}

impl<T> BestEffort<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            ignored: Vec::new(),
        }
    }

    pub fn ignore(&mut self, context: impl Into<String>, error: DiscordError) {
        self.ignored.push(IgnoredFailure {
            context: context.into(),
            error,
        });
    }

    pub fn is_clean(&self) -> bool {
        self.ignored.is_empty()
    }
}
