//! Dashboard controller for media requests
//!
//! [`Dashboard`] owns the request board and the outcome of the last sync. Every
//! change goes through its methods, which consult the [`MediaAgent`] for request
//! extraction, routing and status checks.

pub mod agent;
pub mod board;
pub mod settings;

use std::sync::Arc;

use tracing::{info, warn};

use crate::error::OperationFailed;
use crate::models::{MediaRequest, MediaType};
use crate::traits::MediaAgent;

pub use agent::{AgentPayload, AgentReply, AgentResponse, discord_transcript};
pub use board::{BoardStats, RequestBoard, RequestFilter, SortDirection, SortField};
pub use settings::{Settings, SettingsStore};

const SYNC_FAILED: &str = "Failed to sync from Discord.";
const SYNC_UNEXPECTED: &str = "An unexpected error occurred during sync.";
const SUBMIT_OK: &str = "Request submitted successfully.";
const SUBMIT_FAILED: &str = "Failed to submit request.";
const SUBMIT_UNEXPECTED: &str = "An unexpected error occurred.";

/// Result of a successful [`Dashboard::sync`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    /// Requests newly added to the board
    pub added: usize,
    pub summary: String,
}

/// Owning controller over the request board
pub struct Dashboard<A: ?Sized> {
    agent: Arc<A>,
    agent_id: String,
    board: RequestBoard,
    last_sync_summary: Option<String>,
    last_sync_error: Option<String>,
}

impl<A> Dashboard<A>
where
    A: MediaAgent + ?Sized,
{
    pub fn new(agent: Arc<A>, agent_id: impl Into<String>) -> Self {
        Self {
            agent,
            agent_id: agent_id.into(),
            board: RequestBoard::new(),
            last_sync_summary: None,
            last_sync_error: None,
        }
    }

    /// Starts from an existing board, e.g. one restored by the caller.
    pub fn with_board(mut self, board: RequestBoard) -> Self {
        self.board = board;
        self
    }

    pub fn board(&self) -> &RequestBoard {
        &self.board
    }

    pub fn requests(&self) -> &[MediaRequest] {
        self.board.requests()
    }

    pub fn query(&self, filter: &RequestFilter) -> Vec<&MediaRequest> {
        self.board.query(filter)
    }

    pub fn stats(&self) -> BoardStats {
        self.board.stats()
    }

    pub fn last_sync_summary(&self) -> Option<&str> {
        self.last_sync_summary.as_deref()
    }

    pub fn last_sync_error(&self) -> Option<&str> {
        self.last_sync_error.as_deref()
    }

    /// Asks the agent to extract requests from raw Discord text and merges the
    /// ones not yet on the board.
    ///
    /// The outcome is also kept as the last sync summary or error.
    pub async fn sync(&mut self, discord_content: &str) -> Result<SyncReport, OperationFailed> {
        self.last_sync_summary = None;
        self.last_sync_error = None;

        let prompt = agent::sync_prompt(discord_content);
        let reply = match self.agent.invoke(&prompt, &self.agent_id).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Sync agent call failed: {}", e);
                self.last_sync_error = Some(SYNC_UNEXPECTED.to_string());
                return Err(OperationFailed::new(SYNC_UNEXPECTED));
            }
        };

        let Some(payload) = reply.payload() else {
            let message = reply.failure_message().unwrap_or(SYNC_FAILED).to_string();
            warn!("Sync rejected by agent: {}", message);
            self.last_sync_error = Some(message.clone());
            return Err(OperationFailed::new(message));
        };

        let received = payload.request_count();
        let added = self.board.merge_new(payload.requests());

        let summary = payload.summary().map(str::to_string).unwrap_or_else(|| {
            format!(
                "Synced {} requests. Movies: {}, TV Shows: {}.",
                received,
                payload.movies_count(),
                payload.tv_shows_count()
            )
        });

        info!("Sync merged {} of {} requests", added, received);
        self.last_sync_summary = Some(summary.clone());
        Ok(SyncReport { added, summary })
    }

    /// Asks the agent to route a new request and announce it on Discord.
    ///
    /// Returned requests replace board entries with the same IMDb id.
    pub async fn submit_request(
        &mut self,
        title: &str,
        imdb_link: &str,
        media_type: MediaType,
    ) -> Result<String, OperationFailed> {
        let prompt = agent::submit_prompt(title, imdb_link, media_type);
        let reply = match self.agent.invoke(&prompt, &self.agent_id).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Submit agent call failed: {}", e);
                return Err(OperationFailed::new(SUBMIT_UNEXPECTED));
            }
        };

        let Some(payload) = reply.payload() else {
            let message = reply.error.as_deref().unwrap_or(SUBMIT_FAILED);
            warn!("Submit of {} rejected by agent: {}", title, message);
            return Err(OperationFailed::new(message));
        };

        for request in payload.requests() {
            self.board.upsert(request);
        }

        info!(
            "Submitted {} ({}) to {}",
            title,
            media_type.as_str(),
            media_type.service().as_str()
        );
        Ok(payload.summary().unwrap_or(SUBMIT_OK).to_string())
    }

    /// Refreshes one request's fields from the agent. Returns `true` if the
    /// request was updated; failures leave the board untouched.
    pub async fn resync(&mut self, imdb_id: &str) -> bool {
        let Some(request) = self.board.get(imdb_id) else {
            return false;
        };

        let prompt = agent::resync_prompt(request);
        let reply = match self.agent.invoke(&prompt, &self.agent_id).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Resync of {} failed: {}", imdb_id, e);
                return false;
            }
        };

        let Some(patch) = reply.payload().and_then(|payload| {
            payload
                .patches()
                .into_iter()
                .find(|patch| patch.imdb_id.as_deref() == Some(imdb_id))
        }) else {
            return false;
        };

        self.board.apply_patch(imdb_id, &patch)
    }

    pub fn remove(&mut self, imdb_id: &str) -> Option<MediaRequest> {
        self.board.remove(imdb_id)
    }
}
