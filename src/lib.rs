//! MediaHub: Discord channel ingestion for the media request dashboard
//!
//! The HTTP endpoint `POST /api/discord` collects messages, including thread
//! messages, from a set of Discord channels so an AI agent can turn them into
//! movie and TV show requests. The [`dashboard`] module holds the request board
//! fed by that agent.

pub mod config;
pub mod dashboard;
pub mod discord;
pub mod error;
pub mod ingestion;
pub mod models;
pub mod server;
pub mod traits;

pub use config::AppConfig;
pub use error::{DiscordError, ValidationError};
pub use ingestion::{ChannelIngestor, IngestOptions, IngestPlan};
pub use models::{ChannelResult, IngestRequest, IngestResponse, Message};
