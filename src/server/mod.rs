//! HTTP server exposing the Discord ingestion endpoint
//!
//! Routes:
//! - `POST /api/discord` - fetch messages and thread messages for channels
//! - `GET /health` - liveness probe
//!
//! Middleware stack: request tracing, optional permissive CORS for the browser
//! dashboard, and a panic catcher that turns handler panics into the endpoint's
//! JSON 500 payload.

pub mod error;
pub mod routes;
pub mod state;

use std::any::Any;
use std::sync::Arc;

use axum::Router;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::AppConfig;
use crate::discord::DiscordClient;
use crate::ingestion::ChannelIngestor;
use crate::traits::DiscordApi;

pub use error::{ApiError, ApiResult};
pub use state::AppState;

/// Build the router with all routes and middleware
pub fn build_router(state: Arc<AppState>, enable_cors: bool) -> Router {
    let cors = if enable_cors {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
    };

    Router::new()
        .route("/api/discord", post(routes::ingest_discord))
        .route("/health", get(routes::health_check))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "Server error fetching Discord messages".to_string()
    };

    ApiError::Internal(detail).into_response()
}

/// Start the MediaHub HTTP server and serve until SIGTERM or Ctrl+C.
pub async fn start_server(config: AppConfig) -> anyhow::Result<()> {
    let client = DiscordClient::new(&config.discord_client_config())?;
    let api: Arc<dyn DiscordApi> = Arc::new(client);
    let ingestor = ChannelIngestor::new(api, config.ingest_options());
    let state = Arc::new(AppState::new(ingestor));

    let app = build_router(state, config.enable_cors);
    let addr = config.socket_addr()?;

    info!("Starting MediaHub server on {}", addr);
    info!(
        "Discord API: {}, max messages: {}, channel concurrency: {}",
        config.discord_api_base, config.max_messages, config.channel_concurrency
    );
    if config.requests_per_second > 0.0 {
        info!(
            "Discord request budget: {}/s (burst {})",
            config.requests_per_second, config.rate_burst
        );
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
