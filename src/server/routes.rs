//! HTTP route handlers

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::response::IntoResponse;
use serde_json::json;
use tracing::info;

use crate::ingestion::IngestPlan;
use crate::models::{IngestRequest, IngestResponse};
use crate::server::error::ApiResult;
use crate::server::state::AppState;

/// `POST /api/discord`
///
/// Fetches messages (and thread messages) for each requested channel.
///
/// The body is parsed by hand rather than through the `Json` extractor so that a
/// missing `Content-Type` is accepted and malformed JSON surfaces as the
/// endpoint's own 500 payload.
///
/// # Response
///
/// ```json
/// {
///   "success": true,
///   "total_messages": 2,
///   "channels": [
///     { "channel_id": "123", "channel_label": "movies", "messages": [], "message_count": 2 }
///   ]
/// }
/// ```
pub async fn ingest_discord(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> ApiResult<Json<IngestResponse>> {
    let request: IngestRequest = serde_json::from_slice(&body)?;
    let plan = IngestPlan::from_request(&request)?;

    info!(
        "Ingesting {} Discord channels (guild: {})",
        plan.targets.len(),
        plan.guild_id.as_deref().unwrap_or("none")
    );

    let response = state.ingestor.ingest(&plan).await;

    info!(
        "Ingestion finished: {} messages, success={}",
        response.total_messages, response.success
    );
    Ok(Json(response))
}

/// `GET /health`
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let uptime = (chrono::Utc::now() - state.started_at).num_seconds().max(0);

    Json(json!({
        "status": "healthy",
        "service": "mediahub",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "uptime_seconds": uptime,
    }))
}
