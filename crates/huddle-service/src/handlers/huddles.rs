//! Huddle handlers.
//!
//! Implements the huddle endpoints:
//!
//! - `POST /api/v1/huddles` - Start a huddle
//! - `POST /api/v1/huddles/{id}/events` - Append an event to a huddle log
//! - `GET /api/v1/huddles/{id}/summary` - Derived summary for a huddle
//!
//! Request bodies are deserialized manually from bytes so malformed JSON
//! yields 400 rather than Axum's default 422. Identifiers in the path are
//! opaque strings; the summary endpoint answers 200 with a zero-valued
//! summary for ids it has never seen.

use crate::errors::HsError;
use crate::models::{
    Huddle, HuddleSummary, LogEventRequest, LogEventResponse, StartHuddleRequest,
};
use crate::observability::metrics;
use crate::routes::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument};

/// Handler for POST /api/v1/huddles
///
/// Start a new huddle on the supplied channel.
///
/// # Response
///
/// - 201 Created: the new huddle, active, with its generated id
/// - 400 Bad Request: invalid request body
/// - 500 Internal Server Error: database error
#[instrument(
    skip_all,
    name = "hs.huddle.start",
    fields(method = "POST", endpoint = "/api/v1/huddles")
)]
pub async fn start_huddle(
    State(state): State<Arc<AppState>>,
    body: axum::body::Bytes,
) -> Result<(StatusCode, Json<Huddle>), HsError> {
    let start = Instant::now();

    // Deserialize request body manually to return 400 (not Axum's default 422)
    let request: StartHuddleRequest = serde_json::from_slice(&body).map_err(|e| {
        tracing::debug!(target: "hs.handlers.huddles", error = %e, "Invalid request body");
        metrics::record_huddle_start("error", start.elapsed());
        HsError::BadRequest("Invalid request body".to_string())
    })?;

    let huddle = state
        .huddles
        .start_huddle(&request.channel_id)
        .await
        .inspect_err(|_| {
            metrics::record_huddle_start("error", start.elapsed());
        })?;

    metrics::record_huddle_start("success", start.elapsed());
    info!(
        target: "hs.handlers.huddles",
        huddle_id = %huddle.huddle_id,
        channel_id = %huddle.channel_id,
        "Huddle started"
    );

    Ok((StatusCode::CREATED, Json(huddle)))
}

/// Handler for POST /api/v1/huddles/{id}/events
///
/// Append an event to a huddle's log. The huddle id is taken on trust:
/// no existence check is performed before the append.
///
/// # Response
///
/// - 200 OK: `{"status":"logged"}`
/// - 400 Bad Request: invalid request body, or metadata that cannot be
///   encoded (in which case nothing was written)
/// - 500 Internal Server Error: database error
#[instrument(
    skip_all,
    name = "hs.huddle.log_event",
    fields(method = "POST", endpoint = "/api/v1/huddles/{id}/events")
)]
pub async fn log_event(
    State(state): State<Arc<AppState>>,
    Path(huddle_id): Path<String>,
    body: axum::body::Bytes,
) -> Result<Json<LogEventResponse>, HsError> {
    let start = Instant::now();

    let request: LogEventRequest = serde_json::from_slice(&body).map_err(|e| {
        tracing::debug!(target: "hs.handlers.huddles", error = %e, "Invalid request body");
        metrics::record_event_logged("error", Some("bad_request"), start.elapsed());
        HsError::BadRequest("Invalid request body".to_string())
    })?;

    state
        .huddles
        .log_activity(
            &huddle_id,
            &request.user_id,
            &request.event_type,
            request.metadata.as_ref(),
        )
        .await
        .inspect_err(|e| {
            let error_type = match e {
                HsError::Encoding(_) => "encoding",
                HsError::Database(_) => "database",
                _ => "other",
            };
            metrics::record_event_logged("error", Some(error_type), start.elapsed());
        })?;

    metrics::record_event_logged("success", None, start.elapsed());

    Ok(Json(LogEventResponse { status: "logged" }))
}

/// Handler for GET /api/v1/huddles/{id}/summary
///
/// Compute the summary (distinct participants, duration in seconds) for a
/// huddle from its event log.
///
/// # Response
///
/// - 200 OK: the summary; a huddle with no events (including an id that
///   was never issued) yields `{total_participants: 0, duration_seconds: 0}`
/// - 500 Internal Server Error: database error
#[instrument(
    skip_all,
    name = "hs.huddle.summary",
    fields(method = "GET", endpoint = "/api/v1/huddles/{id}/summary")
)]
pub async fn get_huddle_summary(
    State(state): State<Arc<AppState>>,
    Path(huddle_id): Path<String>,
) -> Result<Json<HuddleSummary>, HsError> {
    let start = Instant::now();

    let summary = state
        .huddles
        .get_huddle_summary(&huddle_id)
        .await
        .inspect_err(|_| {
            metrics::record_summary_query("error", start.elapsed());
        })?;

    metrics::record_summary_query("success", start.elapsed());

    Ok(Json(summary))
}
