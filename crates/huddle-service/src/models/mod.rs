//! Huddle service models.
//!
//! Contains the session/event data model and the request/response types
//! used by the HTTP handlers. Identifiers are opaque strings throughout:
//! huddle ids are generated by the service, channel and user ids are
//! caller-supplied and never validated.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A tracked call session.
///
/// Lifecycle is two-state {active, ended}. Only the forward half is ever
/// driven by this service: huddles are created active, and no operation
/// currently marks them ended. `ended_at` is meaningful only once
/// `is_active` is false.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Huddle {
    /// Opaque unique identifier, generated at creation. Never reused.
    pub huddle_id: String,

    /// Caller-supplied channel identifier. Opaque, not validated.
    pub channel_id: String,

    /// Creation time (UTC). Always set.
    pub started_at: DateTime<Utc>,

    /// End time (UTC). Absent while the huddle is active.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,

    /// True from creation until the huddle is explicitly ended.
    pub is_active: bool,
}

/// An event to append to a huddle's log.
///
/// The store assigns the auto-increment event id; this is the insert
/// shape. Events are immutable once appended.
#[derive(Debug, Clone)]
pub struct HuddleEvent {
    /// Owning huddle identifier. A reference, not ownership: existence is
    /// not checked before appending.
    pub huddle_id: String,

    /// Opaque user identifier.
    pub user_id: String,

    /// Free-form event type tag, e.g. "JOINED", "MUTED". Open vocabulary
    /// defined by callers, not a closed enum.
    pub event_type: String,

    /// Append time (UTC), set by the service at the moment of the call.
    pub event_timestamp: DateTime<Utc>,

    /// Optional semi-structured metadata, stored opaquely as JSONB.
    pub metadata: Option<serde_json::Value>,
}

/// A stored event row, including the store-assigned identifier.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct HuddleEventRow {
    /// Auto-increment identifier assigned by the store.
    pub event_id: i64,

    /// Owning huddle identifier.
    pub huddle_id: String,

    /// Opaque user identifier.
    pub user_id: String,

    /// Free-form event type tag.
    pub event_type: String,

    /// Append time (UTC).
    pub event_timestamp: DateTime<Utc>,

    /// Optional metadata blob.
    pub metadata: Option<serde_json::Value>,
}

/// Derived aggregate over a huddle's event log.
///
/// Computed fresh on every query, never cached or persisted. A huddle
/// with zero events yields zero participants and zero duration; that is
/// a success, not a not-found condition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HuddleSummary {
    /// The queried huddle identifier, echoed verbatim.
    pub huddle_id: String,

    /// Count of distinct user identifiers across the huddle's events.
    pub total_participants: i64,

    /// Elapsed seconds between the earliest and latest event timestamp.
    /// A single event yields 0.
    pub duration_seconds: f64,
}

/// Request body for `POST /api/v1/huddles`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StartHuddleRequest {
    /// Channel to attach the huddle to. Opaque; empty is accepted.
    pub channel_id: String,
}

/// Request body for `POST /api/v1/huddles/{id}/events`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogEventRequest {
    /// User the event belongs to.
    pub user_id: String,

    /// Free-form event type tag.
    pub event_type: String,

    /// Optional key/value metadata. Accepts any JSON object.
    #[serde(default)]
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
}

/// Acknowledgement body for a logged event.
#[derive(Debug, Clone, Serialize)]
pub struct LogEventResponse {
    /// Always "logged".
    pub status: &'static str,
}

/// Readiness check response.
///
/// Returned by the `/ready` endpoint (readiness probe).
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessResponse {
    /// Service readiness status ("ready" or "not_ready").
    pub status: &'static str,

    /// Database connectivity status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<&'static str>,

    /// Generic error description when not ready.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
