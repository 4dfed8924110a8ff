//! Huddle lifecycle manager.
//!
//! Orchestrates creation of huddles and recording of events; all
//! durability is delegated to the injected [`HuddleRepository`]. This
//! layer holds no mutable state of its own and never aggregates in
//! memory - the summary is computed by the store.

use crate::errors::HsError;
use crate::models::{Huddle, HuddleEvent, HuddleSummary};
use crate::repositories::HuddleRepository;
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

/// Business logic for huddle sessions.
///
/// Cheap to clone; the repository is shared behind an `Arc`.
#[derive(Clone)]
pub struct HuddleService {
    repo: Arc<dyn HuddleRepository>,
}

impl HuddleService {
    pub fn new(repo: Arc<dyn HuddleRepository>) -> Self {
        Self { repo }
    }

    /// Start a new huddle on a channel.
    ///
    /// Generates a fresh v4 UUID identifier, stamps the start time with
    /// the current UTC time and persists the session as active. The
    /// channel id is opaque and not validated; empty strings are
    /// accepted. On a store failure no identifier is returned - there is
    /// no observable partial success.
    #[instrument(skip_all, name = "hs.service.start_huddle")]
    pub async fn start_huddle(&self, channel_id: &str) -> Result<Huddle, HsError> {
        let huddle = Huddle {
            huddle_id: Uuid::new_v4().to_string(),
            channel_id: channel_id.to_string(),
            started_at: Utc::now(),
            ended_at: None,
            is_active: true,
        };

        self.repo.save_session(&huddle).await?;

        Ok(huddle)
    }

    /// Append an event to a huddle's log.
    ///
    /// The timestamp is taken at the moment of the call. Metadata is
    /// serialized to a JSON value BEFORE the store is touched; a
    /// serialization failure is an [`HsError::Encoding`] and no write is
    /// attempted. The huddle id is not checked for existence - callers
    /// may log against ids this service never issued.
    #[instrument(skip_all, name = "hs.service.log_activity", fields(event_type = %event_type))]
    pub async fn log_activity<M>(
        &self,
        huddle_id: &str,
        user_id: &str,
        event_type: &str,
        metadata: Option<&M>,
    ) -> Result<(), HsError>
    where
        M: Serialize + Sync,
    {
        let metadata = metadata
            .map(serde_json::to_value)
            .transpose()
            .map_err(|e| HsError::Encoding(e.to_string()))?;

        let event = HuddleEvent {
            huddle_id: huddle_id.to_string(),
            user_id: user_id.to_string(),
            event_type: event_type.to_string(),
            event_timestamp: Utc::now(),
            metadata,
        };

        self.repo.save_log(&event).await
    }

    /// Fetch the participant count and duration for a huddle.
    ///
    /// Pure passthrough to the store's aggregation query. An unknown or
    /// eventless huddle yields a zero-valued summary, never an error.
    #[instrument(skip_all, name = "hs.service.get_huddle_summary")]
    pub async fn get_huddle_summary(&self, huddle_id: &str) -> Result<HuddleSummary, HsError> {
        self.repo.get_summary(huddle_id).await
    }
}
