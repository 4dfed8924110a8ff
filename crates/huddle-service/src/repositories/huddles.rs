//! Huddle repository for database operations.
//!
//! Provides durable storage for huddle sessions and their append-only
//! event logs, and the authoritative summary aggregation query.
//!
//! # Semantics
//!
//! - `save_session` is a plain insert; a duplicate huddle id is a
//!   constraint violation surfaced as a database error.
//! - `save_log` is append-only; rows are never updated. The huddle id is
//!   not checked for existence (and the schema has no foreign key), so
//!   concurrent writers need nothing beyond transactional insert.
//! - `get_summary` aggregates in SQL, never in memory: distinct user
//!   count plus elapsed seconds between the earliest and latest event.
//!   Zero rows is a zero-valued summary, not an error.

use crate::errors::HsError;
use crate::models::{Huddle, HuddleEvent, HuddleSummary};
use crate::observability::metrics;
use async_trait::async_trait;
use sqlx::PgPool;
use std::time::Instant;
use tracing::instrument;

/// Persistence capability consumed by the business logic layer.
///
/// Constructed once at startup and injected by reference; implementations
/// must be safe under concurrent callers.
#[async_trait]
pub trait HuddleRepository: Send + Sync {
    /// Persist a new huddle session.
    async fn save_session(&self, huddle: &Huddle) -> Result<(), HsError>;

    /// Append an event to a huddle's log.
    async fn save_log(&self, event: &HuddleEvent) -> Result<(), HsError>;

    /// Compute the summary for a huddle from its event log.
    async fn get_summary(&self, huddle_id: &str) -> Result<HuddleSummary, HsError>;
}

/// Postgres-backed huddle repository.
pub struct PostgresHuddleRepository {
    pool: PgPool,
}

impl PostgresHuddleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HuddleRepository for PostgresHuddleRepository {
    #[instrument(skip_all, name = "hs.repo.save_session")]
    async fn save_session(&self, huddle: &Huddle) -> Result<(), HsError> {
        let start = Instant::now();

        sqlx::query(
            r#"
            INSERT INTO huddles (huddle_id, channel_id, started_at, ended_at, is_active)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&huddle.huddle_id)
        .bind(&huddle.channel_id)
        .bind(huddle.started_at)
        .bind(huddle.ended_at)
        .bind(huddle.is_active)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            metrics::record_db_query("save_session", "error", start.elapsed());
            // Check for primary key violation (duplicate huddle id)
            if e.to_string().contains("huddles_pkey") {
                HsError::Database("Huddle with this id already exists".to_string())
            } else {
                HsError::Database(format!("Failed to save huddle session: {e}"))
            }
        })?;

        metrics::record_db_query("save_session", "success", start.elapsed());
        Ok(())
    }

    #[instrument(skip_all, name = "hs.repo.save_log")]
    async fn save_log(&self, event: &HuddleEvent) -> Result<(), HsError> {
        let start = Instant::now();

        sqlx::query(
            r#"
            INSERT INTO huddle_logs (huddle_id, user_id, event_type, event_timestamp, metadata)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&event.huddle_id)
        .bind(&event.user_id)
        .bind(&event.event_type)
        .bind(event.event_timestamp)
        .bind(&event.metadata)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            metrics::record_db_query("save_log", "error", start.elapsed());
            HsError::Database(format!("Failed to append huddle event: {e}"))
        })?;

        metrics::record_db_query("save_log", "success", start.elapsed());
        Ok(())
    }

    #[instrument(skip_all, name = "hs.repo.get_summary")]
    async fn get_summary(&self, huddle_id: &str) -> Result<HuddleSummary, HsError> {
        let start = Instant::now();

        // Aggregates always return one row; COALESCE turns the NULL
        // MAX-MIN of an empty log into a zero duration. Duration uses
        // timestamp ordering, not insertion order.
        let (total_participants, duration_seconds): (i64, f64) = sqlx::query_as(
            r#"
            SELECT
                COUNT(DISTINCT user_id),
                COALESCE(
                    EXTRACT(EPOCH FROM (MAX(event_timestamp) - MIN(event_timestamp))),
                    0
                )::double precision
            FROM huddle_logs
            WHERE huddle_id = $1
            "#,
        )
        .bind(huddle_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            metrics::record_db_query("get_summary", "error", start.elapsed());
            HsError::Database(format!("Failed to compute huddle summary: {e}"))
        })?;

        metrics::record_db_query("get_summary", "success", start.elapsed());

        Ok(HuddleSummary {
            huddle_id: huddle_id.to_string(),
            total_participants,
            duration_seconds,
        })
    }
}

pub mod mock {
    //! In-memory repository for unit testing the service layer.

    use super::{async_trait, HsError, Huddle, HuddleEvent, HuddleRepository, HuddleSummary};
    use std::collections::HashSet;
    use std::sync::Mutex;

    /// Mock repository backed by in-memory vectors.
    ///
    /// `new()` builds a working store; `failing()` builds one where every
    /// operation returns a database error, for error-propagation tests.
    pub struct MockHuddleRepository {
        huddles: Mutex<Vec<Huddle>>,
        events: Mutex<Vec<HuddleEvent>>,
        fail: bool,
    }

    impl MockHuddleRepository {
        pub fn new() -> Self {
            Self {
                huddles: Mutex::new(Vec::new()),
                events: Mutex::new(Vec::new()),
                fail: false,
            }
        }

        pub fn failing() -> Self {
            Self {
                huddles: Mutex::new(Vec::new()),
                events: Mutex::new(Vec::new()),
                fail: true,
            }
        }

        /// Snapshot of the stored huddles.
        pub fn huddles(&self) -> Vec<Huddle> {
            self.huddles.lock().map(|g| g.clone()).unwrap_or_default()
        }

        /// Snapshot of the stored events.
        pub fn events(&self) -> Vec<HuddleEvent> {
            self.events.lock().map(|g| g.clone()).unwrap_or_default()
        }
    }

    impl Default for MockHuddleRepository {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl HuddleRepository for MockHuddleRepository {
        async fn save_session(&self, huddle: &Huddle) -> Result<(), HsError> {
            if self.fail {
                return Err(HsError::Database("mock store unavailable".to_string()));
            }

            let mut huddles = self.huddles.lock().map_err(|_| HsError::Internal)?;
            if huddles.iter().any(|h| h.huddle_id == huddle.huddle_id) {
                return Err(HsError::Database(
                    "Huddle with this id already exists".to_string(),
                ));
            }
            huddles.push(huddle.clone());
            Ok(())
        }

        async fn save_log(&self, event: &HuddleEvent) -> Result<(), HsError> {
            if self.fail {
                return Err(HsError::Database("mock store unavailable".to_string()));
            }

            let mut events = self.events.lock().map_err(|_| HsError::Internal)?;
            events.push(event.clone());
            Ok(())
        }

        async fn get_summary(&self, huddle_id: &str) -> Result<HuddleSummary, HsError> {
            if self.fail {
                return Err(HsError::Database("mock store unavailable".to_string()));
            }

            let events = self.events.lock().map_err(|_| HsError::Internal)?;
            let matching: Vec<&HuddleEvent> = events
                .iter()
                .filter(|e| e.huddle_id == huddle_id)
                .collect();

            let total_participants = matching
                .iter()
                .map(|e| e.user_id.as_str())
                .collect::<HashSet<_>>()
                .len() as i64;

            let duration_seconds = match (
                matching.iter().map(|e| e.event_timestamp).min(),
                matching.iter().map(|e| e.event_timestamp).max(),
            ) {
                (Some(min), Some(max)) => (max - min).num_milliseconds() as f64 / 1000.0,
                _ => 0.0,
            };

            Ok(HuddleSummary {
                huddle_id: huddle_id.to_string(),
                total_participants,
                duration_seconds,
            })
        }
    }
}
