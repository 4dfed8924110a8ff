//! HTTP routes for the huddle service.
//!
//! Defines the Axum router and application state.

use crate::config::Config;
use crate::handlers;
use crate::middleware::http_metrics_middleware;
use crate::services::HuddleService;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

/// Application state shared across all handlers.
///
/// Constructed once at startup; the huddle service carries the injected
/// persistence capability.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool (readiness checks).
    pub pool: PgPool,

    /// Service configuration.
    pub config: Config,

    /// Huddle business logic.
    pub huddles: HuddleService,
}

/// Build the application routes.
///
/// Creates an Axum router with:
/// - `/health` - Liveness probe (simple "OK") - unversioned
/// - `/ready` - Readiness probe (checks DB) - unversioned
/// - `/metrics` - Prometheus metrics endpoint - unversioned
/// - `POST /api/v1/huddles` - Start a huddle
/// - `POST /api/v1/huddles/{id}/events` - Append an event
/// - `GET /api/v1/huddles/{id}/summary` - Derived summary
/// - TraceLayer for request logging
/// - HTTP metrics middleware
/// - 30 second request timeout
pub fn build_routes(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let api_routes = Router::new()
        // Health check endpoints (unversioned operational endpoints)
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        // Huddle endpoints
        .route("/api/v1/huddles", post(handlers::start_huddle))
        .route("/api/v1/huddles/:id/events", post(handlers::log_event))
        .route(
            "/api/v1/huddles/:id/summary",
            get(handlers::get_huddle_summary),
        )
        .with_state(state);

    // Metrics route with its own state
    let metrics_routes = Router::new()
        .route("/metrics", get(handlers::metrics_handler))
        .with_state(metrics_handle);

    // Layer order (bottom-to-top execution):
    // 1. TimeoutLayer - Timeout the request (innermost)
    // 2. TraceLayer - Log request details
    // 3. http_metrics_middleware - Record ALL responses (outermost)
    api_routes
        .merge(metrics_routes)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        // HTTP metrics layer (outermost) - captures ALL responses including
        // framework-level errors like 415, 400, 404, 405
        .layer(middleware::from_fn(http_metrics_middleware))
}
