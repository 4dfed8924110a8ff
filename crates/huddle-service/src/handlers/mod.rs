//! HTTP request handlers for the huddle service.

pub mod health;
pub mod huddles;
pub mod metrics;

pub use health::{health_check, readiness_check};
pub use huddles::{get_huddle_summary, log_event, start_huddle};
pub use metrics::metrics_handler;
