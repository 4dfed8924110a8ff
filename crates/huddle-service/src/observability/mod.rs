//! Observability module for the huddle service.
//!
//! Provides metrics definitions and instrumentation helpers.

pub mod metrics;
