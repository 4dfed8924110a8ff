//! Huddle Service Library
//!
//! This library provides session tracking for huddles (call sessions):
//! starting a huddle, appending immutable events to its log, and deriving
//! a summary (distinct participants, duration) from the event log.
//!
//! # Modules
//!
//! - `config` - Service configuration
//! - `errors` - Error types
//! - `handlers` - HTTP request handlers
//! - `middleware` - HTTP middleware layers
//! - `models` - Data models
//! - `observability` - Metrics definitions
//! - `repositories` - Database access layer
//! - `routes` - Router and application state
//! - `services` - Business logic layer

pub mod config;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod observability;
pub mod repositories;
pub mod routes;
pub mod services;
