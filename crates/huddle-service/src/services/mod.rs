//! Service layer for the huddle service.
//!
//! Contains the business logic that orchestrates huddle creation, event
//! logging and summary queries over the injected persistence capability.

pub mod huddle_service;

pub use huddle_service::HuddleService;
