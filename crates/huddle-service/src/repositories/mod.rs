//! Repository layer for the huddle service.
//!
//! The `HuddleRepository` trait is the persistence capability the business
//! logic depends on; `PostgresHuddleRepository` is the production adapter.
//! All queries use parameterized statements.

pub mod huddles;

pub use huddles::{HuddleRepository, PostgresHuddleRepository};
// In-memory mock for service unit tests
#[allow(unused_imports)]
pub use huddles::mock::MockHuddleRepository;
