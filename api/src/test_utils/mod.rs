//! Test utilities
//!
//! Manual mock implementations and test fixtures for unit testing.
//! `AppState` holds trait objects, so handler tests run the real router
//! over these in-memory repositories.

pub mod fixtures;
pub mod mocks;
pub mod server;

pub use fixtures::*;
pub use mocks::*;
pub use server::*;
