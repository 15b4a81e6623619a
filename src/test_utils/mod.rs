//! Test utilities.
//!
//! This module provides:
//! - Test data factories for creating valid fixtures
//! - An in-memory store implementing every repository trait
//! - `TestAppStateBuilder` for HTTP-level tests against the real router

mod app_state_builder;
mod factories;
mod store_mocks;

pub use app_state_builder::*;
pub use factories::*;
pub use store_mocks::*;
