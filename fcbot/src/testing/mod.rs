//! Testing utilities for fcbot pipelines.
//!
//! This module provides:
//! - An in-memory CAD document that records export calls
//! - Document and configuration fixtures
//! - Assertions over run results

mod assertions;
pub mod fixtures;
mod mocks;

pub use assertions::{assert_run_statuses, assert_step_failed, assert_step_succeeded};
pub use mocks::{CallLog, ExportCall, ExportOp, StubDocument};
