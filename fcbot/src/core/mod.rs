//! Core result types for fcbot runs.
//!
//! This module contains:
//! - The step status enum
//! - Per-step results and the aggregated run result

mod result;
#[cfg(test)]
mod result_tests;
mod status;

pub use result::{RunResult, StepResult};
pub use status::StepStatus;
