//! Pipeline execution.
//!
//! This module provides:
//! - The sequential step runner
//! - Failure policy bookkeeping
//! - Output file preparation

#[cfg(test)]
mod integration_tests;
mod output_path;
mod policy;
mod runner;

pub use output_path::prepare_output;
pub use policy::FailureCollector;
pub use runner::Pipeline;
