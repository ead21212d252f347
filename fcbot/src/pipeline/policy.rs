//! Failure policy bookkeeping.

use crate::config::FailurePolicy;

/// Tracks failed steps and decides whether the run continues.
#[derive(Debug)]
pub struct FailureCollector {
    /// Failure policy.
    pub policy: FailurePolicy,
    failed: Vec<String>,
}

impl FailureCollector {
    /// Creates a new failure collector.
    #[must_use]
    pub fn new(policy: FailurePolicy) -> Self {
        Self {
            policy,
            failed: Vec::new(),
        }
    }

    /// Records a failed step.
    pub fn record_failure(&mut self, step: impl Into<String>) {
        self.failed.push(step.into());
    }

    /// Returns true if the remaining steps must not run.
    #[must_use]
    pub fn should_stop(&self) -> bool {
        match self.policy {
            FailurePolicy::Abort => !self.failed.is_empty(),
            FailurePolicy::Continue => false,
        }
    }

    /// Returns the names of the failed steps, in order.
    #[must_use]
    pub fn failed_steps(&self) -> &[String] {
        &self.failed
    }
}

impl Default for FailureCollector {
    fn default() -> Self {
        Self::new(FailurePolicy::default())
    }
}
