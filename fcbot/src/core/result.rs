//! Per-step and per-run results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::time::Duration;
use uuid::Uuid;

use super::StepStatus;
use crate::config::{OutputKind, OutputStep};
use crate::errors::{ErrorCategory, StepError};

/// Outcome of executing one output step.
///
/// Created once per step and never modified afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResult {
    /// Position of the step in the configuration.
    pub index: usize,
    /// Step display name.
    pub name: String,
    /// Output type of the step.
    pub kind: OutputKind,
    /// Step status.
    pub status: StepStatus,
    /// Human-readable message.
    pub message: String,
    /// Error category for failed steps.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_category: Option<ErrorCategory>,
    /// When the step started.
    pub started_at: DateTime<Utc>,
    /// Wall-clock time spent on the step.
    pub elapsed: Duration,
}

impl StepResult {
    fn new(
        step: &OutputStep,
        status: StepStatus,
        message: impl Into<String>,
        started_at: DateTime<Utc>,
        elapsed: Duration,
    ) -> Self {
        Self {
            index: step.index,
            name: step.name.clone(),
            kind: step.kind,
            status,
            message: message.into(),
            error_category: None,
            started_at,
            elapsed,
        }
    }

    /// Creates a successful step result.
    #[must_use]
    pub fn success(
        step: &OutputStep,
        message: impl Into<String>,
        started_at: DateTime<Utc>,
        elapsed: Duration,
    ) -> Self {
        Self::new(step, StepStatus::Success, message, started_at, elapsed)
    }

    /// Creates a skipped step result.
    #[must_use]
    pub fn skipped(
        step: &OutputStep,
        reason: impl Into<String>,
        started_at: DateTime<Utc>,
        elapsed: Duration,
    ) -> Self {
        Self::new(step, StepStatus::Skipped, reason, started_at, elapsed)
    }

    /// Creates a failed step result from a step-scoped error.
    #[must_use]
    pub fn failed(
        step: &OutputStep,
        error: &StepError,
        started_at: DateTime<Utc>,
        elapsed: Duration,
    ) -> Self {
        let mut result = Self::new(step, StepStatus::Failed, error.to_string(), started_at, elapsed);
        result.error_category = Some(error.category());
        result
    }

    /// Returns the elapsed time in milliseconds.
    #[must_use]
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed.as_secs_f64() * 1000.0
    }

    /// Returns true if the step succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == StepStatus::Success
    }

    /// Returns true if the step failed.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        self.status.is_failure()
    }
}

/// Ordered results of a whole run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    /// Identifier of the run, attached to log records.
    pub run_id: Uuid,
    /// Step results in configuration order.
    pub steps: Vec<StepResult>,
    /// Total wall-clock time.
    pub elapsed: Duration,
}

impl RunResult {
    /// Creates an empty run result.
    #[must_use]
    pub fn new(run_id: Uuid) -> Self {
        Self {
            run_id,
            steps: Vec::new(),
            elapsed: Duration::ZERO,
        }
    }

    /// Appends a step result.
    pub fn push(&mut self, result: StepResult) {
        self.steps.push(result);
    }

    /// Returns true if no step failed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        !self.steps.iter().any(StepResult::is_failure)
    }

    /// Returns the number of steps with the given status.
    #[must_use]
    pub fn count(&self, status: StepStatus) -> usize {
        self.steps.iter().filter(|s| s.status == status).count()
    }

    /// Returns the failed step results.
    pub fn failures(&self) -> impl Iterator<Item = &StepResult> {
        self.steps.iter().filter(|s| s.is_failure())
    }

    /// Process exit code for this run: 0 when every step succeeded.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        u8::from(!self.is_success())
    }

    /// Renders a plain-text summary, one line per step.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut out = String::new();
        let name_width = self
            .steps
            .iter()
            .map(|s| s.name.len())
            .max()
            .unwrap_or(0)
            .max(4);

        for step in &self.steps {
            let _ = writeln!(
                out,
                "[{:>2}] {:<name_width$}  {:<10}  {:<7}  {:>8.1} ms  {}",
                step.index,
                step.name,
                step.kind.to_string(),
                step.status.to_string(),
                step.elapsed_ms(),
                step.message,
            );
        }

        let _ = write!(
            out,
            "{} succeeded, {} skipped, {} failed in {:.1} ms",
            self.count(StepStatus::Success),
            self.count(StepStatus::Skipped),
            self.count(StepStatus::Failed),
            self.elapsed.as_secs_f64() * 1000.0,
        );
        out
    }
}
