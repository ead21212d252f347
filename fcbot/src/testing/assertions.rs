//! Assertions over run results.

use crate::core::{RunResult, StepResult, StepStatus};

/// Asserts that the step succeeded.
pub fn assert_step_succeeded(result: &StepResult) {
    assert!(
        result.is_success(),
        "Expected step '{}' to succeed, got {:?}: {}",
        result.name,
        result.status,
        result.message
    );
}

/// Asserts that the step failed.
pub fn assert_step_failed(result: &StepResult) {
    assert!(
        result.is_failure(),
        "Expected step '{}' to fail, got {:?}",
        result.name,
        result.status
    );
}

/// Asserts the status of every step, in order.
pub fn assert_run_statuses(run: &RunResult, expected: &[StepStatus]) {
    let actual: Vec<StepStatus> = run.steps.iter().map(|s| s.status).collect();
    assert_eq!(
        actual,
        expected,
        "Unexpected step statuses, messages: {:?}",
        run.steps.iter().map(|s| s.message.as_str()).collect::<Vec<_>>()
    );
}
