//! Tests for step and run results.

#[cfg(test)]
mod tests {
    use crate::config::{ObjectSelector, OutputKind, OutputStep};
    use crate::core::{RunResult, StepResult, StepStatus};
    use crate::errors::{ErrorCategory, ExportError, ResolutionError, StepError};
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use std::time::Duration;
    use uuid::Uuid;

    fn step(index: usize, name: &str, kind: OutputKind) -> OutputStep {
        OutputStep {
            index,
            name: name.to_string(),
            comment: None,
            kind,
            filename: format!("{name}.out").into(),
            objects: ObjectSelector::ByLabel(vec!["Part".to_string()]),
            options: serde_json::Map::new(),
            camera: None,
        }
    }

    #[test]
    fn test_success_result() {
        let result = StepResult::success(
            &step(0, "body", OutputKind::Step),
            "exported 1 object",
            Utc::now(),
            Duration::from_millis(12),
        );

        assert_eq!(result.status, StepStatus::Success);
        assert_eq!(result.name, "body");
        assert_eq!(result.kind, OutputKind::Step);
        assert!(result.is_success());
        assert!(result.error_category.is_none());
        assert!((result.elapsed_ms() - 12.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_failed_result_records_category() {
        let err = StepError::from(ResolutionError::ObjectNotFound("Gear".to_string()));
        let result = StepResult::failed(
            &step(3, "gear", OutputKind::Stl),
            &err,
            Utc::now(),
            Duration::ZERO,
        );

        assert!(result.is_failure());
        assert_eq!(result.index, 3);
        assert_eq!(result.error_category, Some(ErrorCategory::Resolution));
        assert_eq!(result.message, "no object found with label 'Gear'");
    }

    #[test]
    fn test_run_result_verdict() {
        let mut run = RunResult::new(Uuid::new_v4());
        assert!(run.is_success());
        assert_eq!(run.exit_code(), 0);

        run.push(StepResult::success(
            &step(0, "a", OutputKind::Step),
            "ok",
            Utc::now(),
            Duration::ZERO,
        ));
        run.push(StepResult::skipped(
            &step(1, "b", OutputKind::Pdf),
            "no pages",
            Utc::now(),
            Duration::ZERO,
        ));
        assert!(run.is_success());

        let err = StepError::from(ExportError::Engine("crashed".to_string()));
        run.push(StepResult::failed(
            &step(2, "c", OutputKind::Screenshot),
            &err,
            Utc::now(),
            Duration::ZERO,
        ));

        assert!(!run.is_success());
        assert_eq!(run.exit_code(), 1);
        assert_eq!(run.count(StepStatus::Success), 1);
        assert_eq!(run.count(StepStatus::Skipped), 1);
        assert_eq!(run.failures().count(), 1);
    }

    #[test]
    fn test_summary_lists_every_step() {
        let mut run = RunResult::new(Uuid::new_v4());
        run.push(StepResult::success(
            &step(0, "housing", OutputKind::Step),
            "exported",
            Utc::now(),
            Duration::ZERO,
        ));
        run.push(StepResult::skipped(
            &step(1, "drawings", OutputKind::Pdf),
            "no pages",
            Utc::now(),
            Duration::ZERO,
        ));

        let summary = run.summary();
        let lines: Vec<&str> = summary.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("housing"));
        assert!(lines[0].contains("success"));
        assert!(lines[1].contains("drawings"));
        assert!(lines[1].contains("skipped"));
        assert!(lines[2].starts_with("1 succeeded, 1 skipped, 0 failed"));
    }

    #[test]
    fn test_step_result_serialization() {
        let result = StepResult::success(
            &step(0, "body", OutputKind::Step),
            "ok",
            Utc::now(),
            Duration::from_millis(5),
        );

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["status"], serde_json::json!("success"));
        assert_eq!(json["kind"], serde_json::json!("step"));
        assert!(json.get("error_category").is_none());
    }
}
