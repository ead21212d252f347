//! End-to-end tests: configuration text through to run results.

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;
    use std::path::Path;

    use crate::config::{parse_config, FailurePolicy};
    use crate::core::{RunResult, StepStatus};
    use crate::document::DocumentIndex;
    use crate::errors::{ConfigErrorKind, ErrorCategory};
    use crate::pipeline::Pipeline;
    use crate::testing::{
        assert_run_statuses, assert_step_failed, assert_step_succeeded, fixtures, ExportOp,
        StubDocument,
    };

    fn pipeline(yaml: &str, output_dir: &Path) -> Pipeline {
        let config = parse_config(yaml).unwrap();
        Pipeline::new(
            config.run.with_fallback_output_dir(Some(output_dir.to_path_buf())),
            config.steps,
        )
    }

    async fn run(yaml: &str, output_dir: &Path, document: &mut StubDocument) -> RunResult {
        pipeline(yaml, output_dir).run(document).await
    }

    #[tokio::test]
    async fn test_three_step_run_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let mut document = StubDocument::new(fixtures::part_index());
        let log = document.log();

        let result = run(fixtures::THREE_STEP_CONFIG, dir.path(), &mut document).await;

        assert_run_statuses(
            &result,
            &[StepStatus::Success, StepStatus::Success, StepStatus::Success],
        );
        assert_eq!(result.exit_code(), 0);
        assert_eq!(
            result.steps.iter().map(|s| s.name.as_str()).collect::<Vec<_>>(),
            vec!["part-step", "part-mesh", "drawings"]
        );

        assert_eq!(log.ops(), vec![ExportOp::Step, ExportOp::Mesh, ExportOp::Pdf]);
        let calls = log.calls();
        assert_eq!(calls[0].objects, vec!["Part".to_string()]);
        assert_eq!(calls[1].objects, vec!["Part".to_string()]);
        assert_eq!(calls[2].objects, vec!["Page".to_string(), "Page001".to_string()]);

        assert!(dir.path().join("part.step").is_file());
        assert!(dir.path().join("mesh/part.stl").is_file());
        assert!(dir.path().join("drawings.pdf").is_file());
    }

    #[test]
    fn test_unsupported_version_rejects_whole_file() {
        let yaml = fixtures::THREE_STEP_CONFIG.replace("version: 1", "version: 2");
        let err = parse_config(&yaml).unwrap_err();

        assert_eq!(err.path, "fcbot.version");
        assert_eq!(err.kind, ConfigErrorKind::UnsupportedVersion("2".to_string()));
    }

    #[test]
    fn test_escaping_filename_rejected_before_export() {
        let yaml = r"
outputs:
  - type: step
    filename: ../escape.step
    objects: [Part]
";
        let err = parse_config(yaml).unwrap_err();
        assert_eq!(err.path, "outputs[0].filename");
        assert_eq!(
            err.kind,
            ConfigErrorKind::InvalidFilename("../escape.step".to_string())
        );
    }

    #[tokio::test]
    async fn test_stl_with_two_objects_fails_without_export() {
        let dir = tempfile::tempdir().unwrap();
        let mut document = StubDocument::new(fixtures::assembly_index());
        let log = document.log();

        let yaml = r"
outputs:
  - type: stl
    filename: both.stl
    objects: [Housing, Lid]
  - type: step
    filename: both.step
    objects: [Housing, Lid]
";
        let result = run(yaml, dir.path(), &mut document).await;

        assert_run_statuses(&result, &[StepStatus::Failed, StepStatus::Success]);
        assert_eq!(result.steps[0].error_category, Some(ErrorCategory::Resolution));
        assert!(result.steps[0].message.contains("only one object"));
        assert_eq!(log.ops(), vec![ExportOp::Step]);
        assert!(!dir.path().join("both.stl").exists());
        assert_eq!(result.exit_code(), 1);
    }

    #[tokio::test]
    async fn test_continue_policy_reports_every_failure() {
        let dir = tempfile::tempdir().unwrap();
        let mut document =
            StubDocument::new(fixtures::part_index()).with_failure(ExportOp::Mesh, "mesher crashed");

        let result = run(fixtures::THREE_STEP_CONFIG, dir.path(), &mut document).await;

        assert_run_statuses(
            &result,
            &[StepStatus::Success, StepStatus::Failed, StepStatus::Success],
        );
        assert_step_failed(&result.steps[1]);
        assert_eq!(result.steps[1].error_category, Some(ErrorCategory::Export));
        assert!(result.steps[1].message.contains("mesher crashed"));
        assert_eq!(result.failures().count(), 1);
        assert_eq!(result.exit_code(), 1);
    }

    #[tokio::test]
    async fn test_abort_policy_skips_remaining_steps() {
        let dir = tempfile::tempdir().unwrap();
        let mut document =
            StubDocument::new(fixtures::part_index()).with_failure(ExportOp::Step, "disk full");
        let log = document.log();

        let config = parse_config(fixtures::THREE_STEP_CONFIG).unwrap();
        let pipeline = Pipeline::new(
            config
                .run
                .with_fallback_output_dir(Some(dir.path().to_path_buf()))
                .with_failure_policy(FailurePolicy::Abort),
            config.steps,
        );
        let result = pipeline.run(&mut document).await;

        assert_run_statuses(
            &result,
            &[StepStatus::Failed, StepStatus::Skipped, StepStatus::Skipped],
        );
        assert_eq!(result.steps[1].message, "not run after earlier failure");
        assert_eq!(log.ops(), vec![ExportOp::Step]);
        assert_eq!(result.exit_code(), 1);
    }

    #[tokio::test]
    async fn test_abort_policy_from_configuration() {
        let dir = tempfile::tempdir().unwrap();
        let mut document = StubDocument::new(fixtures::part_index());

        let yaml = r"
fcbot:
  on_failure: abort
outputs:
  - type: step
    filename: ghost.step
    objects: [Ghost]
  - type: step
    filename: part.step
    objects: [Part]
";
        let result = run(yaml, dir.path(), &mut document).await;

        assert_run_statuses(&result, &[StepStatus::Failed, StepStatus::Skipped]);
        assert!(result.steps[0].message.contains("Ghost"));
    }

    #[tokio::test]
    async fn test_screenshot_receives_resolved_camera() {
        let dir = tempfile::tempdir().unwrap();
        let mut document = StubDocument::new(fixtures::assembly_index());
        let log = document.log();

        let result = run(fixtures::SCREENSHOT_CONFIG, dir.path(), &mut document).await;
        assert_step_succeeded(&result.steps[0]);

        let calls = log.calls();
        assert_eq!(calls[0].op, ExportOp::Screenshot);
        assert_eq!(calls[0].objects, vec!["Body".to_string()]);
        assert_eq!(calls[0].target, dir.path().join("images/housing.png"));

        let camera = calls[0].camera.clone().unwrap();
        assert_eq!((camera.width, camera.height), (640, 480));
        assert!(camera.fit_all());
        assert_eq!(camera.background.to_string(), "white");

        let third = 1.0 / 3.0_f64.sqrt();
        let forward = camera.forward();
        assert_relative_eq!(forward.x, -third, epsilon = 1e-9);
        assert_relative_eq!(forward.y, third, epsilon = 1e-9);
        assert_relative_eq!(forward.z, -third, epsilon = 1e-9);
        assert!(dir.path().join("images/housing.png").is_file());
    }

    #[tokio::test]
    async fn test_invalid_resolution_fails_before_export() {
        let dir = tempfile::tempdir().unwrap();
        let mut document = StubDocument::new(fixtures::assembly_index());
        let log = document.log();

        let yaml = fixtures::SCREENSHOT_CONFIG.replace("[640, 480]", "[640, 0]");
        let result = run(&yaml, dir.path(), &mut document).await;

        assert_step_failed(&result.steps[0]);
        assert_eq!(result.steps[0].error_category, Some(ErrorCategory::Camera));
        assert!(log.is_empty());
        assert!(!dir.path().join("images").exists());
    }

    #[tokio::test]
    async fn test_pdf_without_pages_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let mut document = StubDocument::new(DocumentIndex::new(vec![fixtures::solid("Part", "Part")]));
        let log = document.log();

        let yaml = r"
outputs:
  - type: pdf
    filename: drawings.pdf
    objects:
      pages: all
";
        let result = run(yaml, dir.path(), &mut document).await;

        assert_run_statuses(&result, &[StepStatus::Skipped]);
        assert!(result.is_success());
        assert_eq!(result.exit_code(), 0);
        assert!(log.is_empty());
    }

    #[tokio::test]
    async fn test_directory_at_target_fails_step() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("part.step")).unwrap();
        let mut document = StubDocument::new(fixtures::part_index());
        let log = document.log();

        let result = run(fixtures::THREE_STEP_CONFIG, dir.path(), &mut document).await;

        assert_run_statuses(
            &result,
            &[StepStatus::Failed, StepStatus::Success, StepStatus::Success],
        );
        assert_eq!(result.steps[0].error_category, Some(ErrorCategory::Export));
        assert!(result.steps[0].message.contains("not writable"));
        assert_eq!(log.ops(), vec![ExportOp::Mesh, ExportOp::Pdf]);
    }

    #[tokio::test]
    async fn test_existing_output_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("part.step"), b"stale").unwrap();
        let mut document = StubDocument::new(fixtures::part_index());

        let result = run(fixtures::THREE_STEP_CONFIG, dir.path(), &mut document).await;

        assert_step_succeeded(&result.steps[0]);
        let content = std::fs::read_to_string(dir.path().join("part.step")).unwrap();
        assert_ne!(content, "stale");
    }

    #[tokio::test]
    async fn test_summary_lists_every_step() {
        let dir = tempfile::tempdir().unwrap();
        let mut document =
            StubDocument::new(fixtures::part_index()).with_failure(ExportOp::Pdf, "no GUI");

        let result = run(fixtures::THREE_STEP_CONFIG, dir.path(), &mut document).await;
        let summary = result.summary();

        assert_eq!(summary.lines().count(), 4);
        assert!(summary.contains("part-step"));
        assert!(summary.contains("drawings"));
        assert!(summary.ends_with(&format!(
            "2 succeeded, 0 skipped, 1 failed in {:.1} ms",
            result.elapsed.as_secs_f64() * 1000.0
        )));
    }
}
