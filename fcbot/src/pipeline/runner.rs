//! Sequential execution of output steps.

use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use super::output_path::prepare_output;
use super::policy::FailureCollector;
use crate::camera::resolve_camera;
use crate::config::{OutputKind, OutputStep, RunConfig, ValidatedConfig};
use crate::core::{RunResult, StepResult, StepStatus};
use crate::document::CadDocument;
use crate::errors::{CameraError, ResolutionError, StepError};
use crate::observability::StepTimer;
use crate::resolver::resolve_objects;

const SKIPPED_AFTER_FAILURE: &str = "not run after earlier failure";

/// What a step did when it did not fail.
enum StepOutcome {
    Written(String),
    Nothing(String),
}

/// Runs validated output steps against one open document.
///
/// Steps run strictly in configuration order, one at a time. A failing
/// step never affects the steps before it; whether later steps run is
/// decided by the configured [`FailurePolicy`](crate::config::FailurePolicy).
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: RunConfig,
    steps: Vec<OutputStep>,
    run_id: Uuid,
}

impl Pipeline {
    /// Creates a pipeline from settings and steps.
    #[must_use]
    pub fn new(config: RunConfig, steps: Vec<OutputStep>) -> Self {
        Self {
            config,
            steps,
            run_id: Uuid::new_v4(),
        }
    }

    /// Creates a pipeline from a validated configuration.
    #[must_use]
    pub fn from_config(validated: ValidatedConfig) -> Self {
        Self::new(validated.run, validated.steps)
    }

    /// Sets the run id.
    #[must_use]
    pub fn with_run_id(mut self, run_id: Uuid) -> Self {
        self.run_id = run_id;
        self
    }

    /// Returns the run settings.
    #[must_use]
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Returns the number of steps.
    #[must_use]
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Executes every step and returns one result per step, in order.
    pub async fn run<D>(&self, document: &mut D) -> RunResult
    where
        D: CadDocument + ?Sized,
    {
        let span = info_span!("run", run_id = %self.run_id);
        self.run_steps(document).instrument(span).await
    }

    async fn run_steps<D>(&self, document: &mut D) -> RunResult
    where
        D: CadDocument + ?Sized,
    {
        let timer = StepTimer::start();
        let mut result = RunResult::new(self.run_id);
        let mut failures = FailureCollector::new(self.config.on_failure);

        if self.steps.is_empty() {
            warn!("No outputs found in configuration, nothing to do");
        }

        info!(
            steps = self.steps.len(),
            output_dir = %self.config.output_root().display(),
            policy = %self.config.on_failure,
            "Starting run"
        );

        for step in &self.steps {
            if failures.should_stop() {
                let skipped = StepTimer::start();
                debug!(step = %step.name, "Skipping step after earlier failure");
                result.push(StepResult::skipped(
                    step,
                    SKIPPED_AFTER_FAILURE,
                    skipped.started_at(),
                    skipped.elapsed(),
                ));
                continue;
            }

            let step_result = self.run_step(step, document).await;
            if step_result.is_failure() {
                failures.record_failure(&step.name);
            }
            result.push(step_result);
        }

        result.elapsed = timer.elapsed();
        if !failures.failed_steps().is_empty() {
            warn!(failed = ?failures.failed_steps(), "Some outputs failed");
        }
        info!(
            succeeded = result.count(StepStatus::Success),
            skipped = result.count(StepStatus::Skipped),
            failed = result.count(StepStatus::Failed),
            duration_ms = timer.elapsed_ms(),
            "Run complete"
        );
        result
    }

    async fn run_step<D>(&self, step: &OutputStep, document: &mut D) -> StepResult
    where
        D: CadDocument + ?Sized,
    {
        match &step.comment {
            Some(comment) => info!(step = %step.name, kind = %step.kind, "Running {} ({comment})", step.name),
            None => info!(step = %step.name, kind = %step.kind, "Running {}", step.name),
        }

        let timer = StepTimer::start();
        match self.execute_step(step, document).await {
            Ok(StepOutcome::Written(message)) => {
                info!(step = %step.name, duration_ms = timer.elapsed_ms(), "Completed");
                StepResult::success(step, message, timer.started_at(), timer.elapsed())
            }
            Ok(StepOutcome::Nothing(reason)) => {
                warn!(step = %step.name, "{reason}");
                StepResult::skipped(step, reason, timer.started_at(), timer.elapsed())
            }
            Err(e) => {
                error!(step = %step.name, category = %e.category(), error = %e, "Step failed");
                StepResult::failed(step, &e, timer.started_at(), timer.elapsed())
            }
        }
    }

    async fn execute_step<D>(&self, step: &OutputStep, document: &mut D) -> Result<StepOutcome, StepError>
    where
        D: CadDocument + ?Sized,
    {
        let objects = resolve_objects(&step.objects, step.kind, document).await?;
        if objects.is_empty() {
            return Ok(StepOutcome::Nothing(
                "No items were collected for processing".to_string(),
            ));
        }

        let camera = match step.kind {
            OutputKind::Screenshot => {
                let spec = step.camera.as_ref().ok_or(CameraError::MissingCamera)?;
                Some(resolve_camera(spec)?)
            }
            OutputKind::Step | OutputKind::Stl | OutputKind::Pdf => None,
        };

        let target = self.config.output_path(&step.filename);
        prepare_output(&target, &step.name).await?;

        info!(
            step = %step.name,
            objects = objects.len(),
            target = %target.display(),
            "Exporting {} items as {}",
            objects.len(),
            step.kind
        );

        match (step.kind, camera) {
            (OutputKind::Step, _) => document.export_step(&objects, &target).await?,
            (OutputKind::Stl, _) => {
                let object = objects.first().ok_or(ResolutionError::EmptySelection)?;
                document.export_mesh(object, &target).await?;
            }
            (OutputKind::Pdf, _) => document.export_pdf(&objects, &target).await?,
            (OutputKind::Screenshot, Some(camera)) => {
                document.render_screenshot(&objects, &camera, &target).await?;
            }
            (OutputKind::Screenshot, None) => return Err(CameraError::MissingCamera.into()),
        }

        Ok(StepOutcome::Written(format!("wrote {}", target.display())))
    }
}
