//! In-memory CAD document for testing.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::camera::CameraTransform;
use crate::document::{CadDocument, DocumentIndex, ObjectRef};
use crate::errors::{ExportError, ResolutionError};

/// Export operations of a [`CadDocument`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportOp {
    /// `export_step`.
    Step,
    /// `export_mesh`.
    Mesh,
    /// `export_pdf`.
    Pdf,
    /// `render_screenshot`.
    Screenshot,
}

impl fmt::Display for ExportOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Step => write!(f, "step"),
            Self::Mesh => write!(f, "mesh"),
            Self::Pdf => write!(f, "pdf"),
            Self::Screenshot => write!(f, "screenshot"),
        }
    }
}

/// One recorded export call.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportCall {
    /// Which operation was called.
    pub op: ExportOp,
    /// Internal names of the objects passed in.
    pub objects: Vec<String>,
    /// Requested output path.
    pub target: PathBuf,
    /// Camera of screenshot calls.
    pub camera: Option<CameraTransform>,
}

/// Shared log of export calls.
///
/// Cloning shares the log, so a test can keep a handle after moving the
/// document into the code under test.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<ExportCall>>>);

impl CallLog {
    /// Returns a copy of all recorded calls.
    #[must_use]
    pub fn calls(&self) -> Vec<ExportCall> {
        self.0.lock().clone()
    }

    /// Returns the number of recorded calls.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.lock().len()
    }

    /// Returns true if nothing was exported.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.lock().is_empty()
    }

    /// Returns the operations in call order.
    #[must_use]
    pub fn ops(&self) -> Vec<ExportOp> {
        self.0.lock().iter().map(|c| c.op).collect()
    }

    fn record(&self, call: ExportCall) {
        self.0.lock().push(call);
    }
}

/// A [`CadDocument`] backed by a [`DocumentIndex`].
///
/// Successful exports write a small placeholder file at the target path.
/// Individual operations can be told to fail.
#[derive(Debug, Default)]
pub struct StubDocument {
    index: DocumentIndex,
    log: CallLog,
    failures: HashMap<ExportOp, String>,
    query_failure: Option<String>,
}

impl StubDocument {
    /// Creates a stub over the given objects.
    #[must_use]
    pub fn new(index: DocumentIndex) -> Self {
        Self {
            index,
            ..Self::default()
        }
    }

    /// Makes every call of `op` fail with an engine error.
    #[must_use]
    pub fn with_failure(mut self, op: ExportOp, message: impl Into<String>) -> Self {
        self.failures.insert(op, message.into());
        self
    }

    /// Makes every object query fail.
    #[must_use]
    pub fn with_query_failure(mut self, message: impl Into<String>) -> Self {
        self.query_failure = Some(message.into());
        self
    }

    /// Returns a handle on the call log.
    #[must_use]
    pub fn log(&self) -> CallLog {
        self.log.clone()
    }

    fn query(&self) -> Result<&DocumentIndex, ResolutionError> {
        match &self.query_failure {
            Some(message) => Err(ResolutionError::Query(message.clone())),
            None => Ok(&self.index),
        }
    }

    async fn export(
        &self,
        op: ExportOp,
        objects: &[ObjectRef],
        camera: Option<&CameraTransform>,
        target: &Path,
    ) -> Result<(), ExportError> {
        self.log.record(ExportCall {
            op,
            objects: objects.iter().map(|o| o.name.clone()).collect(),
            target: target.to_path_buf(),
            camera: camera.cloned(),
        });

        if let Some(message) = self.failures.get(&op) {
            return Err(ExportError::Engine(message.clone()));
        }

        tokio::fs::write(target, format!("{op} export of {} objects\n", objects.len())).await?;
        Ok(())
    }
}

#[async_trait]
impl CadDocument for StubDocument {
    async fn objects_by_label(&mut self, label: &str) -> Result<Vec<ObjectRef>, ResolutionError> {
        Ok(self.query()?.objects_by_label(label))
    }

    async fn solid_shapes(&mut self) -> Result<Vec<ObjectRef>, ResolutionError> {
        Ok(self.query()?.solid_shapes())
    }

    async fn drawing_pages(&mut self) -> Result<Vec<ObjectRef>, ResolutionError> {
        Ok(self.query()?.drawing_pages())
    }

    async fn export_step(&mut self, objects: &[ObjectRef], target: &Path) -> Result<(), ExportError> {
        self.export(ExportOp::Step, objects, None, target).await
    }

    async fn export_mesh(&mut self, object: &ObjectRef, target: &Path) -> Result<(), ExportError> {
        self.export(ExportOp::Mesh, std::slice::from_ref(object), None, target)
            .await
    }

    async fn export_pdf(&mut self, pages: &[ObjectRef], target: &Path) -> Result<(), ExportError> {
        self.export(ExportOp::Pdf, pages, None, target).await
    }

    async fn render_screenshot(
        &mut self,
        objects: &[ObjectRef],
        camera: &CameraTransform,
        target: &Path,
    ) -> Result<(), ExportError> {
        self.export(ExportOp::Screenshot, objects, Some(camera), target)
            .await
    }
}
