//! FreeCAD-backed document.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info};

use super::scripts::{self, REQUEST_ENV, RESULT_FILE};
use super::{CadDocument, DocumentIndex, ObjectRef};
use crate::camera::CameraTransform;
use crate::config::RunConfig;
use crate::errors::{DocumentError, ExportError, ResolutionError};

/// Failure to run a script in the FreeCAD process.
#[derive(Debug, Error)]
enum ScriptError {
    #[error("failed to start '{command}': {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },

    #[error("no result reported by FreeCAD ({status}){}", stderr_tail(.stderr))]
    NoResult { status: String, stderr: String },

    #[error("malformed result: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("{0}")]
    Failed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn stderr_tail(stderr: &str) -> String {
    stderr
        .lines()
        .rev()
        .find(|line| !line.trim().is_empty())
        .map(|line| format!(": {}", line.trim()))
        .unwrap_or_default()
}

#[derive(Debug, Deserialize)]
struct ScriptReply {
    ok: bool,
    #[serde(default)]
    data: Value,
    #[serde(default)]
    error: Option<String>,
}

/// Reads the answer a script left in `path`, if any.
async fn read_reply(path: &Path) -> Result<Option<ScriptReply>, ScriptError> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// A project file opened through the FreeCAD executable.
///
/// The object listing is loaded once on open. Each export runs a generated
/// script in a fresh FreeCAD process, writes into a scratch directory and
/// copies the result into place.
#[derive(Debug)]
pub struct FreeCadDocument {
    path: PathBuf,
    command: String,
    args: Vec<String>,
    paths: Vec<String>,
    index: DocumentIndex,
}

impl FreeCadDocument {
    /// Opens a project file and loads its object listing.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::NotFound`] if the file does not exist and
    /// [`DocumentError::Engine`] if FreeCAD cannot list its objects.
    pub async fn open(path: &Path, config: &RunConfig) -> Result<Self, DocumentError> {
        match tokio::fs::metadata(path).await {
            Ok(meta) if meta.is_file() => {}
            Ok(_) => return Err(DocumentError::NotFound(path.to_path_buf())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(DocumentError::NotFound(path.to_path_buf()))
            }
            Err(e) => return Err(e.into()),
        }

        let mut document = Self {
            path: tokio::fs::canonicalize(path).await?,
            command: config.freecad_cmd.clone(),
            args: config.freecad_args.clone(),
            paths: config.paths.clone(),
            index: DocumentIndex::default(),
        };

        info!(path = %document.path.display(), command = %document.command, "Opening document");
        let listing = document
            .run_script(scripts::LIST_OBJECTS, json!({}))
            .await
            .map_err(|e| DocumentError::Engine(e.to_string()))?;
        document.index =
            serde_json::from_value(listing).map_err(|e| DocumentError::Engine(e.to_string()))?;

        debug!(objects = document.index.len(), "Loaded document listing");
        Ok(document)
    }

    /// Returns the absolute path of the project file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the object listing.
    #[must_use]
    pub fn index(&self) -> &DocumentIndex {
        &self.index
    }

    async fn run_script(&self, body: &str, mut request: Value) -> Result<Value, ScriptError> {
        let scratch = tempfile::tempdir()?;
        let script_path = scratch.path().join("fcbot_script.py");
        let request_path = scratch.path().join("request.json");
        let result_path = scratch.path().join(RESULT_FILE);

        if let Value::Object(map) = &mut request {
            map.insert("document".to_string(), json!(self.path));
            map.insert("paths".to_string(), json!(self.paths));
        }

        tokio::fs::write(&script_path, scripts::compose(body)).await?;
        tokio::fs::write(&request_path, serde_json::to_vec(&request)?).await?;

        debug!(
            command = %self.command,
            args = ?self.args,
            script = %script_path.display(),
            "Starting FreeCAD"
        );

        let output = Command::new(&self.command)
            .args(&self.args)
            .arg(&script_path)
            .env(REQUEST_ENV, &request_path)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| ScriptError::Spawn {
                command: self.command.clone(),
                source,
            })?;

        for line in String::from_utf8_lossy(&output.stdout).lines() {
            debug!(target: "fcbot::freecad", "{line}");
        }

        let reply = read_reply(&result_path)
            .await?
            .ok_or_else(|| ScriptError::NoResult {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            })?;

        if reply.ok {
            Ok(reply.data)
        } else {
            Err(ScriptError::Failed(
                reply.error.unwrap_or_else(|| "unknown engine error".to_string()),
            ))
        }
    }

    /// Runs an export script into a scratch file, then copies it to `target`.
    async fn export(
        &self,
        body: &str,
        objects: &[&ObjectRef],
        extra: Value,
        target: &Path,
    ) -> Result<(), ExportError> {
        let scratch = tempfile::tempdir()?;
        let extension = target.extension().and_then(|e| e.to_str()).unwrap_or("out");
        let export_path = scratch.path().join(format!("export.{extension}"));
        debug!(dir = %scratch.path().display(), "Using temporary export directory");

        let mut request = json!({
            "objects": objects.iter().map(|o| o.name.as_str()).collect::<Vec<_>>(),
            "target": export_path,
        });
        if let (Value::Object(map), Value::Object(extra)) = (&mut request, extra) {
            map.extend(extra);
        }

        self.run_script(body, request)
            .await
            .map_err(|e| ExportError::Engine(e.to_string()))?;

        if !tokio::fs::metadata(&export_path).await.is_ok_and(|m| m.is_file()) {
            return Err(ExportError::MissingOutput(export_path));
        }

        debug!(from = %export_path.display(), to = %target.display(), "Copying export into place");
        tokio::fs::copy(&export_path, target).await?;
        Ok(())
    }
}

#[async_trait]
impl CadDocument for FreeCadDocument {
    async fn objects_by_label(&mut self, label: &str) -> Result<Vec<ObjectRef>, ResolutionError> {
        Ok(self.index.objects_by_label(label))
    }

    async fn solid_shapes(&mut self) -> Result<Vec<ObjectRef>, ResolutionError> {
        Ok(self.index.solid_shapes())
    }

    async fn drawing_pages(&mut self) -> Result<Vec<ObjectRef>, ResolutionError> {
        Ok(self.index.drawing_pages())
    }

    async fn export_step(&mut self, objects: &[ObjectRef], target: &Path) -> Result<(), ExportError> {
        let objects: Vec<&ObjectRef> = objects.iter().collect();
        self.export(scripts::EXPORT_STEP, &objects, json!({}), target).await
    }

    async fn export_mesh(&mut self, object: &ObjectRef, target: &Path) -> Result<(), ExportError> {
        self.export(scripts::EXPORT_STL, &[object], json!({}), target).await
    }

    async fn export_pdf(&mut self, pages: &[ObjectRef], target: &Path) -> Result<(), ExportError> {
        let pages: Vec<&ObjectRef> = pages.iter().collect();
        self.export(scripts::EXPORT_PDF, &pages, json!({}), target).await
    }

    async fn render_screenshot(
        &mut self,
        objects: &[ObjectRef],
        camera: &CameraTransform,
        target: &Path,
    ) -> Result<(), ExportError> {
        let shapes: Vec<String> = self.index.solid_shapes().into_iter().map(|s| s.name).collect();
        let extra = json!({
            "shapes": shapes,
            "camera": {
                "projection": camera.projection.to_string(),
                "orientation": camera.quaternion_xyzw(),
                "position": camera.position.map(|p| [p.x, p.y, p.z]),
                "width": camera.width,
                "height": camera.height,
                "background": camera.background.to_string(),
            },
        });

        let objects: Vec<&ObjectRef> = objects.iter().collect();
        self.export(scripts::SCREENSHOT, &objects, extra, target).await
    }
}
