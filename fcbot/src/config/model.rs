//! Typed configuration model.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::level_filters::LevelFilter;

use crate::camera::CameraSpec;

/// Log severity accepted by `fcbot.log_level`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    /// Debug messages and above.
    Debug,
    /// Informational messages and above (default).
    #[default]
    Info,
    /// Warnings and above.
    Warning,
    /// Errors and above.
    Error,
    /// Critical errors only.
    Critical,
}

impl LogLevel {
    /// Returns the matching `tracing` filter.
    ///
    /// `tracing` has no level above ERROR, so `Critical` maps to ERROR.
    #[must_use]
    pub fn as_filter(self) -> LevelFilter {
        match self {
            Self::Debug => LevelFilter::DEBUG,
            Self::Info => LevelFilter::INFO,
            Self::Warning => LevelFilter::WARN,
            Self::Error | Self::Critical => LevelFilter::ERROR,
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "DEBUG" => Ok(Self::Debug),
            "INFO" => Ok(Self::Info),
            "WARNING" => Ok(Self::Warning),
            "ERROR" => Ok(Self::Error),
            "CRITICAL" => Ok(Self::Critical),
            _ => Err(s.to_string()),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Debug => write!(f, "DEBUG"),
            Self::Info => write!(f, "INFO"),
            Self::Warning => write!(f, "WARNING"),
            Self::Error => write!(f, "ERROR"),
            Self::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// What the runner does after a step fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Run every step and report all failures at the end (default).
    #[default]
    Continue,
    /// Stop after the first failed step; remaining steps are skipped.
    Abort,
}

impl FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "continue" => Ok(Self::Continue),
            "abort" => Ok(Self::Abort),
            _ => Err(s.to_string()),
        }
    }
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Continue => write!(f, "continue"),
            Self::Abort => write!(f, "abort"),
        }
    }
}

/// Process-wide settings from the `fcbot` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Configuration schema version.
    pub version: u32,
    /// Log verbosity.
    pub log_level: LogLevel,
    /// Output directory; `None` means the invocation working directory.
    pub output_dir: Option<PathBuf>,
    /// FreeCAD executable.
    pub freecad_cmd: String,
    /// Extra arguments passed to the FreeCAD executable.
    pub freecad_args: Vec<String>,
    /// Extra Python import paths for the FreeCAD process.
    pub paths: Vec<String>,
    /// Step failure policy.
    pub on_failure: FailurePolicy,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            version: 1,
            log_level: LogLevel::default(),
            output_dir: None,
            freecad_cmd: "freecad".to_string(),
            freecad_args: Vec::new(),
            paths: Vec::new(),
            on_failure: FailurePolicy::default(),
        }
    }
}

impl RunConfig {
    /// Uses `dir` as the output directory unless the configuration set one.
    #[must_use]
    pub fn with_fallback_output_dir(mut self, dir: Option<PathBuf>) -> Self {
        if self.output_dir.is_none() {
            self.output_dir = dir;
        }
        self
    }

    /// Sets the failure policy.
    #[must_use]
    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.on_failure = policy;
        self
    }

    /// Returns the directory output filenames are relative to.
    #[must_use]
    pub fn output_root(&self) -> &Path {
        self.output_dir.as_deref().unwrap_or_else(|| Path::new("."))
    }

    /// Joins a step filename against the output directory.
    #[must_use]
    pub fn output_path(&self, filename: &Path) -> PathBuf {
        self.output_root().join(filename)
    }
}

/// The kind of output a step produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputKind {
    /// STEP export of solid objects.
    Step,
    /// STL mesh export of a single solid.
    Stl,
    /// PDF export of drawing pages, merged into one file.
    Pdf,
    /// Rendered image of the 3D view.
    Screenshot,
}

impl OutputKind {
    /// Returns true if the selector may be used with this output type.
    #[must_use]
    pub fn supports(self, selector: &ObjectSelector) -> bool {
        match selector {
            ObjectSelector::ByLabel(_) => true,
            ObjectSelector::AllShapes => self == Self::Stl,
            ObjectSelector::AllPages => self == Self::Pdf,
        }
    }

    /// Returns true if an empty selection is an error for this type.
    ///
    /// A PDF step over a document without pages is skipped instead.
    #[must_use]
    pub fn requires_objects(self) -> bool {
        !matches!(self, Self::Pdf)
    }

    /// Returns true if the exporter accepts a single object only.
    #[must_use]
    pub fn single_object(self) -> bool {
        self == Self::Stl
    }
}

impl FromStr for OutputKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "step" => Ok(Self::Step),
            "stl" => Ok(Self::Stl),
            "pdf" => Ok(Self::Pdf),
            "screenshot" => Ok(Self::Screenshot),
            _ => Err(s.to_string()),
        }
    }
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Step => write!(f, "step"),
            Self::Stl => write!(f, "stl"),
            Self::Pdf => write!(f, "pdf"),
            Self::Screenshot => write!(f, "screenshot"),
        }
    }
}

/// Which document objects a step acts on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectSelector {
    /// Explicit, ordered, non-empty list of object labels.
    ByLabel(Vec<String>),
    /// Every solid body in the document.
    AllShapes,
    /// Every drawing page in the document.
    AllPages,
}

impl fmt::Display for ObjectSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ByLabel(labels) => write!(f, "[{}]", labels.join(", ")),
            Self::AllShapes => write!(f, "shapes: all"),
            Self::AllPages => write!(f, "pages: all"),
        }
    }
}

/// One unit of work from the `outputs` list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputStep {
    /// Position in the `outputs` list.
    pub index: usize,
    /// Display name, `outputs[i]` when not configured.
    pub name: String,
    /// Optional comment logged before the step runs.
    pub comment: Option<String>,
    /// Output type.
    pub kind: OutputKind,
    /// Output filename relative to the output directory.
    pub filename: PathBuf,
    /// Objects the step acts on.
    pub objects: ObjectSelector,
    /// Type-specific options, as configured.
    pub options: serde_json::Map<String, serde_json::Value>,
    /// Camera for screenshot steps.
    pub camera: Option<CameraSpec>,
}
