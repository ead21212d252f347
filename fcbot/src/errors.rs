//! Error types for fcbot.
//!
//! The taxonomy separates fatal errors (configuration, opening the project
//! file) from step-scoped errors (resolution, camera, export). Step-scoped
//! errors only ever fail the step that raised them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for fcbot operations.
#[derive(Debug, Error)]
pub enum FcbotError {
    /// The configuration was malformed or contradictory.
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// The project file could not be opened.
    #[error("{0}")]
    Document(#[from] DocumentError),
}

/// Error raised when the configuration is rejected.
///
/// `path` is the key path of the offending entry, e.g.
/// `outputs[2].options.view`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{path}: {kind}")]
pub struct ConfigError {
    /// Key path of the offending entry.
    pub path: String,
    /// What went wrong.
    pub kind: ConfigErrorKind,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[must_use]
    pub fn new(path: impl Into<String>, kind: ConfigErrorKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }
}

/// Categories of configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigErrorKind {
    /// `fcbot.version` is not 1.
    #[error("configuration version {0} is not supported")]
    UnsupportedVersion(String),

    /// `fcbot.log_level` is not a recognized severity.
    #[error("invalid log level '{0}'")]
    InvalidLogLevel(String),

    /// A step `type` is not one of the supported output types.
    #[error("output type '{0}' is not supported")]
    UnknownOutputType(String),

    /// The `objects` value is not a valid selector for the step.
    #[error("invalid object selector: {0}")]
    InvalidObjectSelector(String),

    /// A custom camera view is missing some of its keys.
    #[error("incomplete camera view, missing {}", .missing.join(", "))]
    IncompleteCameraSpec {
        /// The keys that were not provided.
        missing: Vec<String>,
    },

    /// The output filename is empty or escapes the output directory.
    #[error("invalid output filename '{0}'")]
    InvalidFilename(String),

    /// A required key is missing.
    #[error("missing required key")]
    MissingKey,

    /// A value has the wrong type.
    #[error("expected {expected}")]
    InvalidType {
        /// Description of the expected value.
        expected: &'static str,
    },

    /// A value has the right type but is not acceptable.
    #[error("invalid value: {0}")]
    InvalidValue(String),

    /// The configuration file could not be read.
    #[error("cannot read configuration file: {0}")]
    Unreadable(String),

    /// The configuration file is not valid YAML.
    #[error("configuration syntax error: {0}")]
    Syntax(String),
}

/// Errors raised while resolving a step's object selector.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    /// No document object carries the label.
    #[error("no object found with label '{0}'")]
    ObjectNotFound(String),

    /// More than one document object carries the label.
    #[error("multiple objects found with label '{0}'")]
    AmbiguousLabel(String),

    /// The selection is empty but the output type needs at least one object.
    #[error("selection is empty")]
    EmptySelection,

    /// The output type accepts a single object only.
    #[error("only one object may be exported at a time, selection has {count}")]
    TooManyObjects {
        /// Number of resolved objects.
        count: usize,
    },

    /// The object cannot be exported by the step's output type.
    #[error("object '{label}' cannot be exported as {kind}")]
    UnsupportedObject {
        /// Label of the rejected object.
        label: String,
        /// The output type.
        kind: String,
    },

    /// The document could not be queried.
    #[error("document query failed: {0}")]
    Query(String),
}

/// Errors raised while resolving camera settings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CameraError {
    /// Width or height is not positive.
    #[error("invalid screenshot resolution {width}x{height}")]
    InvalidResolution {
        /// Requested width.
        width: i64,
        /// Requested height.
        height: i64,
    },

    /// A screenshot step carries no camera settings.
    #[error("screenshot step has no camera settings")]
    MissingCamera,
}

/// Errors reported by an exporter.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The output path cannot be written.
    #[error("output path {} is not writable: {reason}", .path.display())]
    NotWritable {
        /// The target path.
        path: PathBuf,
        /// Why the path was rejected.
        reason: String,
    },

    /// The engine ran but did not produce the expected file.
    #[error("engine did not generate export file {}", .0.display())]
    MissingOutput(PathBuf),

    /// The engine reported a failure.
    #[error("engine error: {0}")]
    Engine(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised when opening a project file.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// The project file does not exist.
    #[error("project file {} not found", .0.display())]
    NotFound(PathBuf),

    /// The engine could not load the document.
    #[error("engine error: {0}")]
    Engine(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Any error that fails a single step.
#[derive(Debug, Error)]
pub enum StepError {
    /// Object resolution failed.
    #[error("{0}")]
    Resolution(#[from] ResolutionError),

    /// Camera resolution failed.
    #[error("{0}")]
    Camera(#[from] CameraError),

    /// The exporter failed.
    #[error("{0}")]
    Export(#[from] ExportError),
}

impl StepError {
    /// Returns the category of this error.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Resolution(_) => ErrorCategory::Resolution,
            Self::Camera(_) => ErrorCategory::Camera,
            Self::Export(_) => ErrorCategory::Export,
        }
    }
}

/// Category of a step-scoped error, recorded on failed results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Object lookup failed.
    Resolution,
    /// Camera settings rejected.
    Camera,
    /// Exporter failed.
    Export,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resolution => write!(f, "resolution"),
            Self::Camera => write!(f, "camera"),
            Self::Export => write!(f, "export"),
        }
    }
}
