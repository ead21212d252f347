//! # fcbot
//!
//! Generates manufacturing and documentation outputs from a FreeCAD
//! project file, driven by a declarative YAML configuration.
//!
//! A run has three phases:
//!
//! - **Validation**: the configuration is parsed into a [`RunConfig`](config::RunConfig)
//!   and an ordered list of [`OutputStep`](config::OutputStep)s. Any problem
//!   rejects the whole file before the CAD engine is touched.
//! - **Execution**: each step resolves its objects against the open
//!   document, resolves a camera for screenshots and calls the exporter.
//! - **Reporting**: every step yields exactly one
//!   [`StepResult`](core::StepResult); the [`RunResult`](core::RunResult)
//!   decides the process exit code.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use fcbot::prelude::*;
//!
//! let config = load_config(Path::new("fcbot.yaml"))?;
//! let mut document = FreeCadDocument::open(Path::new("part.FCStd"), &config.run).await?;
//! let result = Pipeline::from_config(config).run(&mut document).await;
//! println!("{}", result.summary());
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod camera;
pub mod config;
pub mod core;
pub mod document;
pub mod errors;
pub mod observability;
pub mod pipeline;
pub mod resolver;
pub mod testing;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::camera::{
        resolve_camera, Background, CameraSpec, CameraTransform, NamedView, Orientation,
        Projection, ViewSpec,
    };
    pub use crate::config::{
        load_config, parse_config, FailurePolicy, LogLevel, ObjectSelector, OutputKind,
        OutputStep, RunConfig, ValidatedConfig,
    };
    pub use crate::core::{RunResult, StepResult, StepStatus};
    pub use crate::document::{CadDocument, DocumentIndex, FreeCadDocument, ObjectRef};
    pub use crate::errors::{
        CameraError, ConfigError, DocumentError, ExportError, FcbotError, ResolutionError,
        StepError,
    };
    pub use crate::pipeline::Pipeline;
    pub use crate::resolver::resolve_objects;
}
