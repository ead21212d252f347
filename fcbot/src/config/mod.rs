//! Configuration model, loading and validation.
//!
//! A configuration file has an optional `fcbot` section with process-wide
//! settings and a required `outputs` list of steps. Validation rejects the
//! whole file on the first problem, so no step ever runs against a
//! malformed configuration.

mod loader;
mod model;
mod validate;

pub use loader::{load_config, parse_config, parse_document};
pub use model::{FailurePolicy, LogLevel, ObjectSelector, OutputKind, OutputStep, RunConfig};
pub use validate::{validate, ValidatedConfig, CONFIG_VERSION};
