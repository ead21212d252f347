//! Configuration file loading.

use serde_json::Value;
use std::path::Path;
use tracing::debug;

use super::validate::{validate, ValidatedConfig};
use crate::errors::{ConfigError, ConfigErrorKind};

/// Parses YAML text into a generic document tree.
///
/// # Errors
///
/// Returns [`ConfigErrorKind::Syntax`] when the text is not valid YAML or
/// uses non-string mapping keys.
pub fn parse_document(text: &str) -> Result<Value, ConfigError> {
    serde_yaml::from_str::<Value>(text)
        .map_err(|e| ConfigError::new("<root>", ConfigErrorKind::Syntax(e.to_string())))
}

/// Parses and validates YAML configuration text.
///
/// # Errors
///
/// Returns a [`ConfigError`] on syntax or validation failure.
pub fn parse_config(text: &str) -> Result<ValidatedConfig, ConfigError> {
    validate(&parse_document(text)?)
}

/// Reads, parses and validates a configuration file.
///
/// # Errors
///
/// Returns [`ConfigErrorKind::Unreadable`] if the file cannot be read, or
/// any syntax or validation error.
pub fn load_config(path: &Path) -> Result<ValidatedConfig, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        ConfigError::new(
            path.display().to_string(),
            ConfigErrorKind::Unreadable(e.to_string()),
        )
    })?;

    debug!(path = %path.display(), bytes = text.len(), "Loaded configuration file");
    parse_config(&text)
}
