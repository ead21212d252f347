//! Configuration validation.
//!
//! Turns a generic parsed document into a [`RunConfig`] and the ordered list
//! of [`OutputStep`]s. Validation is pure: it never touches the filesystem
//! or the CAD engine.

use serde_json::{Map, Value};
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};
use tracing::warn;

use super::model::{FailurePolicy, LogLevel, ObjectSelector, OutputKind, OutputStep, RunConfig};
use crate::camera::{Background, CameraSpec, NamedView, Orientation, Projection, ViewSpec};
use crate::errors::{ConfigError, ConfigErrorKind};
use nalgebra::Point3;

/// The only supported configuration schema version.
pub const CONFIG_VERSION: i64 = 1;

const POSITION_KEYS: [&str; 3] = ["x", "y", "z"];
const ORIENTATION_KEYS: [&str; 3] = ["yaw", "pitch", "roll"];

/// A validated configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedConfig {
    /// Process-wide settings.
    pub run: RunConfig,
    /// Output steps in execution order.
    pub steps: Vec<OutputStep>,
}

/// Validates a parsed configuration document.
///
/// # Errors
///
/// Returns a [`ConfigError`] naming the key path of the first offending
/// entry.
pub fn validate(doc: &Value) -> Result<ValidatedConfig, ConfigError> {
    let root = as_map(doc, "<root>")?;

    let run = match root.get("fcbot") {
        None | Some(Value::Null) => {
            warn!("Missing \"fcbot\" key in configuration file, assuming configuration version 1");
            RunConfig::default()
        }
        Some(meta) => validate_meta(meta)?,
    };

    let outputs = match root.get("outputs") {
        Some(Value::Array(items)) => items,
        Some(_) => {
            return Err(ConfigError::new(
                "outputs",
                ConfigErrorKind::InvalidType { expected: "a sequence of output steps" },
            ))
        }
        None => return Err(ConfigError::new("outputs", ConfigErrorKind::MissingKey)),
    };

    let steps = outputs
        .iter()
        .enumerate()
        .map(|(index, item)| validate_step(index, item))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ValidatedConfig { run, steps })
}

/// Any number equal to [`CONFIG_VERSION`] passes, so `1.0` is accepted.
/// Strings never do.
#[allow(clippy::cast_precision_loss, clippy::float_cmp)]
fn is_supported_version(version: &Value) -> bool {
    version.as_f64() == Some(CONFIG_VERSION as f64)
}

fn validate_meta(meta: &Value) -> Result<RunConfig, ConfigError> {
    let map = as_map(meta, "fcbot")?;
    let mut config = RunConfig::default();

    match map.get("version") {
        None => warn!("Missing \"fcbot.version\" key in configuration file, assuming version 1"),
        Some(version) if is_supported_version(version) => {}
        Some(version) => {
            return Err(ConfigError::new(
                "fcbot.version",
                ConfigErrorKind::UnsupportedVersion(version.to_string()),
            ))
        }
    }

    for (key, value) in map {
        let path = format!("fcbot.{key}");
        match key.as_str() {
            "version" => {}
            "log_level" => {
                let level = as_str(value, &path)?;
                config.log_level = level.parse::<LogLevel>().map_err(|bad| {
                    ConfigError::new(&path, ConfigErrorKind::InvalidLogLevel(bad))
                })?;
            }
            "output_dir" => config.output_dir = Some(PathBuf::from(as_str(value, &path)?)),
            "freecad_cmd" => config.freecad_cmd = as_str(value, &path)?.to_string(),
            "freecad_args" => config.freecad_args = string_list(value, &path)?,
            "paths" => config.paths = string_list(value, &path)?,
            "on_failure" => {
                let policy = as_str(value, &path)?;
                config.on_failure = policy.parse::<FailurePolicy>().map_err(|bad| {
                    ConfigError::new(
                        &path,
                        ConfigErrorKind::InvalidValue(format!(
                            "'{bad}' is not a failure policy, expected 'continue' or 'abort'"
                        )),
                    )
                })?;
            }
            _ => warn!(key = %path, "Ignoring unknown configuration key"),
        }
    }

    Ok(config)
}

fn validate_step(index: usize, item: &Value) -> Result<OutputStep, ConfigError> {
    let base = format!("outputs[{index}]");
    let map = as_map(item, &base)?;
    let key = |k: &str| format!("{base}.{k}");

    let type_name = as_str(required(map, "type", &base)?, &key("type"))?;
    let kind = type_name
        .parse::<OutputKind>()
        .map_err(|bad| ConfigError::new(key("type"), ConfigErrorKind::UnknownOutputType(bad)))?;

    let filename = validate_filename(
        as_str(required(map, "filename", &base)?, &key("filename"))?,
        &key("filename"),
    )?;

    let name = match map.get("name") {
        None | Some(Value::Null) => base.clone(),
        Some(value) => as_str(value, &key("name"))?.to_string(),
    };

    let comment = match map.get("comment") {
        None | Some(Value::Null) => None,
        Some(value) => Some(as_str(value, &key("comment"))?.to_string()),
    };

    let objects = validate_selector(required(map, "objects", &base)?, &key("objects"), &name)?;
    if !kind.supports(&objects) {
        return Err(ConfigError::new(
            key("objects"),
            ConfigErrorKind::InvalidObjectSelector(format!(
                "'{objects}' is not supported by {kind} outputs"
            )),
        ));
    }

    let options = match map.get("options") {
        None | Some(Value::Null) => Map::new(),
        Some(value) => as_map(value, &key("options"))?.clone(),
    };

    let camera = if kind == OutputKind::Screenshot {
        Some(validate_camera(&options, &key("options"))?)
    } else {
        None
    };

    Ok(OutputStep {
        index,
        name,
        comment,
        kind,
        filename,
        objects,
        options,
        camera,
    })
}

/// Checks that a filename stays inside the output directory.
fn validate_filename(filename: &str, path: &str) -> Result<PathBuf, ConfigError> {
    let invalid = || ConfigError::new(path, ConfigErrorKind::InvalidFilename(filename.to_string()));
    let candidate = Path::new(filename);

    if filename.trim().is_empty() || candidate.is_absolute() || candidate.has_root() {
        return Err(invalid());
    }

    let mut has_name = false;
    for component in candidate.components() {
        match component {
            Component::Normal(_) => has_name = true,
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(invalid())
            }
        }
    }

    if has_name {
        Ok(candidate.to_path_buf())
    } else {
        Err(invalid())
    }
}

fn validate_selector(value: &Value, path: &str, step: &str) -> Result<ObjectSelector, ConfigError> {
    let invalid =
        |reason: String| ConfigError::new(path, ConfigErrorKind::InvalidObjectSelector(reason));

    match value {
        Value::Array(items) => {
            if items.is_empty() {
                return Err(invalid("label list is empty".to_string()));
            }

            let mut seen = HashSet::new();
            let mut labels = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                let label = as_str(item, &format!("{path}[{i}]"))?;
                if !seen.insert(label) {
                    warn!(step = %step, label = %label, "Duplicate label included for export");
                }
                labels.push(label.to_string());
            }
            Ok(ObjectSelector::ByLabel(labels))
        }
        Value::Object(map) => {
            let mut entries = map.iter();
            let (Some((key, sentinel)), None) = (entries.next(), entries.next()) else {
                return Err(invalid("expected a single 'shapes' or 'pages' key".to_string()));
            };

            let selector = match key.as_str() {
                "shapes" => ObjectSelector::AllShapes,
                "pages" => ObjectSelector::AllPages,
                other => return Err(invalid(format!("unrecognized key '{other}'"))),
            };

            if sentinel.as_str() == Some("all") {
                Ok(selector)
            } else {
                Err(invalid(format!("'{key}' must be 'all', got {sentinel}")))
            }
        }
        _ => Err(invalid(
            "expected a list of labels, 'shapes: all' or 'pages: all'".to_string(),
        )),
    }
}

fn validate_camera(options: &Map<String, Value>, path: &str) -> Result<CameraSpec, ConfigError> {
    let key = |k: &str| format!("{path}.{k}");

    let projection = match options.get("camera") {
        None | Some(Value::Null) => Projection::default(),
        Some(value) => as_str(value, &key("camera"))?.parse::<Projection>().map_err(|bad| {
            ConfigError::new(
                key("camera"),
                ConfigErrorKind::InvalidValue(format!(
                    "'{bad}' is not a camera type, expected 'orthographic' or 'perspective'"
                )),
            )
        })?,
    };

    let view = match required(options, "view", path)? {
        Value::String(name) => ViewSpec::Named(name.parse::<NamedView>().map_err(|bad| {
            ConfigError::new(
                key("view"),
                ConfigErrorKind::InvalidValue(format!("'{bad}' is not a named view")),
            )
        })?),
        Value::Object(view) => validate_explicit_view(view, &key("view"))?,
        _ => {
            return Err(ConfigError::new(
                key("view"),
                ConfigErrorKind::InvalidType {
                    expected: "a named view or a mapping with x, y, z, yaw, pitch, roll",
                },
            ))
        }
    };

    let resolution = validate_resolution(required(options, "resolution", path)?, &key("resolution"))?;

    let background = match options.get("background") {
        None | Some(Value::Null) => Background::default(),
        Some(value) => as_str(value, &key("background"))?.parse::<Background>().map_err(|bad| {
            ConfigError::new(
                key("background"),
                ConfigErrorKind::InvalidValue(format!("'{bad}' is not a colour")),
            )
        })?,
    };

    Ok(CameraSpec {
        view,
        projection,
        resolution,
        background,
    })
}

fn validate_explicit_view(view: &Map<String, Value>, path: &str) -> Result<ViewSpec, ConfigError> {
    let missing: Vec<String> = POSITION_KEYS
        .iter()
        .chain(ORIENTATION_KEYS.iter())
        .filter(|k| !view.contains_key(**k))
        .map(|k| (*k).to_string())
        .collect();
    if !missing.is_empty() {
        return Err(ConfigError::new(
            path,
            ConfigErrorKind::IncompleteCameraSpec { missing },
        ));
    }

    let number = |k: &str| -> Result<f64, ConfigError> {
        view.get(k).and_then(Value::as_f64).ok_or_else(|| {
            ConfigError::new(
                format!("{path}.{k}"),
                ConfigErrorKind::InvalidType { expected: "a number" },
            )
        })
    };

    Ok(ViewSpec::Explicit {
        position: Point3::new(number("x")?, number("y")?, number("z")?),
        orientation: Orientation::new(number("yaw")?, number("pitch")?, number("roll")?),
    })
}

fn validate_resolution(value: &Value, path: &str) -> Result<(i64, i64), ConfigError> {
    let invalid = || {
        ConfigError::new(
            path,
            ConfigErrorKind::InvalidType { expected: "a [width, height] pair of integers" },
        )
    };

    match value.as_array().map(Vec::as_slice) {
        Some([width, height]) => match (width.as_i64(), height.as_i64()) {
            (Some(w), Some(h)) => Ok((w, h)),
            _ => Err(invalid()),
        },
        _ => Err(invalid()),
    }
}

fn required<'a>(map: &'a Map<String, Value>, key: &str, base: &str) -> Result<&'a Value, ConfigError> {
    map.get(key)
        .filter(|v| !v.is_null())
        .ok_or_else(|| ConfigError::new(format!("{base}.{key}"), ConfigErrorKind::MissingKey))
}

fn as_map<'a>(value: &'a Value, path: &str) -> Result<&'a Map<String, Value>, ConfigError> {
    value
        .as_object()
        .ok_or_else(|| ConfigError::new(path, ConfigErrorKind::InvalidType { expected: "a mapping" }))
}

fn as_str<'a>(value: &'a Value, path: &str) -> Result<&'a str, ConfigError> {
    value
        .as_str()
        .ok_or_else(|| ConfigError::new(path, ConfigErrorKind::InvalidType { expected: "a string" }))
}

fn string_list(value: &Value, path: &str) -> Result<Vec<String>, ConfigError> {
    let items = value.as_array().ok_or_else(|| {
        ConfigError::new(path, ConfigErrorKind::InvalidType { expected: "a sequence of strings" })
    })?;
    items
        .iter()
        .enumerate()
        .map(|(i, item)| as_str(item, &format!("{path}[{i}]")).map(ToString::to_string))
        .collect()
}
