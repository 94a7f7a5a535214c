use log::{debug, trace};
use serde_json::{Map, Value};
use std::{fs, path::Path};

use crate::{
    constants::MODULE_CONFIG_EXTENSIONS,
    error::{ConfigLoadError, LoadCause},
    module::evaluate_module,
};

/// A single config file's top-level mapping.
pub type RawConfig = Map<String, Value>;

/// Loads a config file into a plain value.
///
/// Executable modules (`.js`, `.ts`, ...) are parsed and their export is
/// evaluated; anything else is read as JSON that may carry comments and
/// trailing commas.
pub fn load(path: &Path) -> Result<Value, ConfigLoadError> {
    let src = fs::read_to_string(path).map_err(|e| ConfigLoadError::new(path, e))?;

    let value = if is_module_config(path) {
        trace!("Evaluating config module: {}", path.display());
        evaluate_module(path, &src).map_err(|cause| ConfigLoadError::new(path, cause))?
    } else {
        trace!("Parsing JSON config: {}", path.display());
        json5::from_str::<Value>(&src).map_err(|e| ConfigLoadError::new(path, e))?
    };

    debug!("Loaded config from {}", path.display());
    Ok(value)
}

/// Like [`load`] but insists on an object. A `null` export counts as an empty config.
pub fn load_object(path: &Path) -> Result<RawConfig, ConfigLoadError> {
    into_object(load(path)?).map_err(|cause| ConfigLoadError::new(path, cause))
}

fn into_object(value: Value) -> Result<RawConfig, LoadCause> {
    match value {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(RawConfig::new()),
        other => Err(LoadCause::NotAnObject(kind_of(&other))),
    }
}

fn is_module_config(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| MODULE_CONFIG_EXTENSIONS.contains(&ext))
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
