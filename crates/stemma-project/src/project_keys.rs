//! Runtime mutation of `dbt_project.yml`
//!
//! Applies a flat mapping of dot-notated keys to the project descriptor:
//! `"models.my_project.materialized" -> "table"` rewrites the nested
//! `models: my_project: materialized:` path, creating intermediate
//! mappings as needed. String values are coerced heuristically (booleans,
//! nulls, JSON collections, numbers) before being written back.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde_yaml::{Mapping, Value};
use tracing::{debug, info, warn};

use stemma_core::constants::PROJECT_FILE_NAME;

use crate::project::ProjectError;

/// Apply `project_keys` to the `dbt_project.yml` inside `project_dir`.
///
/// Fails with [`ProjectError::ProjectFileNotFound`] when the descriptor is
/// absent; YAML parse and write failures propagate as
/// [`ProjectError::Yaml`] / [`ProjectError::Io`].
pub fn apply_project_keys(
    project_dir: &Path,
    project_keys: &BTreeMap<String, String>,
) -> Result<(), ProjectError> {
    if project_keys.is_empty() {
        return Ok(());
    }

    let descriptor = project_dir.join(PROJECT_FILE_NAME);
    if !descriptor.exists() {
        return Err(ProjectError::ProjectFileNotFound(
            descriptor.display().to_string(),
        ));
    }

    info!(descriptor = %descriptor.display(), "applying project keys to dbt_project.yml");

    let contents = fs::read_to_string(&descriptor)
        .map_err(|e| ProjectError::Io(descriptor.display().to_string(), e.to_string()))?;
    let mut config: Value =
        serde_yaml::from_str(&contents).map_err(|e| ProjectError::Yaml(e.to_string()))?;

    // An empty descriptor parses as null; start from an empty document.
    if config.is_null() {
        config = Value::Mapping(Mapping::new());
    }

    for (key, value) in project_keys {
        set_nested_key(&mut config, key, value);
    }

    let rendered =
        serde_yaml::to_string(&config).map_err(|e| ProjectError::Yaml(e.to_string()))?;
    fs::write(&descriptor, rendered)
        .map_err(|e| ProjectError::Io(descriptor.display().to_string(), e.to_string()))?;

    Ok(())
}

/// Set a nested key using dot notation, creating intermediate mappings.
/// Any non-mapping value found along the path is replaced by a fresh
/// mapping, with a visible warning.
fn set_nested_key(config: &mut Value, dotted_key: &str, raw_value: &str) {
    if !config.is_mapping() {
        warn!(key = dotted_key, "project descriptor root is not a mapping; replacing it");
        *config = Value::Mapping(Mapping::new());
    }

    let mut current = config;
    let mut segments = dotted_key.split('.').peekable();
    while let Some(segment) = segments.next() {
        let mapping = match current.as_mapping_mut() {
            Some(mapping) => mapping,
            None => return,
        };
        let key = Value::String(segment.to_owned());

        if segments.peek().is_none() {
            let converted = convert_scalar(raw_value);
            debug!(key = dotted_key, value = raw_value, "setting project key");
            mapping.insert(key, converted);
            return;
        }

        let slot = mapping
            .entry(key)
            .or_insert_with(|| Value::Mapping(Mapping::new()));
        if !slot.is_mapping() {
            warn!(
                segment,
                key = dotted_key,
                "existing value is not a mapping; converting to hold the nested key"
            );
            *slot = Value::Mapping(Mapping::new());
        }
        current = slot;
    }
}

/// Convert a string value to the YAML type it most plausibly denotes.
///
/// Booleans and nulls match case-insensitively; strings that look like
/// JSON collections are parsed as such; numeric strings become floats
/// when they contain a decimal point and integers otherwise. Anything
/// else stays a string.
fn convert_scalar(raw: &str) -> Value {
    match raw.to_lowercase().as_str() {
        "true" | "yes" | "on" => return Value::Bool(true),
        "false" | "no" | "off" => return Value::Bool(false),
        "null" | "none" | "~" | "" => return Value::Null,
        _ => {}
    }

    if raw.starts_with('[') || raw.starts_with('{') {
        if let Ok(parsed) = serde_json::from_str::<serde_json::Value>(raw) {
            if let Ok(value) = serde_yaml::to_value(parsed) {
                return value;
            }
        }
    }

    if raw.contains('.') {
        if let Ok(float) = raw.parse::<f64>() {
            return Value::from(float);
        }
    } else if let Ok(int) = raw.parse::<i64>() {
        return Value::from(int);
    }

    Value::String(raw.to_owned())
}
