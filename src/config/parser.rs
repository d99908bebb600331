use crate::config::types::{SearchMode, Settings};
use crate::config::validation::validate;
use crate::ConfigError;
use serde_json::{Map, Value};
use std::path::Path;

/// Command-line values that take precedence over every file layer
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub query: Option<String>,
    pub mode: Option<SearchMode>,
    pub region: Option<String>,
    pub language: Option<String>,
    pub max_pages: Option<u32>,
    pub no_details: bool,
    pub output: Option<String>,
}

/// Loads the settings file as a JSON object
///
/// A missing file is not an error: a warning is logged and an empty layer is
/// returned so the built-in defaults apply.
///
/// # Arguments
///
/// * `path` - Path to the JSON settings file
///
/// # Returns
///
/// * `Ok(Map)` - Top-level keys of the settings file
/// * `Err(ConfigError)` - The file exists but could not be read or parsed
pub fn load_settings_layer(path: &Path) -> Result<Map<String, Value>, ConfigError> {
    if !path.exists() {
        tracing::warn!(
            "Settings file {} not found, using built-in defaults.",
            path.display()
        );
        return Ok(Map::new());
    }

    read_object(path)
}

/// Loads the optional input-defaults file
///
/// Unlike the settings file, a broken input file is only worth a warning.
pub fn load_input_layer(path: &Path) -> Option<Map<String, Value>> {
    if !path.exists() {
        return None;
    }

    match read_object(path) {
        Ok(layer) => {
            tracing::info!("Loaded additional defaults from {}", path.display());
            Some(layer)
        }
        Err(e) => {
            tracing::warn!("Failed to read {}: {}", path.display(), e);
            None
        }
    }
}

/// Shallow merge: every top-level key of `overlay` replaces the one in `base`
pub fn merge_layers(mut base: Map<String, Value>, overlay: Map<String, Value>) -> Map<String, Value> {
    for (key, value) in overlay {
        base.insert(key, value);
    }
    base
}

/// Builds the effective settings from files and command-line overrides
///
/// Precedence, lowest first: built-in defaults, settings file, input file,
/// command line. The query must be resolvable from the command line or a file
/// layer; otherwise this fails with [`ConfigError::MissingQuery`] before any
/// network activity happens.
pub fn resolve_settings(
    config_path: &Path,
    input_path: &Path,
    overrides: &Overrides,
) -> Result<Settings, ConfigError> {
    let mut layer = load_settings_layer(config_path)?;
    if let Some(input) = load_input_layer(input_path) {
        layer = merge_layers(layer, input);
    }

    let mut settings: Settings = serde_json::from_value(Value::Object(layer))?;
    apply_overrides(&mut settings, overrides);

    let query = overrides
        .query
        .as_deref()
        .or(settings.query.as_deref())
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(str::to_string)
        .ok_or(ConfigError::MissingQuery)?;
    settings.query = Some(query);

    validate(&settings)?;

    Ok(settings)
}

fn apply_overrides(settings: &mut Settings, overrides: &Overrides) {
    if let Some(mode) = overrides.mode {
        settings.mode = mode;
    }
    if let Some(region) = &overrides.region {
        settings.region = region.clone();
    }
    if let Some(language) = &overrides.language {
        settings.language = language.clone();
    }
    if let Some(max_pages) = overrides.max_pages {
        settings.max_pages = max_pages;
    }
    if overrides.no_details {
        settings.include_company_details = false;
    }
    if let Some(output) = &overrides.output {
        settings.output_filename = output.clone();
    }
}

fn read_object(path: &Path) -> Result<Map<String, Value>, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    match serde_json::from_str::<Value>(&content)? {
        Value::Object(map) => Ok(map),
        _ => Err(ConfigError::Validation(format!(
            "{} must contain a JSON object",
            path.display()
        ))),
    }
}
