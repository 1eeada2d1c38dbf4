//! Reading [`Settings`] from TOML, JSON and `FORMBIND_*` environment
//! variables.
//!
//! A document only needs the keys it changes. Environment variables are
//! applied last and win over any file:
//!
//! | variable | setting |
//! |---|---|
//! | `FORMBIND_DEBUG` | `debug` (`true`, `1` or `yes`) |
//! | `FORMBIND_LANGUAGE_CODE` | `language_code` |
//! | `FORMBIND_TIME_ZONE` | `time_zone` |
//! | `FORMBIND_LOG_LEVEL` | `log_level` |
//! | `FORMBIND_LOG_FORMAT` | `log_format` (`pretty` or `json`) |
//! | `FORMBIND_MAX_STRING_LENGTH` | `max_string_length` |
//!
//! ```rust,no_run
//! use formbind_core::settings_loader;
//!
//! let settings = settings_loader::from_toml_file_with_env("formbind.toml").unwrap();
//! ```

use std::fmt::Display;
use std::path::Path;

use serde_json::{Map, Value as Json};

use crate::error::{FormbindError, FormbindResult};
use crate::settings::{LogFormat, Settings};

fn invalid(format: &str, err: impl Display) -> FormbindError {
    FormbindError::ConfigurationError(format!("invalid {format} settings: {err}"))
}

/// Parses settings written as TOML.
pub fn from_toml_str(toml_str: &str) -> FormbindResult<Settings> {
    toml::from_str(toml_str).map_err(|e| invalid("TOML", e))
}

/// Reads and parses a TOML settings file.
pub fn from_toml_file(path: impl AsRef<Path>) -> FormbindResult<Settings> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| {
        FormbindError::ConfigurationError(format!("cannot read {}: {e}", path.display()))
    })?;
    tracing::debug!(path = %path.display(), "Loading settings");
    from_toml_str(&content)
}

/// [`from_toml_file`] followed by [`apply_env_overrides`].
pub fn from_toml_file_with_env(path: impl AsRef<Path>) -> FormbindResult<Settings> {
    let mut settings = from_toml_file(path)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Parses settings written as JSON.
pub fn from_json_str(json_str: &str) -> FormbindResult<Settings> {
    serde_json::from_str(json_str).map_err(|e| invalid("JSON", e))
}

/// Overlays a JSON object on `settings`.
///
/// Top-level keys replace the current values, except `extra`, whose entries
/// are added to the existing ones.
pub fn merge_json(settings: &Settings, json_str: &str) -> FormbindResult<Settings> {
    let overrides: Map<String, Json> =
        serde_json::from_str(json_str).map_err(|e| invalid("JSON", e))?;
    let Json::Object(mut current) = serde_json::to_value(settings).map_err(|e| invalid("JSON", e))?
    else {
        return Err(invalid("JSON", "settings are not an object"));
    };

    for (key, value) in overrides {
        match (current.get_mut(&key), value) {
            (Some(Json::Object(existing)), Json::Object(added)) if key == "extra" => {
                existing.extend(added);
            }
            (_, value) => {
                current.insert(key, value);
            }
        }
    }
    serde_json::from_value(Json::Object(current)).map_err(|e| invalid("JSON", e))
}

/// Default settings with the environment applied.
pub fn from_env() -> Settings {
    let mut settings = Settings::default();
    apply_env_overrides(&mut settings);
    settings
}

fn env(name: &str) -> Option<String> {
    std::env::var(format!("FORMBIND_{name}")).ok()
}

/// Applies the `FORMBIND_*` variables that are set.
///
/// Unparseable values (an unknown log format, a non-numeric length) are
/// skipped with a warning.
pub fn apply_env_overrides(settings: &mut Settings) {
    if let Some(debug) = env("DEBUG") {
        settings.debug = ["true", "1", "yes"].contains(&debug.to_lowercase().as_str());
    }
    if let Some(language) = env("LANGUAGE_CODE") {
        settings.language_code = language;
    }
    if let Some(zone) = env("TIME_ZONE") {
        settings.time_zone = zone;
    }
    if let Some(level) = env("LOG_LEVEL") {
        settings.log_level = level;
    }
    if let Some(format) = env("LOG_FORMAT") {
        match format.to_lowercase().as_str() {
            "pretty" => settings.log_format = LogFormat::Pretty,
            "json" => settings.log_format = LogFormat::Json,
            other => tracing::warn!(value = other, "Ignoring unknown FORMBIND_LOG_FORMAT"),
        }
    }
    if let Some(len) = env("MAX_STRING_LENGTH") {
        match len.parse() {
            Ok(len) => settings.max_string_length = len,
            Err(_) => tracing::warn!(value = %len, "Ignoring invalid FORMBIND_MAX_STRING_LENGTH"),
        }
    }
}
