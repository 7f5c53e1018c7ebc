//! Settings loading: defaults, file, environment.

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::errors::{Result, SettingsError};
use crate::types::HuddleSettings;

/// Directory under `$HOME` holding the settings file.
const SETTINGS_DIR: &str = ".huddle";

/// Settings file name.
const SETTINGS_FILE: &str = "settings.json";

/// Default settings file location: `~/.huddle/settings.json`.
///
/// Falls back to the current directory when `HOME` is unset.
pub fn settings_path() -> PathBuf {
    let home = std::env::var_os("HOME").map_or_else(|| PathBuf::from("."), PathBuf::from);
    home.join(SETTINGS_DIR).join(SETTINGS_FILE)
}

/// Load settings from the default location with env overrides.
pub fn load_settings() -> Result<HuddleSettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from `path`.
///
/// A missing file yields compiled defaults. The file is deep-merged over the
/// defaults, then `HUDDLE_*` environment variables are applied, then the
/// result is validated.
pub fn load_settings_from_path(path: &Path) -> Result<HuddleSettings> {
    let defaults = serde_json::to_value(HuddleSettings::default()).map_err(SettingsError::Schema)?;

    let merged = match std::fs::read_to_string(path) {
        Ok(raw) => {
            let user: Value = serde_json::from_str(&raw).map_err(|source| SettingsError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
            deep_merge(defaults, user)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(?path, "no settings file, using defaults");
            defaults
        }
        Err(source) => {
            return Err(SettingsError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let mut settings: HuddleSettings =
        serde_json::from_value(merged).map_err(SettingsError::Schema)?;
    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    settings.validate();
    Ok(settings)
}

/// Recursively merge `overlay` into `base`.
///
/// Objects merge key by key; any other overlay value replaces the base value.
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                let merged = match base.remove(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => value,
                };
                let _ = base.insert(key, merged);
            }
            Value::Object(base)
        }
        (_, overlay) => overlay,
    }
}

/// Apply `HUDDLE_*` overrides read through `lookup`.
///
/// Values that fail to parse are ignored with a warning.
pub fn apply_env_overrides(settings: &mut HuddleSettings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(host) = lookup("HUDDLE_HOST") {
        settings.server.host = host;
    }
    if let Some(port) = parse_env(&lookup, "HUDDLE_PORT") {
        settings.server.port = port;
    }
    if let Some(path) = lookup("HUDDLE_WS_PATH") {
        settings.server.ws_path = path;
    }
    if let Some(enabled) = parse_env(&lookup, "HUDDLE_METRICS_ENABLED") {
        settings.server.metrics_enabled = enabled;
    }
    if let Some(capacity) = parse_env(&lookup, "HUDDLE_OUTBOUND_CAPACITY") {
        settings.hub.outbound_capacity = capacity;
    }
    if let Some(capacity) = parse_env(&lookup, "HUDDLE_INBOX_CAPACITY") {
        settings.hub.inbox_capacity = capacity;
    }
    if let Some(level) = lookup("HUDDLE_LOG_LEVEL") {
        settings.logging.level = level;
    }
    if let Some(json) = parse_env(&lookup, "HUDDLE_LOG_JSON") {
        settings.logging.json = json;
    }
}

fn parse_env<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = %raw, "ignoring unparseable environment override");
            None
        }
    }
}
