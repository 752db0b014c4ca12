use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use shared::domain::{EntityId, Transform, TransformKind};

pub const DEFAULT_CONFIG_PATH: &str = "chainctl.toml";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub log_filter: String,
    pub pretty: bool,
    pub default_rotation: [f64; 4],
    pub default_translation: [f64; 3],
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_filter: "warn".into(),
            pretty: true,
            default_rotation: [0.0, 0.0, 0.0, 1.0],
            default_translation: [1.0, 1.0, 1.0],
        }
    }
}

impl Settings {
    /// A new transform of `kind` carrying the configured default components.
    pub fn new_transform(&self, kind: TransformKind, id: EntityId) -> Transform {
        match kind {
            TransformKind::Rotation => {
                let [x, y, z, w] = self.default_rotation;
                Transform::rotation(id, x, y, z, w)
            }
            TransformKind::Translation => {
                let [x, y, z] = self.default_translation;
                Transform::translation(id, x, y, z)
            }
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileSettings {
    log_filter: Option<String>,
    pretty: Option<bool>,
    default_rotation: Option<[f64; 4]>,
    default_translation: Option<[f64; 3]>,
}

/// Defaults, then the config file, then `APP__*` environment variables.
///
/// A missing `chainctl.toml` in the working directory is fine; a missing file
/// passed explicitly is an error.
pub fn load_settings(path: Option<&Path>) -> Result<Settings> {
    load_settings_with_env(path, |key| std::env::var(key).ok())
}

fn load_settings_with_env(
    path: Option<&Path>,
    env: impl Fn(&str) -> Option<String>,
) -> Result<Settings> {
    let mut settings = Settings::default();

    let (path, explicit) = match path {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_PATH), false),
    };
    match fs::read_to_string(&path) {
        Ok(raw) => {
            let file_cfg: FileSettings = toml::from_str(&raw)
                .with_context(|| format!("invalid config file '{}'", path.display()))?;
            apply_file(&mut settings, file_cfg);
        }
        Err(error) if error.kind() == ErrorKind::NotFound && !explicit => {}
        Err(error) => {
            return Err(error)
                .with_context(|| format!("failed to read config file '{}'", path.display()));
        }
    }

    if let Some(v) = env("APP__LOG_FILTER") {
        settings.log_filter = v;
    }
    if let Some(v) = env("APP__PRETTY") {
        settings.pretty = parse_bool(&v).context("APP__PRETTY")?;
    }
    if let Some(v) = env("APP__DEFAULT_ROTATION") {
        settings.default_rotation = parse_components(&v).context("APP__DEFAULT_ROTATION")?;
    }
    if let Some(v) = env("APP__DEFAULT_TRANSLATION") {
        settings.default_translation =
            parse_components(&v).context("APP__DEFAULT_TRANSLATION")?;
    }

    Ok(settings)
}

fn apply_file(settings: &mut Settings, file_cfg: FileSettings) {
    if let Some(v) = file_cfg.log_filter {
        settings.log_filter = v;
    }
    if let Some(v) = file_cfg.pretty {
        settings.pretty = v;
    }
    if let Some(v) = file_cfg.default_rotation {
        settings.default_rotation = v;
    }
    if let Some(v) = file_cfg.default_translation {
        settings.default_translation = v;
    }
}

fn parse_bool(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(anyhow!("expected a boolean, got '{other}'")),
    }
}

/// Parses `"0, 0, 0, 1"` into exactly `N` numbers.
fn parse_components<const N: usize>(raw: &str) -> Result<[f64; N]> {
    let values = raw
        .split(',')
        .map(|part| {
            part.trim()
                .parse::<f64>()
                .with_context(|| format!("'{}' is not a number", part.trim()))
        })
        .collect::<Result<Vec<_>>>()?;
    let count = values.len();
    values
        .try_into()
        .map_err(|_| anyhow!("expected {N} comma-separated numbers, got {count}"))
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
