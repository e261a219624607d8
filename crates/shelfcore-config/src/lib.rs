//! Hot-zone settings. Re-read on every sample, so edits to the file take
//! effect without a restart.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub hover_zone_width: f64,
    pub hover_zone_height: f64,
    /// Seconds the pointer must stay in the hot-zone before the popup shows.
    pub hover_delay: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            hover_zone_width: 300.0,
            hover_zone_height: 50.0,
            hover_delay: 0.3,
        }
    }
}

impl Settings {
    pub fn hover_delay_duration(&self) -> Duration {
        Duration::from_secs_f64(self.hover_delay.max(0.0))
    }
}

/// Data directory shared by settings and the entity store blobs.
pub fn data_dir() -> PathBuf {
    directories::ProjectDirs::from("io", "shelfdock", "ShelfDock")
        .map(|dirs| dirs.data_local_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

pub fn settings_path() -> PathBuf {
    data_dir().join("settings.json")
}

/// Missing or undecodable settings fall back to defaults, never an error.
pub fn load_settings(path: &Path) -> Settings {
    let Ok(content) = std::fs::read_to_string(path) else {
        return Settings::default();
    };

    match serde_json::from_str(&content) {
        Ok(settings) => settings,
        Err(err) => {
            warn!("undecodable settings blob, using defaults: {err}");
            Settings::default()
        }
    }
}

/// First-run seed: writes the default blob when no file exists yet, so the
/// user has something to edit. Existing files are left untouched.
pub fn ensure_settings_file(path: &Path) -> Settings {
    if !path.exists() {
        save_settings(path, &Settings::default());
    }
    load_settings(path)
}

pub fn save_settings(path: &Path, settings: &Settings) {
    if let Some(parent) = path.parent() {
        if std::fs::create_dir_all(parent).is_err() {
            return;
        }
    }

    match serde_json::to_string_pretty(settings) {
        Ok(content) => {
            if let Err(err) = std::fs::write(path, content) {
                warn!("failed to write settings: {err}");
            }
        }
        Err(err) => warn!("failed to encode settings: {err}"),
    }
}
