//! Editor settings, stored as JSON.

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Default settings file name, relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "nodal_editor.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub window_title: String,
    pub window_size: [f32; 2],
    pub theme: Theme,
    /// Directory the explorer scans for structure documents.
    pub workspace: Utf8PathBuf,
    /// Lines kept by the in-app log window.
    pub log_capacity: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            window_title: "NodalHDL Editor".to_string(),
            window_size: [1440.0, 900.0],
            theme: Theme::Light,
            workspace: Utf8PathBuf::from("."),
            log_capacity: 500,
        }
    }
}

impl EditorConfig {
    /// Load settings. A missing file yields the defaults.
    pub fn load(path: &Utf8Path) -> Result<Self> {
        if !path.exists() {
            info!(%path, "no settings file, using defaults");
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path).with_context(|| format!("Read {}", path))?;
        serde_json::from_str(&text).with_context(|| format!("Failed to parse settings {}", path))
    }

    pub fn save(&self, path: &Utf8Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| format!("Create {}", parent))?;
            }
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).with_context(|| format!("Write {}", path))
    }
}
