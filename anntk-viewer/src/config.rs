//! Viewer configuration, read from a JSON file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub fullscreen: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "anntk viewer".to_string(),
            width: 1280,
            height: 720,
            fullscreen: false,
        }
    }
}

/// Stage source files. Missing vertex or fragment paths fall back to the bundled shaders.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgramConfig {
    pub vertex: Option<PathBuf>,
    pub geometry: Option<PathBuf>,
    pub fragment: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub window: WindowConfig,
    /// One of `off`, `error`, `warn`, `info`, `debug`, `trace`.
    pub log_level: String,
    pub program: ProgramConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            log_level: "info".to_string(),
            program: ProgramConfig::default(),
        }
    }
}

impl Config {
    pub fn from_json(s: &str) -> Result<Self, String> {
        serde_json::from_str(s).map_err(|e| e.to_string())
    }

    pub fn load(path: &Path) -> Result<Self, String> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("Unable to read {}: {e}", path.display()))?;
        Self::from_json(&text)
    }

    /// The file named on the command line, else the per-user config file if it exists.
    pub fn locate(arg: Option<String>) -> Option<PathBuf> {
        if let Some(arg) = arg {
            return Some(PathBuf::from(arg));
        }
        let path = dirs::config_dir()?.join("anntk-viewer").join("viewer.json");
        path.exists().then_some(path)
    }

    pub fn log_level(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or(log::LevelFilter::Info)
    }
}
