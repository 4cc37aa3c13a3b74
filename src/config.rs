//! Studio configuration stored as JSON in the app data directory

use std::path::{Path, PathBuf};

use log::info;
use serde::{Deserialize, Serialize};

use crate::paths::{get_config_path, get_default_download_dir};

/// API URL baked in at build time via `KOMAL_DEFAULT_API_URL`
const BUILTIN_API_URL: &str = env!("BUILTIN_API_URL");

/// Whether a built-in API URL was provided at compile time
const HAS_BUILTIN_API_URL: &str = env!("HAS_BUILTIN_API_URL");

/// Tunnel the generation service was last published on
pub const FALLBACK_API_URL: &str = "https://19e4-34-127-3-70.ngrok-free.app";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct StudioConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default)]
    pub download_dir: Option<PathBuf>,
}

pub fn default_api_url() -> String {
    if HAS_BUILTIN_API_URL == "1" {
        BUILTIN_API_URL.to_string()
    } else {
        FALLBACK_API_URL.to_string()
    }
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            download_dir: None,
        }
    }
}

impl StudioConfig {
    /// Loads the config from the default path
    pub fn load() -> Result<Self, String> {
        Self::load_from(&get_config_path()?)
    }

    /// Loads the config at `config_path`; a missing file yields defaults
    pub fn load_from(config_path: &Path) -> Result<Self, String> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)
                .map_err(|e| format!("Failed to read studio config: {}", e))?;
            serde_json::from_str(&content)
                .map_err(|e| format!("Failed to parse studio config: {}", e))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<(), String> {
        self.save_to(&get_config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<(), String> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create directory: {}", e))?;
        }
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize studio config: {}", e))?;
        std::fs::write(config_path, content)
            .map_err(|e| format!("Failed to save studio config: {}", e))?;
        info!("[save_config] Saved studio config to {}", config_path.display());
        Ok(())
    }

    /// Directory downloads are written to
    pub fn resolved_download_dir(&self) -> Result<PathBuf, String> {
        match &self.download_dir {
            Some(dir) => Ok(dir.clone()),
            None => get_default_download_dir(),
        }
    }
}
