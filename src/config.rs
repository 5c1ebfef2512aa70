use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::LoadError;

/// Reserved value meaning "no API base has been configured yet". Written to
/// fresh config files; any load attempt against it fails before the network.
pub const API_BASE_PLACEHOLDER: &str = "https://metadata.invalid";

/// Connection settings for the document metadata API.
/// Stored in the platform config directory (`$XDG_CONFIG_HOME/proofview/` or `%APPDATA%\proofview\`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the metadata API, e.g. `https://docs.example.com/api`.
    pub api_base: String,
    /// Timeout applied to each metadata/document request, in seconds.
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: API_BASE_PLACEHOLDER.to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl Config {
    /// Load config from `config.json`, or return defaults. The
    /// `PROOFVIEW_API_BASE` environment variable overrides the file.
    pub fn load() -> Self {
        let path = config_path();
        let mut config = match std::fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    log::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    log::warn!("Failed to parse {}: {}, using defaults", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => {
                log::info!(
                    "No config file at {}, using defaults. Creating default config.",
                    path.display()
                );
                let config = Self::default();
                config.save();
                config
            }
        };

        if let Ok(base) = std::env::var("PROOFVIEW_API_BASE") {
            log::info!("Overriding api_base from PROOFVIEW_API_BASE");
            config.api_base = base;
        }

        config
    }

    /// Save current config to `config.json`.
    pub fn save(&self) {
        let path = config_path();
        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(e) = std::fs::write(&path, json) {
                    log::warn!("Failed to write config to {}: {}", path.display(), e);
                }
            }
            Err(e) => {
                log::warn!("Failed to serialize config: {}", e);
            }
        }
    }

    /// Reject an unset or placeholder API base. Must pass before any request
    /// is issued for a load cycle.
    pub fn validate(&self) -> Result<(), LoadError> {
        if self.api_base.trim().is_empty() || self.api_base == API_BASE_PLACEHOLDER {
            return Err(LoadError::Config(
                "metadata API base URL is not configured".to_string(),
            ));
        }
        Ok(())
    }
}

fn config_path() -> PathBuf {
    let dir = dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("proofview");
    if !dir.exists() {
        std::fs::create_dir_all(&dir).ok();
    }
    dir.join("config.json")
}
