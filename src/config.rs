// ABOUTME: Loads TOML configuration for the settings app.
// ABOUTME: Provides defaults for the preference file location and the volume slider range.

use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::DynError;

/// Environment variable that overrides the preference file location.
pub const STORE_PATH_ENV: &str = "SETTINGSAPP_STORE_PATH";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub volume: VolumeConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_path")]
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolumeConfig {
    #[serde(default = "default_volume_min")]
    pub min: i32,
    #[serde(default = "default_volume_max")]
    pub max: i32,
}

fn config_dir() -> PathBuf {
    let xdg_config = std::env::var("XDG_CONFIG_HOME").unwrap_or_else(|_| {
        let home = std::env::var("HOME").unwrap_or_else(|_| "~".to_string());
        format!("{home}/.config")
    });
    Path::new(&xdg_config).join("settingsapp")
}

fn default_store_path() -> String {
    config_dir().join("settings.toml").to_string_lossy().into_owned()
}

fn default_volume_min() -> i32 {
    0
}

fn default_volume_max() -> i32 {
    100
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

impl Default for VolumeConfig {
    fn default() -> Self {
        Self {
            min: default_volume_min(),
            max: default_volume_max(),
        }
    }
}

impl Config {
    /// Load configuration from the standard config file location.
    /// Falls back to defaults if the file doesn't exist.
    pub fn load() -> Result<Self, DynError> {
        let config_path = Self::config_file_path();
        if !config_path.exists() {
            return Ok(Config::default());
        }
        let contents = std::fs::read_to_string(&config_path)?;
        let config = Self::load_from_str(&contents)?;
        tracing::info!("Configuration loaded from {}", config_path.display());
        Ok(config)
    }

    pub fn load_from_str(contents: &str) -> Result<Self, DynError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn config_file_path() -> PathBuf {
        config_dir().join("config.toml")
    }

    /// Resolve the preference file path, respecting the SETTINGSAPP_STORE_PATH override.
    pub fn store_path(&self) -> PathBuf {
        if let Ok(override_path) = std::env::var(STORE_PATH_ENV) {
            return PathBuf::from(override_path);
        }
        PathBuf::from(&self.store.path)
    }

    /// Slider range. An inverted range falls back to the default.
    pub fn volume_range(&self) -> RangeInclusive<i32> {
        let VolumeConfig { min, max } = self.volume;
        if min > max {
            tracing::warn!("Volume range {min}..={max} is inverted, using defaults");
            return default_volume_min()..=default_volume_max();
        }
        min..=max
    }
}
