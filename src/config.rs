//! Configuration management for the application.
//!
//! This module handles loading, validating, and saving application configuration
//! in TOML format with platform-specific directory resolution.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::{
    CONFIG_DIR_ENV, CONFIG_DIR_NAME, DEFAULT_DEVICE_SIZE, DEFAULT_LAYOUT_FILE_NAME,
    DEFAULT_SCENE_HEIGHT, DEFAULT_SCENE_WIDTH,
};
use crate::models::SceneSize;

/// Path configuration for file system locations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PathConfig {
    /// YAML file holding widget placements (defaults to `monitor.yaml` in
    /// the config directory)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout_file: Option<PathBuf>,
}

/// Playfield settings shared by every widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayfieldConfig {
    /// Default widget size as a fraction of scene width
    #[serde(default = "default_device_size")]
    pub device_size: f64,
    /// Clicks select widgets for the inspector instead of sending commands
    #[serde(default)]
    pub inspector_enabled: bool,
    /// Playfield image width in pixels
    #[serde(default = "default_scene_width")]
    pub scene_width: f64,
    /// Playfield image height in pixels
    #[serde(default = "default_scene_height")]
    pub scene_height: f64,
}

fn default_device_size() -> f64 {
    DEFAULT_DEVICE_SIZE
}

fn default_scene_width() -> f64 {
    DEFAULT_SCENE_WIDTH
}

fn default_scene_height() -> f64 {
    DEFAULT_SCENE_HEIGHT
}

impl Default for PlayfieldConfig {
    fn default() -> Self {
        Self {
            device_size: default_device_size(),
            inspector_enabled: false,
            scene_width: default_scene_width(),
            scene_height: default_scene_height(),
        }
    }
}

/// Application configuration.
///
/// # File Location
///
/// - Linux: `~/.config/MpfPlayfield/config.toml`
/// - macOS: `~/Library/Application Support/MpfPlayfield/config.toml`
/// - Windows: `%APPDATA%\MpfPlayfield\config.toml`
///
/// `MPF_PLAYFIELD_CONFIG_DIR` overrides the directory.
///
/// # Validation
///
/// - `device_size` must be in `(0, 1]`
/// - `scene_width` and `scene_height` must be positive
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    /// File system paths
    #[serde(default)]
    pub paths: PathConfig,
    /// Playfield settings
    #[serde(default)]
    pub playfield: PlayfieldConfig,
}

impl Config {
    /// Creates a new Config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets the platform-specific config directory path.
    pub fn config_dir() -> Result<PathBuf> {
        if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV) {
            return Ok(PathBuf::from(dir));
        }

        let config_dir = dirs::config_dir()
            .context("Failed to determine config directory")?
            .join(CONFIG_DIR_NAME);

        Ok(config_dir)
    }

    /// Gets the full path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Loads configuration from the default config file.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    /// Loads configuration from `config_path`.
    ///
    /// If the file doesn't exist, returns default configuration.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::new());
        }

        let content = fs::read_to_string(config_path).context(format!(
            "Failed to read config file: {}",
            config_path.display()
        ))?;

        let config: Self = toml::from_str(&content).context(format!(
            "Failed to parse config file: {}",
            config_path.display()
        ))?;

        config.validate()?;
        Ok(config)
    }

    /// Saves configuration to the default config file.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    /// Saves configuration to `config_path` using atomic write.
    ///
    /// Uses temp file + rename pattern for atomic writes.
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        self.validate()?;

        if let Some(config_dir) = config_path.parent() {
            if !config_dir.as_os_str().is_empty() {
                fs::create_dir_all(config_dir).context(format!(
                    "Failed to create config directory: {}",
                    config_dir.display()
                ))?;
            }
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;
        let temp_path = config_path.with_extension("toml.tmp");

        fs::write(&temp_path, content).context(format!(
            "Failed to write temp config file: {}",
            temp_path.display()
        ))?;

        fs::rename(&temp_path, config_path).context(format!(
            "Failed to rename temp config file to: {}",
            config_path.display()
        ))?;

        Ok(())
    }

    /// Validates configuration values.
    pub fn validate(&self) -> Result<()> {
        let size = self.playfield.device_size;
        if size.is_nan() || size <= 0.0 || size > 1.0 {
            anyhow::bail!("Device size must be in (0, 1], got {size}");
        }

        let (width, height) = (self.playfield.scene_width, self.playfield.scene_height);
        if width.is_nan() || height.is_nan() || width <= 0.0 || height <= 0.0 {
            anyhow::bail!("Scene size must be positive, got {width}x{height}");
        }

        Ok(())
    }

    /// Path of the YAML layout file.
    pub fn layout_file_path(&self) -> Result<PathBuf> {
        match &self.paths.layout_file {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::config_dir()?.join(DEFAULT_LAYOUT_FILE_NAME)),
        }
    }

    /// Scene dimensions from the playfield settings.
    #[must_use]
    pub fn scene_size(&self) -> SceneSize {
        SceneSize::new(self.playfield.scene_width, self.playfield.scene_height)
    }
}
