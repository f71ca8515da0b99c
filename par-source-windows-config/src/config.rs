//! Core `Config` struct and its YAML persistence.
//!
//! The config file lives at `~/.config/par-source-windows/config.yaml`
//! (XDG convention on every platform except Windows, where the platform
//! config directory is used).

use crate::defaults;
use crate::error::ConfigError;
use crate::types::{LogLevel, WindowSize};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the geometry blob file inside the config directory
const GEOMETRY_FILE_NAME: &str = "source_window_geometry.yaml";

/// Settings for the satellite source-window coordinator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Prefix prepended to a window id to build the satellite window name
    #[serde(default = "defaults::window_name_prefix")]
    pub window_name_prefix: String,

    /// Size used for new satellites when nothing better is known
    #[serde(default = "defaults::default_window_size")]
    pub default_window_size: WindowSize,

    /// Offset (x and y) applied when tiling a new window from the
    /// most recently used one
    #[serde(default = "defaults::tile_offset")]
    pub tile_offset: i32,

    /// How long the close monitor waits for a reloading window to
    /// re-announce itself before treating the unload as a real close
    #[serde(default = "defaults::close_grace_period_ms")]
    pub close_grace_period_ms: u64,

    /// Override for the geometry blob location
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry_file: Option<PathBuf>,

    /// Base of generated satellite titles ("<title> #<ordinal>")
    #[serde(default = "defaults::window_title")]
    pub window_title: String,

    /// Debug log verbosity
    #[serde(default)]
    pub log_level: LogLevel,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            window_name_prefix: defaults::window_name_prefix(),
            default_window_size: defaults::default_window_size(),
            tile_offset: defaults::tile_offset(),
            close_grace_period_ms: defaults::close_grace_period_ms(),
            geometry_file: None,
            window_title: defaults::window_title(),
            log_level: LogLevel::default(),
        }
    }
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from a specific file.
    ///
    /// A missing or empty file yields the defaults. A file that exists but
    /// cannot be parsed or fails validation is an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::info!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        log::info!("Loading existing config from {:?}", path);
        let contents = fs::read_to_string(path)
            .map_err(ConfigError::from)
            .with_context(|| format!("Failed to read config from {:?}", path))?;

        if contents.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config = serde_yaml_ng::from_str(&contents)
            .map_err(ConfigError::from)
            .with_context(|| format!("Failed to parse config from {:?}", path))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    /// Save configuration to a specific file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {:?}", parent))?;
        }

        let yaml = serde_yaml_ng::to_string(self).map_err(ConfigError::from)?;

        // Atomic save: write to temp file then rename to prevent corruption on crash
        let temp_path = path.with_extension("yaml.tmp");
        fs::write(&temp_path, &yaml).map_err(ConfigError::from)?;
        fs::rename(&temp_path, path).map_err(ConfigError::from)?;

        Ok(())
    }

    /// Check field values that serde cannot reject on its own
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window_name_prefix.is_empty() {
            return Err(ConfigError::Validation(
                "window_name_prefix must not be empty".to_string(),
            ));
        }
        if self.default_window_size.width == 0 || self.default_window_size.height == 0 {
            return Err(ConfigError::Validation(format!(
                "default_window_size must be non-zero (got {}x{})",
                self.default_window_size.width, self.default_window_size.height
            )));
        }
        Ok(())
    }

    /// Get the configuration directory (using XDG convention)
    pub fn config_dir() -> PathBuf {
        #[cfg(target_os = "windows")]
        {
            if let Some(config_dir) = dirs::config_dir() {
                config_dir.join("par-source-windows")
            } else {
                PathBuf::from(".")
            }
        }
        #[cfg(not(target_os = "windows"))]
        {
            if let Some(home_dir) = dirs::home_dir() {
                home_dir.join(".config").join("par-source-windows")
            } else {
                PathBuf::from(".")
            }
        }
    }

    /// Get the configuration file path
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.yaml")
    }

    /// Location of the persisted window geometry blob
    pub fn geometry_path(&self) -> PathBuf {
        self.geometry_file
            .clone()
            .unwrap_or_else(|| Self::config_dir().join(GEOMETRY_FILE_NAME))
    }
}
