//! Configuration file loading and discovery
//!
//! SongSnap services read a single TOML file holding bootstrap settings
//! (listen port, work directory, external tool locations). Every field has
//! a compiled default; a missing or unreadable file degrades to defaults
//! with a warning rather than refusing to start.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Bootstrap configuration loaded from the TOML file
///
/// These settings cannot change during runtime. The service must restart
/// to pick up changes to the TOML file.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct TomlConfig {
    /// HTTP listen port
    #[serde(default)]
    pub port: Option<u16>,

    /// Directory for per-request scratch audio files
    ///
    /// If not specified, falls back to the OS temp directory.
    #[serde(default)]
    pub work_dir: Option<PathBuf>,

    /// Media downloader binary (name on PATH or absolute path)
    #[serde(default)]
    pub downloader_path: Option<String>,

    /// Base URL of the audio recognition service
    #[serde(default)]
    pub recognizer_url: Option<String>,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl TomlConfig {
    /// Parse a TOML config from an explicit path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
    }

    /// Load the config from the platform default location
    ///
    /// A missing file is not an error: services start with compiled
    /// defaults and log a warning.
    pub fn load() -> Self {
        let Some(path) = config_file_path() else {
            warn!("No config file found, using compiled defaults");
            return Self::default();
        };

        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                warn!("Config file {} unusable ({}), using compiled defaults", path.display(), e);
                Self::default()
            }
        }
    }
}

/// Locate the configuration file for the platform
///
/// Linux checks the user config dir first, then the system-wide path.
/// Returns `None` when no file exists at any candidate location.
pub fn config_file_path() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("songsnap").join("songsnap.toml"));

    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/songsnap/songsnap.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_all_unset() {
        let config = TomlConfig::default();
        assert!(config.port.is_none());
        assert!(config.work_dir.is_none());
        assert!(config.downloader_path.is_none());
        assert!(config.recognizer_url.is_none());
        assert_eq!(config.logging.level, "info");
    }
}
