//! Configuration resolution for songsnap-id
//!
//! Provides two-tier setting resolution with ENV → TOML priority and
//! compiled defaults as the fallback.

use songsnap_common::config::TomlConfig;
use std::path::PathBuf;
use tracing::{info, warn};

/// Default HTTP listen port
pub const DEFAULT_PORT: u16 = 8000;

/// Default media downloader binary, looked up on PATH
pub const DEFAULT_DOWNLOADER: &str = "yt-dlp";

/// Default recognition service base URL
pub const DEFAULT_RECOGNIZER_URL: &str = "http://127.0.0.1:5005";

/// Fully resolved service configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// HTTP listen port
    pub port: u16,
    /// Directory for per-request scratch audio files
    pub work_dir: PathBuf,
    /// Media downloader binary (name on PATH or absolute path)
    pub downloader_path: String,
    /// Base URL of the audio recognition service
    pub recognizer_url: String,
}

impl ServiceConfig {
    /// Resolve all settings from environment and TOML config
    pub fn resolve(toml: &TomlConfig) -> Self {
        Self {
            port: resolve_port(toml),
            work_dir: resolve_work_dir(toml),
            downloader_path: resolve_downloader_path(toml),
            recognizer_url: resolve_recognizer_url(toml),
        }
    }
}

/// Resolve the HTTP listen port
///
/// **Priority:** `SONGSNAP_PORT` → `PORT` → TOML → 8000
///
/// `PORT` is honored for compatibility with container platforms that
/// inject it. Invalid values are skipped with a warning.
pub fn resolve_port(toml: &TomlConfig) -> u16 {
    let service_env = parse_port_var("SONGSNAP_PORT");
    let generic_env = parse_port_var("PORT");

    let mut sources = Vec::new();
    if service_env.is_some() {
        sources.push("SONGSNAP_PORT");
    }
    if generic_env.is_some() {
        sources.push("PORT");
    }
    if toml.port.is_some() {
        sources.push("TOML");
    }

    // Warn if multiple sources (potential misconfiguration)
    if sources.len() > 1 {
        warn!(
            "Listen port found in multiple sources: {}. Using {} (highest priority).",
            sources.join(", "),
            sources[0]
        );
    }

    if let Some(port) = service_env {
        info!("Listen port {} loaded from SONGSNAP_PORT", port);
        return port;
    }
    if let Some(port) = generic_env {
        info!("Listen port {} loaded from PORT", port);
        return port;
    }
    if let Some(port) = toml.port {
        info!("Listen port {} loaded from TOML config", port);
        return port;
    }

    DEFAULT_PORT
}

fn parse_port_var(name: &str) -> Option<u16> {
    let value = std::env::var(name).ok()?;
    match value.trim().parse::<u16>() {
        Ok(port) => Some(port),
        Err(_) => {
            warn!("Ignoring {}={:?}: not a valid port number", name, value);
            None
        }
    }
}

/// Resolve the scratch directory for downloaded audio
///
/// **Priority:** `SONGSNAP_WORK_DIR` → TOML → OS temp directory
pub fn resolve_work_dir(toml: &TomlConfig) -> PathBuf {
    if let Ok(dir) = std::env::var("SONGSNAP_WORK_DIR") {
        return PathBuf::from(dir);
    }
    if let Some(dir) = &toml.work_dir {
        return dir.clone();
    }
    std::env::temp_dir()
}

/// Resolve the downloader binary
///
/// **Priority:** `SONGSNAP_DOWNLOADER` → TOML → `yt-dlp` on PATH
pub fn resolve_downloader_path(toml: &TomlConfig) -> String {
    if let Ok(path) = std::env::var("SONGSNAP_DOWNLOADER") {
        return path;
    }
    if let Some(path) = &toml.downloader_path {
        return path.clone();
    }
    DEFAULT_DOWNLOADER.to_string()
}

/// Resolve the recognition service base URL
///
/// **Priority:** `SONGSNAP_RECOGNIZER_URL` → TOML → local default
pub fn resolve_recognizer_url(toml: &TomlConfig) -> String {
    if let Ok(url) = std::env::var("SONGSNAP_RECOGNIZER_URL") {
        return url;
    }
    if let Some(url) = &toml.recognizer_url {
        return url.clone();
    }
    DEFAULT_RECOGNIZER_URL.to_string()
}
