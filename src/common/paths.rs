//! Configuration paths
//!
//! Uses the directories crate for platform-appropriate locations:
//! - Linux: `~/.config/otel-golden/`
//! - macOS: `~/Library/Application Support/otel-golden/`
//! - Windows: `%APPDATA%\otel-golden\`

use std::path::PathBuf;

/// Application name used for platform directories
const APP_NAME: &str = "otel-golden";

/// Environment variable overriding the configuration file location
pub const CONFIG_ENV: &str = "OTEL_GOLDEN_CONFIG";

/// Get the configuration directory path
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the configuration file
///
/// `OTEL_GOLDEN_CONFIG` takes precedence over the platform location.
pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_ENV).filter(|p| !p.is_empty()) {
        return Some(PathBuf::from(path));
    }
    config_dir().map(|dir| dir.join("config.toml"))
}
