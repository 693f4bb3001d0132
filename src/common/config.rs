//! Configuration file handling

use serde::Deserialize;
use std::path::{Path, PathBuf};

use super::paths::config_path;
use super::{Error, Result};
use crate::compare::CompareOptions;

/// Environment variable selecting golden update mode
pub const UPDATE_ENV: &str = "OTEL_GOLDEN_UPDATE";

/// Main configuration structure
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Comparison settings
    #[serde(default)]
    pub compare: CompareConfig,

    /// Golden file settings
    #[serde(default)]
    pub golden: GoldenConfig,
}

/// Comparison settings
///
/// Lists here extend the built-in exclusions, they never replace them.
#[derive(Debug, Deserialize, Default)]
pub struct CompareConfig {
    /// Extra attribute keys whose values never gate pass/fail
    #[serde(default)]
    pub ignored_attributes: Vec<String>,

    /// Extra scopes whose entities are only counted
    #[serde(default)]
    pub reduced_scopes: Vec<String>,

    /// Report every mismatch instead of stopping at the first one
    #[serde(default)]
    pub collect_all: bool,
}

/// Golden file settings
#[derive(Debug, Deserialize)]
pub struct GoldenConfig {
    /// Directory golden files are stored under
    #[serde(default = "default_golden_dir")]
    pub dir: PathBuf,

    /// Overwrite golden files on mismatch
    #[serde(default)]
    pub update: bool,
}

impl Default for GoldenConfig {
    fn default() -> Self {
        Self {
            dir: default_golden_dir(),
            update: false,
        }
    }
}

fn default_golden_dir() -> PathBuf {
    PathBuf::from("golden")
}

impl Config {
    /// Load configuration from the default config file
    ///
    /// Returns default configuration if file doesn't exist. Environment
    /// overrides are applied on top.
    pub fn load() -> Result<Self> {
        let mut config = match config_path() {
            Some(path) if path.exists() => Self::load_from(&path)?,
            _ => Self::default(),
        };
        config.apply_env();
        Ok(config)
    }

    /// Load configuration from an explicit file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::file_read(path, e))?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| Error::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if let Some(key) = self.compare.ignored_attributes.iter().find(|k| k.trim().is_empty()) {
            return Err(Error::Config(format!(
                "compare.ignored_attributes contains an empty key {:?}",
                key
            )));
        }
        if let Some(scope) = self.compare.reduced_scopes.iter().find(|s| s.trim().is_empty()) {
            return Err(Error::Config(format!(
                "compare.reduced_scopes contains an empty scope name {:?}",
                scope
            )));
        }
        if self.golden.dir.as_os_str().is_empty() {
            return Err(Error::Config("golden.dir must not be empty".to_string()));
        }
        Ok(())
    }

    /// Apply environment overrides
    pub fn apply_env(&mut self) {
        if let Ok(raw) = std::env::var(UPDATE_ENV) {
            match parse_flag(&raw) {
                Some(update) => self.golden.update = update,
                None => tracing::warn!(
                    value = %raw,
                    "Ignoring unrecognised {} value, expected 1/0, true/false, yes/no or on/off",
                    UPDATE_ENV
                ),
            }
        }
    }

    /// Build comparison options from the built-ins plus configured extras
    pub fn compare_options(&self) -> CompareOptions {
        CompareOptions::default()
            .ignore_attributes(self.compare.ignored_attributes.iter().cloned())
            .reduce_scopes(self.compare.reduced_scopes.iter().cloned())
            .collect_all(self.compare.collect_all)
    }
}

/// Parse a boolean environment flag
///
/// An empty value counts as unset, i.e. false.
pub fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
