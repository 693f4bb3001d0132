//! Test scenario configuration types
//!
//! Defines the data structures for deserializing YAML test scenarios.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::common::{Error, Result};

/// A complete test scenario loaded from a YAML file
#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
pub struct TestScenario {
    /// Name of the test scenario, also the golden file directory
    pub name: String,
    /// Optional description of what the test verifies
    pub description: Option<String>,
    /// Optional setup steps to run before the checks (e.g., capturing payloads)
    pub setup: Option<Vec<SetupStep>>,
    /// Browsers the scenario was captured with
    pub browsers: Vec<String>,
    /// Captured payload path, may contain `{browser}` and `{scenario}`
    pub captured: String,
    /// Golden directory, defaults to the configured one
    pub golden_dir: Option<PathBuf>,
    /// Number of export requests each browser must have sent
    pub expect_requests: Option<usize>,
}

/// A setup step that runs before the checks
#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
pub struct SetupStep {
    /// Shell command to execute
    pub shell: String,
}

impl TestScenario {
    /// Load and validate a scenario file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Scenario {
                path: path.display().to_string(),
                error: format!("failed to read: {}", e),
            }
        })?;
        let scenario: Self =
            serde_yaml::from_str(&content).map_err(|e| Error::scenario(path, e))?;
        scenario.validate().map_err(|e| Error::scenario(path, e))?;
        Ok(scenario)
    }

    fn validate(&self) -> std::result::Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("'name' must not be empty".to_string());
        }
        if self.browsers.is_empty() {
            return Err("'browsers' must list at least one browser".to_string());
        }
        if !self.captured.contains("{browser}") && self.browsers.len() > 1 {
            return Err(
                "'captured' must contain {browser} when more than one browser is listed"
                    .to_string(),
            );
        }
        Ok(())
    }

    /// Captured payload path for a browser
    pub fn captured_path(&self, browser: &str) -> PathBuf {
        PathBuf::from(
            self.captured
                .replace("{browser}", browser)
                .replace("{scenario}", &self.name),
        )
    }
}
