//! Golden file store
//!
//! A golden file holds the pretty-printed payload of a known-good run.
//! Checking a received payload against it follows three states:
//!
//! - missing: the received payload is written verbatim and the check passes
//! - present and matching: the check passes, nothing is written
//! - present and differing: in update mode the file is overwritten and the
//!   check passes, otherwise the comparison failure is returned
//!
//! Writes are not locked. Each (scenario, browser) pair maps to its own
//! path, so one run never has two writers for the same file.

use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::common::{Error, Result};
use crate::compare::{compare_with, CompareOptions, ComparisonResult};
use crate::otlp::EntityTree;

/// Result of checking a payload against its golden file
#[derive(Debug, Clone, PartialEq)]
pub enum GoldenOutcome {
    /// No golden file existed, the received payload was written
    Created,
    /// The golden file matched
    Matched,
    /// Update mode overwrote a differing or unreadable golden file
    Updated { reason: String },
    /// The golden file differs
    Failed(ComparisonResult),
}

impl GoldenOutcome {
    pub fn passed(&self) -> bool {
        !matches!(self, Self::Failed(_))
    }
}

/// Reads, compares and writes golden files
#[derive(Debug, Clone, Default)]
pub struct GoldenStore {
    options: CompareOptions,
    update: bool,
}

impl GoldenStore {
    pub fn new(options: CompareOptions) -> Self {
        Self {
            options,
            update: false,
        }
    }

    /// Overwrite golden files instead of failing
    pub fn with_update(mut self, update: bool) -> Self {
        self.update = update;
        self
    }

    pub fn update_mode(&self) -> bool {
        self.update
    }

    pub fn options(&self) -> &CompareOptions {
        &self.options
    }

    /// Check a received payload against the golden file at `path`
    pub fn check(&self, path: &Path, received: &Value) -> Result<GoldenOutcome> {
        let received_tree = EntityTree::from_value(received)?;

        let expected_tree = match self.load(path) {
            Ok(Some(tree)) => tree,
            Ok(None) => {
                tracing::info!(path = %path.display(), "Golden file missing, writing received payload");
                self.write(path, received)?;
                return Ok(GoldenOutcome::Created);
            }
            Err(e) if self.update && e.is_golden_unreadable() => {
                tracing::warn!(path = %path.display(), error = %e, "Replacing unreadable golden file");
                self.write(path, received)?;
                return Ok(GoldenOutcome::Updated {
                    reason: e.to_string(),
                });
            }
            Err(e) => return Err(e),
        };

        let result = compare_with(Some(&received_tree), Some(&expected_tree), &self.options);
        if result.pass {
            tracing::debug!(path = %path.display(), "Golden file matched");
            return Ok(GoldenOutcome::Matched);
        }

        if self.update {
            tracing::info!(path = %path.display(), "Updating golden file");
            self.write(path, received)?;
            return Ok(GoldenOutcome::Updated {
                reason: result.message,
            });
        }

        Ok(GoldenOutcome::Failed(result))
    }

    /// Load the golden tree, `None` when the file does not exist
    pub fn load(&self, path: &Path) -> Result<Option<EntityTree>> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(Error::GoldenRead {
                    path: path.display().to_string(),
                    error: e.to_string(),
                })
            }
        };

        EntityTree::from_json(&text)
            .map(Some)
            .map_err(|e| Error::GoldenParse {
                path: path.display().to_string(),
                error: e.to_string(),
            })
    }

    /// Write a payload as pretty-printed JSON, creating parent directories
    pub fn write(&self, path: &Path, payload: &Value) -> Result<()> {
        let write_error = |error: String| Error::GoldenWrite {
            path: path.display().to_string(),
            error,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| write_error(e.to_string()))?;
        }
        let mut text = serde_json::to_string_pretty(payload)?;
        text.push('\n');
        std::fs::write(path, text).map_err(|e| write_error(e.to_string()))
    }
}

/// Golden file location for one (scenario, browser) pair
///
/// Both components are restricted to `[A-Za-z0-9._-]`, anything else
/// becomes `_`.
pub fn golden_path(dir: &Path, scenario: &str, browser: &str) -> PathBuf {
    dir.join(sanitize(scenario))
        .join(format!("{}.json", sanitize(browser)))
}

fn sanitize(component: &str) -> String {
    let cleaned: String = component
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    // Never produce "." or ".." as a path component
    if cleaned.chars().all(|c| c == '.') {
        cleaned.replace('.', "_")
    } else {
        cleaned
    }
}
