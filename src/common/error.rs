//! Error types for otel-golden
//!
//! Comparison mismatches are not errors: they are reported through
//! [`crate::compare::ComparisonResult`]. The variants here cover I/O,
//! malformed payloads, configuration and scenario problems.

use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for otel-golden
#[derive(Error, Debug)]
pub enum Error {
    // === Payload Errors ===
    #[error("Invalid telemetry payload: {0}")]
    Payload(String),

    // === Golden File Errors ===
    #[error("Failed to read golden file '{path}': {error}")]
    GoldenRead { path: String, error: String },

    #[error("Golden file '{path}' is not a valid telemetry document: {error}. Re-run with OTEL_GOLDEN_UPDATE=1 to regenerate it")]
    GoldenParse { path: String, error: String },

    #[error("Failed to write golden file '{path}': {error}")]
    GoldenWrite { path: String, error: String },

    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    // === Scenario Errors ===
    #[error("Invalid test scenario '{path}': {error}")]
    Scenario { path: String, error: String },

    // === IO Errors ===
    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Test Errors ===
    #[error("Test assertion failed: {0}")]
    TestAssertion(String),
}

impl Error {
    /// Create a file read error for a path
    pub fn file_read(path: &std::path::Path, error: impl ToString) -> Self {
        Self::FileRead {
            path: path.display().to_string(),
            error: error.to_string(),
        }
    }

    /// Create a scenario error for a path
    pub fn scenario(path: &std::path::Path, error: impl ToString) -> Self {
        Self::Scenario {
            path: path.display().to_string(),
            error: error.to_string(),
        }
    }

    /// Whether this error came from reading or parsing an existing golden file
    pub fn is_golden_unreadable(&self) -> bool {
        matches!(self, Self::GoldenRead { .. } | Self::GoldenParse { .. })
    }
}
