//! otel-golden - golden-file checks for captured OpenTelemetry payloads
//!
//! This library parses OTLP/JSON export payloads into entity trees,
//! compares them structurally against golden documents, and runs YAML
//! test scenarios across browsers.

pub mod cli;
pub mod commands;
pub mod common;
pub mod compare;
pub mod golden;
pub mod otlp;
pub mod testing;

// Re-export commonly used types for tests
pub use common::{Error, Result};
pub use compare::{compare, compare_with, CompareOptions, ComparisonResult, Mismatch};
pub use golden::{GoldenOutcome, GoldenStore};
pub use otlp::EntityTree;
