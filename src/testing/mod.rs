//! Scenario suite runner
//!
//! Reads YAML test scenarios, runs their setup steps and checks every
//! browser's captured telemetry against its golden file.

mod config;
mod runner;

pub use config::*;
pub use runner::{run_scenario, ExportTally, RunOptions, TestResult};
