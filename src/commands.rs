//! CLI command definitions
//!
//! Defines the clap commands for the otel-golden CLI.

use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Compare a received payload against an expected payload
    Compare {
        /// Captured OTLP/JSON payload
        received: PathBuf,

        /// Expected OTLP/JSON payload
        expected: PathBuf,

        /// Report every mismatch instead of stopping at the first
        #[arg(long)]
        all: bool,
    },

    /// Check a received payload against a golden file, creating it if missing
    Check {
        /// Captured OTLP/JSON payload
        received: PathBuf,

        /// Golden file path
        #[arg(long, short)]
        golden: PathBuf,

        /// Overwrite the golden file on mismatch (also OTEL_GOLDEN_UPDATE=1)
        #[arg(long)]
        update: bool,

        /// Report every mismatch instead of stopping at the first
        #[arg(long)]
        all: bool,
    },

    /// Run YAML test scenarios
    Test {
        /// Paths to YAML test scenario files
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Overwrite golden files on mismatch (also OTEL_GOLDEN_UPDATE=1)
        #[arg(long)]
        update: bool,

        /// Verbose output
        #[arg(long, short)]
        verbose: bool,
    },

    /// Show the configuration file location and effective settings
    Config,
}

impl Commands {
    /// Whether the command asked for verbose logging
    pub fn is_verbose(&self) -> bool {
        matches!(self, Self::Test { verbose: true, .. })
    }
}
