//! otel-golden - golden-file checks for captured OpenTelemetry payloads
//!
//! Compares spans and logs exported by an instrumented page against
//! stored golden documents, ignoring fields that change on every run.

use clap::Parser;
use otel_golden::commands::Commands;
use otel_golden::{cli, common::logging};

#[derive(Parser)]
#[command(name = "otel-golden", about = "Golden-file checks for OTLP/JSON telemetry")]
#[command(version, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if cli.command.is_verbose() {
        logging::init_verbose();
    } else {
        logging::init_cli();
    }

    if let Err(e) = cli::dispatch(cli.command).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
