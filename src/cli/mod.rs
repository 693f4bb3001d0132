//! CLI command handling
//!
//! Dispatches CLI commands and formats their output.

use std::path::Path;

use colored::Colorize;

use crate::commands::Commands;
use crate::common::config::Config;
use crate::common::{paths, Error, Result};
use crate::compare::{compare_with, ComparisonResult};
use crate::golden::{GoldenOutcome, GoldenStore};
use crate::otlp::{self, EntityTree};
use crate::testing::{self, ExportTally, RunOptions};

/// Dispatch a CLI command
pub async fn dispatch(command: Commands) -> Result<()> {
    let config = Config::load()?;

    match command {
        Commands::Compare {
            received,
            expected,
            all,
        } => {
            let options = config.compare_options().collect_all(all || config.compare.collect_all);
            let received_tree = load_tree(&received)?;
            let expected_tree = load_tree(&expected)?;

            let result = compare_with(Some(&received_tree), Some(&expected_tree), &options);
            print_result(&result);
            if result.pass {
                Ok(())
            } else {
                Err(Error::TestAssertion(format!(
                    "{} does not match {}",
                    received.display(),
                    expected.display()
                )))
            }
        }

        Commands::Check {
            received,
            golden,
            update,
            all,
        } => {
            let options = config.compare_options().collect_all(all || config.compare.collect_all);
            let store = GoldenStore::new(options).with_update(update || config.golden.update);
            let payload = otlp::read_payload(&received)?;

            match store.check(&golden, &payload)? {
                GoldenOutcome::Created => {
                    println!("{} Created golden file {}", "✓".green(), golden.display());
                    Ok(())
                }
                GoldenOutcome::Matched => {
                    println!("{} Matches {}", "✓".green(), golden.display());
                    Ok(())
                }
                GoldenOutcome::Updated { reason } => {
                    println!("{} Updated golden file {}", "✓".yellow(), golden.display());
                    println!("  {}", reason.dimmed());
                    Ok(())
                }
                GoldenOutcome::Failed(result) => {
                    print_result(&result);
                    Err(Error::TestAssertion(format!(
                        "{} does not match golden file {}",
                        received.display(),
                        golden.display()
                    )))
                }
            }
        }

        Commands::Test {
            paths,
            update,
            verbose,
        } => {
            let store = GoldenStore::new(config.compare_options())
                .with_update(update || config.golden.update);
            let options = RunOptions {
                store: &store,
                golden_dir: &config.golden.dir,
                verbose,
            };
            let mut tally = ExportTally::new();

            let mut results = Vec::with_capacity(paths.len());
            for path in &paths {
                results.push(testing::run_scenario(path, &options, &mut tally).await?);
            }

            let failed: Vec<_> = results.iter().filter(|r| !r.passed).collect();
            println!(
                "{} {} passed, {} failed, {} export requests checked",
                "Summary:".bold(),
                results.len() - failed.len(),
                failed.len(),
                tally.total()
            );
            if verbose {
                for (browser, requests) in tally.iter() {
                    println!("  {}: {} requests", browser, requests);
                }
            }

            if failed.is_empty() {
                Ok(())
            } else {
                for result in &failed {
                    println!(
                        "  {} {} ({}/{} checks): {}",
                        "✗".red(),
                        result.name,
                        result.checks_run,
                        result.checks_total,
                        result.error.as_deref().unwrap_or("failed")
                    );
                }
                Err(Error::TestAssertion(format!(
                    "{} of {} scenarios failed",
                    failed.len(),
                    results.len()
                )))
            }
        }

        Commands::Config => {
            match paths::config_path() {
                Some(path) if path.exists() => println!("Config file: {}", path.display()),
                Some(path) => println!("Config file: {} (not found, using defaults)", path.display()),
                None => println!("Config file: none (no config directory on this platform)"),
            }

            let options = config.compare_options();
            println!("Golden directory: {}", config.golden.dir.display());
            println!("Update mode: {}", config.golden.update);
            println!("Collect all mismatches: {}", options.collects_all());
            println!("Ignored attributes:");
            for key in options.ignored_attributes() {
                println!("  {}", key);
            }
            println!("Count-only scopes:");
            for scope in options.reduced_scopes() {
                println!("  {}", scope);
            }
            Ok(())
        }
    }
}

fn load_tree(path: &Path) -> Result<EntityTree> {
    let payload = otlp::read_payload(path)?;
    EntityTree::from_value(&payload)
}

fn print_result(result: &ComparisonResult) {
    if result.pass {
        println!("{} {}", "✓".green(), result.message);
    } else {
        println!("{} {}", "✗".red(), result.message);
    }
}
