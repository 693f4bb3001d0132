//! Test runner implementation
//!
//! Runs a scenario's setup steps, then checks each browser's captured
//! payload against its golden file.

use std::collections::BTreeMap;
use std::path::Path;
use std::process::Stdio;

use colored::Colorize;
use tokio::process::Command as TokioCommand;

use crate::common::{Error, Result};
use crate::golden::{golden_path, GoldenOutcome, GoldenStore};
use crate::otlp;

use super::config::TestScenario;

/// Result of a test run
#[derive(Debug)]
pub struct TestResult {
    pub name: String,
    pub passed: bool,
    pub checks_run: usize,
    pub checks_total: usize,
    pub error: Option<String>,
}

/// Export requests seen per browser
///
/// Threaded through the calling test instead of living in process-wide state.
#[derive(Debug, Default)]
pub struct ExportTally {
    counts: BTreeMap<String, usize>,
}

impl ExportTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add requests seen for a browser
    pub fn record(&mut self, browser: &str, requests: usize) {
        *self.counts.entry(browser.to_string()).or_insert(0) += requests;
    }

    pub fn get(&self, browser: &str) -> usize {
        self.counts.get(browser).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.counts.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

/// Options shared by every scenario of a run
#[derive(Debug)]
pub struct RunOptions<'a> {
    pub store: &'a GoldenStore,
    /// Golden directory used when the scenario doesn't name one
    pub golden_dir: &'a Path,
    pub verbose: bool,
}

/// Run a test scenario from a YAML file
pub async fn run_scenario(
    path: &Path,
    options: &RunOptions<'_>,
    tally: &mut ExportTally,
) -> Result<TestResult> {
    let scenario = TestScenario::load(path)?;
    let checks_total = scenario.browsers.len();
    tracing::debug!(
        scenario = %scenario.name,
        browsers = checks_total,
        update = options.store.update_mode(),
        collect_all = options.store.options().collects_all(),
        "Loaded scenario"
    );

    println!(
        "\n{} {}",
        "Running Test:".blue().bold(),
        scenario.name.white().bold()
    );

    if let Some(desc) = &scenario.description {
        println!("  {}", desc.dimmed());
    }

    // Paths in the scenario are relative to the scenario file
    let scenario_dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));

    if let Some(setup_steps) = &scenario.setup {
        println!("\n{}", "Setup:".cyan());
        for step in setup_steps {
            if options.verbose {
                println!("  $ {}", step.shell.dimmed());
            }

            let output: fn() -> Stdio = if options.verbose {
                Stdio::inherit
            } else {
                Stdio::null
            };
            let status = TokioCommand::new("sh")
                .arg("-c")
                .arg(&step.shell)
                .current_dir(scenario_dir)
                .stdin(Stdio::null())
                .stdout(output())
                .stderr(output())
                .status()
                .await
                .map_err(|e| {
                    Error::scenario(path, format!("setup command failed to execute: {}", e))
                })?;

            if !status.success() {
                return Ok(TestResult {
                    name: scenario.name.clone(),
                    passed: false,
                    checks_run: 0,
                    checks_total,
                    error: Some(format!(
                        "Setup command '{}' failed with exit code {:?}",
                        step.shell,
                        status.code()
                    )),
                });
            }
            println!("  {} {}", "✓".green(), step.shell.dimmed());
        }
    }

    let golden_dir = match &scenario.golden_dir {
        Some(dir) => scenario_dir.join(dir),
        None => options.golden_dir.to_path_buf(),
    };

    println!("\n{}", "Checks:".cyan());

    for (i, browser) in scenario.browsers.iter().enumerate() {
        let check_num = i + 1;
        let captured = scenario_dir.join(scenario.captured_path(browser));
        let golden = golden_path(&golden_dir, &scenario.name, browser);

        match check_browser(&scenario, browser, &captured, &golden, options, tally) {
            Ok(outcome) => print_outcome(check_num, browser, &golden, &outcome),
            Err(e) => {
                println!("  {} Check {} ({}): {}", "✗".red(), check_num, browser, e);

                return Ok(TestResult {
                    name: scenario.name.clone(),
                    passed: false,
                    checks_run: check_num,
                    checks_total,
                    error: Some(e.to_string()),
                });
            }
        }
    }

    println!(
        "\n{} {}\n",
        "✓".green().bold(),
        "Test Passed".green().bold()
    );

    Ok(TestResult {
        name: scenario.name,
        passed: true,
        checks_run: checks_total,
        checks_total,
        error: None,
    })
}

/// Check one browser's capture, failing on request count or golden mismatch
fn check_browser(
    scenario: &TestScenario,
    browser: &str,
    captured: &Path,
    golden: &Path,
    options: &RunOptions<'_>,
    tally: &mut ExportTally,
) -> Result<GoldenOutcome> {
    let payload = otlp::read_payload(captured)?;
    let requests = otlp::count_export_requests(&payload);
    tally.record(browser, requests);

    tracing::debug!(
        scenario = %scenario.name,
        browser,
        requests,
        captured = %captured.display(),
        "Checking capture"
    );

    if let Some(expected) = scenario.expect_requests {
        if requests != expected {
            return Err(Error::TestAssertion(format!(
                "expected {} export requests, got {}",
                expected, requests
            )));
        }
    }

    match options.store.check(golden, &payload)? {
        GoldenOutcome::Failed(result) => Err(Error::TestAssertion(format!(
            "{} does not match:\n{}",
            golden.display(),
            result.message
        ))),
        outcome => Ok(outcome),
    }
}

fn print_outcome(check_num: usize, browser: &str, golden: &Path, outcome: &GoldenOutcome) {
    let note = match outcome {
        GoldenOutcome::Created => "golden created",
        GoldenOutcome::Matched => "matches golden",
        GoldenOutcome::Updated { .. } => "golden updated",
        GoldenOutcome::Failed(_) => "does not match golden",
    };
    println!(
        "  {} Check {}: {} {} {}",
        "✓".green(),
        check_num,
        browser,
        note,
        golden.display().to_string().dimmed()
    );
}
