//! End-to-end tests for the otel-golden CLI
//!
//! Each test runs the built binary inside its own temporary directory with
//! a config path that does not exist, so user settings never leak in.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde_json::{json, Value};
use tempfile::TempDir;

/// Test context with an isolated working directory
struct TestContext {
    dir: TempDir,
    fixtures_dir: PathBuf,
    config_path: PathBuf,
}

/// Output from a CLI invocation
struct CliOutput {
    stdout: String,
    stderr: String,
    success: bool,
}

impl TestContext {
    fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let config_path = dir.path().join("config.toml");
        let fixtures_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests")
            .join("fixtures");
        Self {
            dir,
            fixtures_dir,
            config_path,
        }
    }

    fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    fn fixture(&self, name: &str) -> Value {
        let text = fs::read_to_string(self.fixtures_dir.join(name)).expect("Failed to read fixture");
        serde_json::from_str(&text).expect("Fixture is not valid JSON")
    }

    /// Write a JSON document under the temp dir, creating parent directories
    fn write_json(&self, relative: &str, value: &Value) -> PathBuf {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dir");
        }
        fs::write(&path, serde_json::to_string_pretty(value).unwrap()).expect("Failed to write JSON");
        path
    }

    fn write_text(&self, relative: &str, text: &str) -> PathBuf {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dir");
        }
        fs::write(&path, text).expect("Failed to write file");
        path
    }

    fn run(&self, args: &[&str]) -> CliOutput {
        self.run_with_env(args, &[])
    }

    fn run_with_env(&self, args: &[&str], env: &[(&str, &str)]) -> CliOutput {
        let mut command = Command::new(env!("CARGO_BIN_EXE_otel-golden"));
        command
            .args(args)
            .current_dir(self.dir.path())
            .env("OTEL_GOLDEN_CONFIG", &self.config_path)
            .env("NO_COLOR", "1")
            .env_remove("OTEL_GOLDEN_UPDATE")
            .env_remove("RUST_LOG");
        for (key, value) in env {
            command.env(key, value);
        }

        let output = command.output().expect("Failed to run otel-golden");
        CliOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
        }
    }
}

fn arg(path: &Path) -> &str {
    path.to_str().expect("Temp path is not UTF-8")
}

/// Click capture with the `x` attribute of the first span set to `x`
fn click_with_x(ctx: &TestContext, x: i64) -> Value {
    let mut value = ctx.fixture("click_spans.json");
    *value
        .pointer_mut("/resourceSpans/0/scopeSpans/0/spans/0/attributes/1/value")
        .unwrap() = json!({ "intValue": x.to_string() });
    value
}

// ============== compare ==============

#[test]
fn test_compare_identical_payloads() {
    let ctx = TestContext::new();
    let received = ctx.write_json("received.json", &ctx.fixture("click_spans.json"));
    let expected = ctx.write_json("expected.json", &ctx.fixture("click_spans.json"));

    let output = ctx.run(&["compare", arg(&received), arg(&expected)]);
    assert!(output.success, "stdout: {}\nstderr: {}", output.stdout, output.stderr);
    assert!(output.stdout.contains("received telemetry matches expected"));
}

#[test]
fn test_compare_reports_attribute_mismatch() {
    let ctx = TestContext::new();
    let received = ctx.write_json("received.json", &click_with_x(&ctx, 2));
    let expected = ctx.write_json("expected.json", &click_with_x(&ctx, 1));

    let output = ctx.run(&["compare", arg(&received), arg(&expected)]);
    assert!(!output.success);
    assert!(
        output.stdout.contains(r#"attribute "x" expected 1, got 2"#),
        "stdout: {}",
        output.stdout
    );
    assert!(output.stderr.contains("Error:"), "stderr: {}", output.stderr);
}

#[test]
fn test_compare_all_lists_every_mismatch() {
    let ctx = TestContext::new();
    let mut changed = click_with_x(&ctx, 2);
    *changed
        .pointer_mut("/resourceSpans/0/scopeSpans/0/spans/1/name")
        .unwrap() = json!("submit");
    let received = ctx.write_json("received.json", &changed);
    let expected = ctx.write_json("expected.json", &ctx.fixture("click_spans.json"));

    let output = ctx.run(&["compare", "--all", arg(&received), arg(&expected)]);
    assert!(!output.success);
    assert!(output.stdout.contains("2 mismatches:"), "stdout: {}", output.stdout);
    assert!(output.stdout.contains("span[1]: field 'name'"));
}

#[test]
fn test_compare_rejects_invalid_payload() {
    let ctx = TestContext::new();
    let received = ctx.write_json("received.json", &json!({ "resourceSpans": "nope" }));
    let expected = ctx.write_json("expected.json", &ctx.fixture("click_spans.json"));

    let output = ctx.run(&["compare", arg(&received), arg(&expected)]);
    assert!(!output.success);
    assert!(
        output.stderr.contains("Invalid telemetry payload"),
        "stderr: {}",
        output.stderr
    );
}

#[test]
fn test_compare_honors_configured_ignored_attributes() {
    let ctx = TestContext::new();
    ctx.write_text(
        "config.toml",
        "[compare]\nignored_attributes = [\"x\"]\n",
    );
    let received = ctx.write_json("received.json", &click_with_x(&ctx, 7));
    let expected = ctx.write_json("expected.json", &click_with_x(&ctx, 1));

    let output = ctx.run(&["compare", arg(&received), arg(&expected)]);
    assert!(output.success, "stdout: {}\nstderr: {}", output.stdout, output.stderr);
}

// ============== check ==============

#[test]
fn test_check_creates_missing_golden() {
    let ctx = TestContext::new();
    let received = ctx.write_json("received.json", &ctx.fixture("click_spans.json"));
    let golden = ctx.path("golden/click/chromium.json");

    let output = ctx.run(&["check", arg(&received), "--golden", arg(&golden)]);
    assert!(output.success, "stdout: {}\nstderr: {}", output.stdout, output.stderr);
    assert!(output.stdout.contains("Created golden file"));

    let written: Value = serde_json::from_str(&fs::read_to_string(&golden).unwrap()).unwrap();
    assert_eq!(written, ctx.fixture("click_spans.json"));

    let output = ctx.run(&["check", arg(&received), "--golden", arg(&golden)]);
    assert!(output.success);
    assert!(output.stdout.contains("Matches"));
}

#[test]
fn test_check_mismatch_leaves_golden_untouched() {
    let ctx = TestContext::new();
    let golden = ctx.write_json("golden.json", &click_with_x(&ctx, 1));
    let received = ctx.write_json("received.json", &click_with_x(&ctx, 2));

    let output = ctx.run(&["check", arg(&received), "-g", arg(&golden)]);
    assert!(!output.success);
    assert!(output.stderr.contains("does not match golden file"));

    let kept: Value = serde_json::from_str(&fs::read_to_string(&golden).unwrap()).unwrap();
    assert_eq!(kept, click_with_x(&ctx, 1));
}

#[test]
fn test_check_update_mode_rewrites_golden() {
    let ctx = TestContext::new();
    let golden = ctx.write_json("golden.json", &click_with_x(&ctx, 1));
    let received = ctx.write_json("received.json", &click_with_x(&ctx, 2));

    let output = ctx.run_with_env(
        &["check", arg(&received), "-g", arg(&golden)],
        &[("OTEL_GOLDEN_UPDATE", "1")],
    );
    assert!(output.success, "stdout: {}\nstderr: {}", output.stdout, output.stderr);
    assert!(output.stdout.contains("Updated golden file"));

    let rewritten: Value = serde_json::from_str(&fs::read_to_string(&golden).unwrap()).unwrap();
    assert_eq!(rewritten, click_with_x(&ctx, 2));
}

#[test]
fn test_check_corrupt_golden_needs_update_mode() {
    let ctx = TestContext::new();
    let golden = ctx.write_text("golden.json", "{ not json");
    let received = ctx.write_json("received.json", &ctx.fixture("console_logs.json"));

    let output = ctx.run(&["check", arg(&received), "-g", arg(&golden)]);
    assert!(!output.success);
    assert!(
        output.stderr.contains("not a valid telemetry document"),
        "stderr: {}",
        output.stderr
    );

    let output = ctx.run(&["check", "--update", arg(&received), "-g", arg(&golden)]);
    assert!(output.success, "stdout: {}\nstderr: {}", output.stdout, output.stderr);
    let rewritten: Value = serde_json::from_str(&fs::read_to_string(&golden).unwrap()).unwrap();
    assert_eq!(rewritten, ctx.fixture("console_logs.json"));
}

// ============== test ==============

fn write_scenario(ctx: &TestContext, extra: &str) -> PathBuf {
    ctx.write_json("captures/chromium.json", &ctx.fixture("click_spans.json"));
    ctx.write_json("captures/firefox.json", &ctx.fixture("click_spans.json"));
    ctx.write_text(
        "scenarios/click.yml",
        &format!(
            "name: click\n\
             description: Button click produces app and fetch spans\n\
             browsers: [chromium, firefox]\n\
             captured: ../captures/{{browser}}.json\n\
             golden_dir: ../golden\n\
             {}",
            extra
        ),
    )
}

#[test]
fn test_scenario_creates_then_matches_goldens() {
    let ctx = TestContext::new();
    let scenario = write_scenario(&ctx, "expect_requests: 1\n");

    let output = ctx.run(&["test", arg(&scenario)]);
    assert!(output.success, "stdout: {}\nstderr: {}", output.stdout, output.stderr);
    assert!(output.stdout.contains("golden created"));
    assert!(output.stdout.contains("1 passed, 0 failed, 2 export requests checked"));
    assert!(ctx.path("golden/click/chromium.json").exists());
    assert!(ctx.path("golden/click/firefox.json").exists());

    let output = ctx.run(&["test", arg(&scenario)]);
    assert!(output.success, "stdout: {}\nstderr: {}", output.stdout, output.stderr);
    assert!(output.stdout.contains("matches golden"));
}

#[test]
fn test_scenario_fails_on_golden_mismatch() {
    let ctx = TestContext::new();
    let scenario = write_scenario(&ctx, "");
    ctx.write_json("golden/click/chromium.json", &click_with_x(&ctx, 5));

    let output = ctx.run(&["test", arg(&scenario)]);
    assert!(!output.success);
    assert!(output.stdout.contains("0 passed, 1 failed"), "stdout: {}", output.stdout);
    assert!(output.stdout.contains(r#"attribute "x" expected 5, got 1"#));
    assert!(!ctx.path("golden/click/firefox.json").exists());
}

#[test]
fn test_scenario_checks_request_count() {
    let ctx = TestContext::new();
    let scenario = write_scenario(&ctx, "expect_requests: 3\n");

    let output = ctx.run(&["test", arg(&scenario)]);
    assert!(!output.success);
    assert!(
        output.stdout.contains("expected 3 export requests, got 1"),
        "stdout: {}",
        output.stdout
    );
}

#[test]
fn test_scenario_setup_runs_before_checks() {
    let ctx = TestContext::new();
    ctx.write_json("logs.json", &ctx.fixture("console_logs.json"));
    let scenario = ctx.write_text(
        "scenarios/logs.yml",
        "name: logs\n\
         setup:\n  - shell: mkdir -p ../captures && cp ../logs.json ../captures/webkit.json\n\
         browsers: [webkit]\n\
         captured: ../captures/{browser}.json\n\
         golden_dir: ../golden\n\
         expect_requests: 2\n",
    );

    let output = ctx.run(&["test", arg(&scenario)]);
    assert!(output.success, "stdout: {}\nstderr: {}", output.stdout, output.stderr);
    assert!(ctx.path("golden/logs/webkit.json").exists());
}

#[test]
fn test_scenario_given_as_bare_file_name() {
    let ctx = TestContext::new();
    ctx.write_json("logs.json", &ctx.fixture("console_logs.json"));
    ctx.write_text(
        "logs.yml",
        "name: logs\n\
         setup:\n  - shell: cp logs.json webkit.json\n\
         browsers: [webkit]\n\
         captured: webkit.json\n\
         golden_dir: golden\n",
    );

    let output = ctx.run(&["test", "logs.yml"]);
    assert!(output.success, "stdout: {}\nstderr: {}", output.stdout, output.stderr);
    assert!(ctx.path("webkit.json").exists());
    assert!(ctx.path("golden/logs/webkit.json").exists());
}

#[test]
fn test_scenario_failed_setup_reports_command() {
    let ctx = TestContext::new();
    let scenario = ctx.write_text(
        "scenarios/broken.yml",
        "name: broken\n\
         setup:\n  - shell: exit 3\n\
         browsers: [chromium]\n\
         captured: capture.json\n",
    );

    let output = ctx.run(&["test", arg(&scenario)]);
    assert!(!output.success);
    assert!(output.stdout.contains("Setup command 'exit 3' failed"), "stdout: {}", output.stdout);
}

#[test]
fn test_scenario_rejects_unknown_fields() {
    let ctx = TestContext::new();
    let scenario = ctx.write_text(
        "scenarios/typo.yml",
        "name: typo\nbrowser: [chromium]\ncaptured: capture.json\n",
    );

    let output = ctx.run(&["test", arg(&scenario)]);
    assert!(!output.success);
    assert!(output.stderr.contains("typo.yml"), "stderr: {}", output.stderr);
}

// ============== config ==============

#[test]
fn test_config_shows_defaults() {
    let ctx = TestContext::new();
    let output = ctx.run(&["config"]);
    assert!(output.success);
    assert!(output.stdout.contains("not found, using defaults"));
    assert!(output.stdout.contains("session.id"));
    assert!(output.stdout.contains("@opentelemetry/instrumentation-fetch"));
    assert!(output.stdout.contains("Update mode: false"));
}

#[test]
fn test_config_reads_env_update_flag() {
    let ctx = TestContext::new();
    let output = ctx.run_with_env(&["config"], &[("OTEL_GOLDEN_UPDATE", "yes")]);
    assert!(output.success);
    assert!(output.stdout.contains("Update mode: true"));
}
