//! End-to-end tests for the `spec` binary
//!
//! Each test runs the binary against the fixtures under
//! `tests/fixtures/specs` and checks its exit status, its streams and the
//! JSON run plan it prints.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const SPECS: &str = "tests/fixtures/specs";

fn spec() -> Command {
    let mut cmd = Command::cargo_bin("spec").unwrap();
    cmd.env_remove("SPEC_LOG");
    cmd
}

fn fixture(name: &str) -> String {
    format!("{}/{}", SPECS, name)
}

/// Runs the binary and parses the run plan it prints
fn plan(args: &[&str]) -> Value {
    plan_in(Path::new("."), args)
}

fn plan_in(dir: &Path, args: &[&str]) -> Value {
    let output = spec()
        .current_dir(dir)
        .args(args)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    serde_json::from_slice(&output).unwrap()
}

/// A project directory holding `spec/a_spec.rb` and `spec/b_spec.rb`
fn project() -> TempDir {
    let dir = tempfile::Builder::new().prefix("project").tempdir().unwrap();
    fs::create_dir(dir.path().join("spec")).unwrap();
    for name in ["a_spec.rb", "b_spec.rb"] {
        fs::write(dir.path().join("spec").join(name), "describe \"x\" do\nend\n").unwrap();
    }
    dir
}

#[test]
fn test_help_exits_successfully() {
    spec()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Usage: spec (FILE|DIRECTORY|GLOB)+ [options]",
        ))
        .stdout(predicate::str::contains("--generate-options"));
}

#[test]
fn test_version() {
    spec()
        .arg("-v")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("spec "));
}

#[test]
fn test_no_files_exits_with_6() {
    spec()
        .assert()
        .code(6)
        .stderr(predicate::str::contains("No files specified."))
        .stderr(predicate::str::contains("Usage:"));
}

#[test]
fn test_unknown_option_is_a_usage_error() {
    spec()
        .args(["--frobnicate", SPECS])
        .assert()
        .code(64)
        .stderr(predicate::str::contains("--frobnicate"));
}

#[test]
fn test_default_plan() {
    let plan = plan(&[SPECS]);
    let config = &plan["configuration"];

    assert_eq!(config["formats"][0]["format"], "progress");
    assert_eq!(config["formats"].as_array().unwrap().len(), 1);
    assert_eq!(config["files"], serde_json::json!([SPECS]));

    assert_eq!(
        plan["spec_files"],
        serde_json::json!([fixture("queue_spec.rb"), fixture("stack_spec.rb")])
    );
}

#[test]
fn test_formats_and_requires_keep_order() {
    let plan = plan(&[
        "-f", "specdoc", "-r", "b", "-f", "html:report.html", "-r", "a", "-r", "b", SPECS,
    ]);
    let config = &plan["configuration"];

    let formats: Vec<&str> = config["formats"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["format"].as_str().unwrap())
        .collect();
    assert_eq!(formats, vec!["specdoc", "html"]);
    assert_eq!(config["requires"], serde_json::json!(["b", "a", "b"]));
}

#[test]
fn test_reverse_order() {
    let plan = plan(&["--reverse", SPECS]);
    assert_eq!(plan["configuration"]["reverse"], true);
}

#[test]
fn test_line_selects_example() {
    let plan = plan(&["--line", "2", &fixture("stack_spec.rb")]);
    let examples = &plan["configuration"]["examples"];
    assert_eq!(examples["names"], serde_json::json!(["is empty initially"]));
}

#[test]
fn test_line_inside_nested_group() {
    let plan = plan(&["-l", "17", &fixture("stack_spec.rb")]);
    let examples = &plan["configuration"]["examples"];
    assert_eq!(examples["names"], serde_json::json!(["pops the last item"]));
}

#[test]
fn test_line_on_directory_exits_with_1() {
    spec()
        .args(["--line", "3", SPECS])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("not a directory"));
}

#[test]
fn test_line_on_missing_file_exits_with_2() {
    spec()
        .args(["--line", "3", fixture("missing_spec.rb").as_str()])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn test_line_with_two_files_exits_with_3() {
    spec()
        .args([
            "--line",
            "3",
            fixture("stack_spec.rb").as_str(),
            fixture("queue_spec.rb").as_str(),
        ])
        .assert()
        .code(3);
}

#[test]
fn test_line_with_example_exits_with_4() {
    spec()
        .args(["--line", "5", "--example", "foo", fixture("stack_spec.rb").as_str()])
        .assert()
        .code(4)
        .stderr(predicate::str::contains(
            "You cannot use both --line and --example",
        ));
}

#[test]
fn test_options_file() {
    let plan = plan(&["--options", &fixture("spec.opts"), SPECS]);
    let config = &plan["configuration"];

    assert_eq!(config["formats"][0]["format"], "specdoc");
    assert_eq!(config["requires"], serde_json::json!(["spec_helper"]));
    assert_eq!(config["colour"], true);
}

#[test]
fn test_missing_options_file_exits_with_5() {
    spec()
        .args(["--options", fixture("missing.opts").as_str(), SPECS])
        .assert()
        .code(5)
        .stderr(predicate::str::contains("Could not read options file"));
}

#[test]
fn test_generated_options_replay_to_same_plan() {
    let dir = TempDir::new().unwrap();
    let opts = dir.path().join("generated.opts");
    let opts = opts.to_str().unwrap();

    let output = spec()
        .args(["-f", "specdoc", "-r", "helper", "-G", opts, "-b", SPECS])
        .assert()
        .success()
        .stderr(predicate::str::contains("Options written to"))
        .stderr(predicate::str::contains(format!("spec --options {}", opts)))
        .get_output()
        .stdout
        .clone();
    // Standard output holds nothing but the run plan
    let generated: Value = serde_json::from_slice(&output).unwrap();

    assert_eq!(
        fs::read_to_string(opts).unwrap(),
        format!("-f specdoc -r helper -b {}\n", SPECS)
    );

    let replayed = plan(&["--options", opts]);
    assert_eq!(replayed, generated);
}

#[test]
fn test_drb_without_server() {
    spec()
        .args(["--drb", SPECS])
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("No server is running"));
}

#[test]
fn test_pattern_filters_directory() {
    let plan = plan(&["--pattern", "**/queue_*.rb", SPECS]);
    assert_eq!(
        plan["spec_files"],
        serde_json::json!([fixture("queue_spec.rb")])
    );
}

#[test]
fn test_glob_with_leading_dot_slash() {
    let dir = project();

    let plain = plan_in(dir.path(), &["spec/*_spec.rb"]);
    let dotted = plan_in(dir.path(), &["./spec/*_spec.rb"]);

    assert_eq!(
        dotted["spec_files"],
        serde_json::json!(["spec/a_spec.rb", "spec/b_spec.rb"])
    );
    assert_eq!(dotted["spec_files"], plain["spec_files"]);
}

#[test]
fn test_named_file_and_glob_load_file_once() {
    let dir = project();

    let plan = plan_in(dir.path(), &["spec/a_spec.rb", "*/*_spec.rb", "./spec/a_spec.rb"]);
    assert_eq!(
        plan["spec_files"],
        serde_json::json!(["spec/a_spec.rb", "spec/b_spec.rb"])
    );
}

#[test]
fn test_dotted_directory_argument() {
    let dir = project();

    let plan = plan_in(dir.path(), &["./spec"]);
    assert_eq!(
        plan["spec_files"],
        serde_json::json!(["spec/a_spec.rb", "spec/b_spec.rb"])
    );
}
