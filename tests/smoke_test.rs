//! Smoke tests for the tw CLI.
//!
//! These tests verify basic CLI functionality:
//! - `tw --version` outputs version info
//! - `tw --help` lists the commands
//! - `tw types` outputs valid JSON

mod common;

use common::TestEnv;
use predicates::prelude::*;

#[test]
fn test_version_flag() {
    TestEnv::new()
        .tw()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("tw"))
        .stdout(predicate::str::contains("0.1.0"));
}

#[test]
fn test_help_flag() {
    TestEnv::new()
        .tw()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("resolve"))
        .stdout(predicate::str::contains("classify"));
}

#[test]
fn test_no_command_is_an_error() {
    TestEnv::new().tw().assert().failure();
}

#[test]
fn test_types_outputs_json() {
    let output = TestEnv::new().tw().arg("types").output().unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let types = json["types"].as_array().unwrap();
    assert_eq!(types.len(), 10);

    let project = types.iter().find(|t| t["type"] == "project").unwrap();
    assert_eq!(project["parent"], "program");
    assert_eq!(project["child"], "usecase");

    let bug = types.iter().find(|t| t["type"] == "bug").unwrap();
    assert!(bug["parent"].is_null());
    assert!(bug["child"].is_null());
}

#[test]
fn test_types_human_readable() {
    TestEnv::new()
        .tw()
        .args(["types", "-H"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "client → program → project → usecase → userstory → task → subtask",
        ));
}
