//! Smoke tests to verify the binary surface

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn top_level_help() {
    let mut cmd = Command::cargo_bin("taskwall").unwrap();
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Run the HTTP API server"));
}

#[test]
fn serve_help() {
    let mut cmd = Command::cargo_bin("taskwall").unwrap();
    cmd.arg("serve").arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Port to bind"))
        .stdout(predicate::str::contains("SQLite database"));
}

#[test]
fn unknown_subcommand_fails() {
    let mut cmd = Command::cargo_bin("taskwall").unwrap();
    cmd.arg("florp");

    cmd.assert().failure();
}
