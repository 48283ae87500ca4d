//! CLI integration tests: argument validation happens before any
//! parsing, and user errors come back as clean messages.

use assert_cmd::Command;
use predicates::prelude::*;

fn dat2lta() -> Command {
    Command::cargo_bin("dat2lta").expect("binary builds")
}

#[test]
fn missing_file_is_a_user_error() {
    dat2lta()
        .args(["convert", "does-not-exist.dat", "--layout", "v2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does-not-exist.dat"));
}

#[test]
fn layout_is_required() {
    dat2lta()
        .args(["convert", "some.dat"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--layout"));
}

#[test]
fn invalid_layout_is_rejected() {
    dat2lta()
        .args(["convert", "some.dat", "--layout", "v3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn help_lists_subcommands() {
    dat2lta()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("convert"))
        .stdout(predicate::str::contains("info"));
}

#[test]
fn truncated_input_aborts_with_decode_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("broken.dat");
    // shorter than the fixed-size header
    std::fs::write(&path, [0u8; 16]).expect("write fixture");

    dat2lta()
        .args(["info", path.to_str().expect("utf-8 path"), "--layout", "v2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot decode"));
}
