//! Basic functionality integration tests for gcp CLI.

#[path = "../common/mod.rs"]
mod common;

use assert_cmd::cargo::cargo_bin_cmd;
use common::{TestFixture, pattern};
use predicates::prelude::*;
use serde_json::Value;

#[test]
fn test_basic_file_copy() {
    let fx = TestFixture::new();
    let src = fx.write("test.txt", "hello world");
    let dst = fx.path("copy.txt");

    let mut cmd = cargo_bin_cmd!("gcp");
    cmd.arg(&src)
        .arg(&dst)
        .assert()
        .success()
        .stdout(predicate::str::contains("Copied"));

    fx.assert_file_content(&dst, b"hello world");
    fx.assert_file_content(&src, b"hello world");
}

#[test]
fn test_copy_empty_file() {
    let fx = TestFixture::new();
    let src = fx.write("empty", "");
    let dst = fx.path("empty.copy");

    let mut cmd = cargo_bin_cmd!("gcp");
    cmd.arg(&src).arg(&dst).assert().success();

    fx.assert_file_content(&dst, b"");
}

#[test]
fn test_copy_larger_than_buffer() {
    let fx = TestFixture::new();
    let src = fx.write_pattern("big.bin", 1024 * 1024 + 3);
    let dst = fx.path("big.copy");

    let mut cmd = cargo_bin_cmd!("gcp");
    cmd.arg("--buffer-size")
        .arg("4096")
        .arg("--no-sync")
        .arg(&src)
        .arg(&dst)
        .assert()
        .success();

    fx.assert_file_content(&dst, &pattern(1024 * 1024 + 3));
}

#[test]
fn test_force_replaces_existing_destination() {
    let fx = TestFixture::new();
    let src = fx.write("new.txt", "new content");
    let dst = fx.write("old.txt", "old content that is longer");

    let mut cmd = cargo_bin_cmd!("gcp");
    cmd.arg("-f").arg(&src).arg(&dst).assert().success();

    fx.assert_file_content(&dst, b"new content");
}

#[test]
fn test_quiet_mode() {
    let fx = TestFixture::new();
    let src = fx.write("a.txt", "content");
    let dst = fx.path("b.txt");

    let mut cmd = cargo_bin_cmd!("gcp");
    cmd.arg("-q")
        .arg(&src)
        .arg(&dst)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    assert!(dst.exists());
}

#[test]
fn test_verbose_mode_reports_timing() {
    let fx = TestFixture::new();
    let src = fx.write("a.txt", "content");
    let dst = fx.path("b.txt");

    let mut cmd = cargo_bin_cmd!("gcp");
    cmd.arg("-v")
        .arg(&src)
        .arg(&dst)
        .assert()
        .success()
        .stdout(predicate::str::contains("Time:"));
}

#[test]
fn test_json_output() {
    let fx = TestFixture::new();
    let src = fx.write("a.txt", "twelve bytes");
    let dst = fx.path("b.txt");

    let mut cmd = cargo_bin_cmd!("gcp");
    let output = cmd
        .arg("--output")
        .arg("json")
        .arg(&src)
        .arg(&dst)
        .output()
        .unwrap();

    assert!(output.status.success());
    let value: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["schema_version"], "1.0");
    assert_eq!(value["operation"], "copy");
    assert_eq!(value["status"], "completed");
    assert_eq!(value["bytes"], 12);
}

#[test]
fn test_help_lists_options() {
    let mut cmd = cargo_bin_cmd!("gcp");
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--move"))
        .stdout(predicate::str::contains("--cancel-timeout-ms"))
        .stdout(predicate::str::contains("--fault-timeout-ms"));
}

#[test]
fn test_missing_operand_is_usage_error() {
    let fx = TestFixture::new();
    let src = fx.write("a.txt", "content");

    let mut cmd = cargo_bin_cmd!("gcp");
    cmd.arg(&src).assert().failure().code(2);
}
