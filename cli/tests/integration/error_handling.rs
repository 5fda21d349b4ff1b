//! Error handling integration tests for gcp CLI.
//!
//! These tests verify that failures never damage existing data:
//! - An existing destination is left untouched without -f
//! - A directory is never replaced by a file
//! - Error codes and exit statuses are stable

#[path = "../common/mod.rs"]
mod common;

use assert_cmd::cargo::cargo_bin_cmd;
use common::TestFixture;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;

/// Without -f an existing destination is an error and keeps its content.
#[test]
fn test_existing_destination_is_preserved() {
    let fx = TestFixture::new();
    let src = fx.write("src.txt", "new");
    let dst = fx.write("dst.txt", "precious");

    let mut cmd = cargo_bin_cmd!("gcp");
    cmd.arg(&src)
        .arg(&dst)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("error[already_exists]"))
        .stderr(predicate::str::contains(
            "Failed to copy: Destination already exists",
        ));

    fx.assert_file_content(&dst, b"precious");
}

#[test]
fn test_source_not_found() {
    let fx = TestFixture::new();
    let dst = fx.path("dst.txt");

    let mut cmd = cargo_bin_cmd!("gcp");
    cmd.arg(fx.path("nonexistent.txt"))
        .arg(&dst)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("error[source_not_found]"));

    assert!(!dst.exists());
}

/// With -f the old destination is cleared first, so a missing source leaves
/// neither file behind.
#[test]
fn test_force_clears_destination_before_opening_source() {
    let fx = TestFixture::new();
    let dst = fx.write("dst.txt", "old");

    let mut cmd = cargo_bin_cmd!("gcp");
    cmd.arg("-f")
        .arg(fx.path("nonexistent.txt"))
        .arg(&dst)
        .assert()
        .failure()
        .stderr(predicate::str::contains("error[source_not_found]"));

    assert!(!dst.exists());
    assert_eq!(fx.entry_count(), 0);
}

#[test]
fn test_source_directory_is_invalid_input() {
    let fx = TestFixture::new();
    let src = fx.path("srcdir");
    fs::create_dir(&src).unwrap();
    let dst = fx.path("dst");

    let mut cmd = cargo_bin_cmd!("gcp");
    cmd.arg(&src)
        .arg(&dst)
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("error[invalid_input]"));

    assert!(!dst.exists());
}

/// Replacing a directory with a file must fail and keep the directory.
#[test]
fn test_force_never_replaces_directory() {
    let fx = TestFixture::new();
    let src = fx.write("src.txt", "file content");
    let dst = fx.path("dstdir");
    fs::create_dir(&dst).unwrap();
    fs::write(dst.join("inside.txt"), "inside content").unwrap();

    let mut cmd = cargo_bin_cmd!("gcp");
    cmd.arg("-f").arg(&src).arg(&dst).assert().failure();

    assert!(dst.is_dir(), "Directory should still exist");
    assert_eq!(
        fs::read_to_string(dst.join("inside.txt")).unwrap(),
        "inside content"
    );
}

#[test]
fn test_missing_destination_parent() {
    let fx = TestFixture::new();
    let src = fx.write("src.txt", "content");
    let dst = fx.path("no/such/dir/dst.txt");

    let mut cmd = cargo_bin_cmd!("gcp");
    cmd.arg(&src)
        .arg(&dst)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("error[io_error]"));

    assert!(!dst.exists());
    assert!(src.exists());
}

#[test]
fn test_json_failure_record() {
    let fx = TestFixture::new();
    let src = fx.write("src.txt", "new");
    let dst = fx.write("dst.txt", "old");

    let mut cmd = cargo_bin_cmd!("gcp");
    let output = cmd
        .arg("--output")
        .arg("json")
        .arg(&src)
        .arg(&dst)
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let value: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["status"], "failed");
    assert_eq!(value["error_code"], "already_exists");
    assert!(
        value["error_message"]
            .as_str()
            .unwrap()
            .contains("already exists")
    );
}

#[test]
fn test_invalid_output_mode_is_usage_error() {
    let fx = TestFixture::new();
    let src = fx.write("src.txt", "content");

    let mut cmd = cargo_bin_cmd!("gcp");
    cmd.arg("--output")
        .arg("xml")
        .arg(&src)
        .arg(fx.path("dst.txt"))
        .assert()
        .failure()
        .code(2);
}

#[cfg(unix)]
#[test]
fn test_unreadable_source_is_permission_denied() {
    use std::os::unix::fs::PermissionsExt;

    let fx = TestFixture::new();
    let src = fx.write("secret.txt", "secret");
    fs::set_permissions(&src, fs::Permissions::from_mode(0o000)).unwrap();
    let dst = fx.path("dst.txt");

    // Root can read anything; nothing to check there
    if fs::read(&src).is_ok() {
        return;
    }

    let mut cmd = cargo_bin_cmd!("gcp");
    cmd.arg(&src)
        .arg(&dst)
        .assert()
        .failure()
        .stderr(predicate::str::contains("error[permission_denied]"));

    assert!(!dst.exists());
    fs::set_permissions(&src, fs::Permissions::from_mode(0o644)).unwrap();
}
