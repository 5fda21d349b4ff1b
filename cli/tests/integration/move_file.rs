//! Move (-m) integration tests for gcp CLI.

#[path = "../common/mod.rs"]
mod common;

use assert_cmd::cargo::cargo_bin_cmd;
use common::{TestFixture, pattern};
use predicates::prelude::*;
use serde_json::Value;

#[test]
fn test_move_file() {
    let fx = TestFixture::new();
    let src = fx.write_pattern("src.bin", 300 * 1024);
    let dst = fx.path("dst.bin");

    let mut cmd = cargo_bin_cmd!("gcp");
    cmd.arg("-m")
        .arg(&src)
        .arg(&dst)
        .assert()
        .success()
        .stdout(predicate::str::contains("Moved"));

    assert!(!src.exists());
    fx.assert_file_content(&dst, &pattern(300 * 1024));
}

#[test]
fn test_move_onto_existing_without_force_keeps_both() {
    let fx = TestFixture::new();
    let src = fx.write("src.txt", "new");
    let dst = fx.write("dst.txt", "old");

    let mut cmd = cargo_bin_cmd!("gcp");
    cmd.arg("--move")
        .arg(&src)
        .arg(&dst)
        .assert()
        .failure()
        .stderr(predicate::str::contains("error[already_exists]"));

    fx.assert_file_content(&src, b"new");
    fx.assert_file_content(&dst, b"old");
}

#[test]
fn test_move_with_force() {
    let fx = TestFixture::new();
    let src = fx.write("src.txt", "new");
    let dst = fx.write("dst.txt", "old");

    let mut cmd = cargo_bin_cmd!("gcp");
    cmd.arg("-m").arg("-f").arg(&src).arg(&dst).assert().success();

    assert!(!src.exists());
    fx.assert_file_content(&dst, b"new");
}

#[test]
fn test_move_missing_source() {
    let fx = TestFixture::new();
    let dst = fx.path("dst.txt");

    let mut cmd = cargo_bin_cmd!("gcp");
    cmd.arg("-m")
        .arg(fx.path("gone.txt"))
        .arg(&dst)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Failed to move"));

    assert!(!dst.exists());
}

#[test]
fn test_move_json_output() {
    let fx = TestFixture::new();
    let src = fx.write("src.txt", "abc");
    let dst = fx.path("dst.txt");

    let mut cmd = cargo_bin_cmd!("gcp");
    let output = cmd
        .arg("-m")
        .arg("--output")
        .arg("json")
        .arg(&src)
        .arg(&dst)
        .output()
        .unwrap();

    assert!(output.status.success());
    let value: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["operation"], "move");
    assert_eq!(value["status"], "completed");
    assert_eq!(value["bytes"], 3);
}

/// Removing the source needs write access to its directory. When that is
/// denied the copy is rolled back and the source stays the only copy.
#[cfg(unix)]
#[test]
fn test_move_source_removal_denied_rolls_back() {
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    let fx = TestFixture::new();
    let locked = fx.path("locked");
    fs::create_dir(&locked).unwrap();
    let src = locked.join("src.txt");
    fs::write(&src, "stay").unwrap();
    let dst = fx.path("dst.txt");

    fs::set_permissions(&locked, fs::Permissions::from_mode(0o555)).unwrap();
    // Root ignores directory permissions; nothing to check there
    let probe = locked.join("probe");
    if fs::write(&probe, "").is_ok() {
        fs::remove_file(&probe).unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }

    let mut cmd = cargo_bin_cmd!("gcp");
    cmd.arg("-m")
        .arg(&src)
        .arg(&dst)
        .assert()
        .failure()
        .stderr(predicate::str::contains("error[permission_denied]"));

    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
    fx.assert_file_content(&src, b"stay");
    assert!(!dst.exists(), "destination rolled back");
}
