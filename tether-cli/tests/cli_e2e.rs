//! End-to-end CLI tests that never reach the network: every scenario either
//! fails before fetching or has no matched files to fetch.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

fn tether_cmd() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("tether"));
    cmd.env("NO_COLOR", "1").env_remove("RUST_LOG");
    cmd
}

fn write_manifest(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("tether.yaml");
    fs::write(&path, body).expect("write manifest");
    path
}

const ONE_DECLARED: &str = "files:\n  lib/gone.js:\n    source:\n      git: { repo: https://github.com/o/r, commit: abc }\n";

#[test]
fn missing_manifest_is_an_error() {
    let dir = TempDir::new().expect("dir");
    tether_cmd()
        .arg(dir.path().join("absent.yaml"))
        .assert()
        .failure()
        .stderr(contains("manifest not found"));
}

#[test]
fn declared_file_missing_from_disk_fails_audit() {
    let dir = TempDir::new().expect("dir");
    let manifest = write_manifest(dir.path(), ONE_DECLARED);
    tether_cmd()
        .arg(&manifest)
        .assert()
        .code(1)
        .stdout(contains("Missing files"))
        .stdout(contains("lib/gone.js"))
        .stdout(contains("audit failed"));
}

#[test]
fn unexpected_file_only_warns_when_not_strict() {
    let dir = TempDir::new().expect("dir");
    fs::write(dir.path().join("stray.txt"), "?").expect("write");
    let manifest = write_manifest(dir.path(), "files: {}\n");
    tether_cmd()
        .arg(&manifest)
        .assert()
        .success()
        .stdout(contains("warning, not strict"))
        .stdout(contains("stray.txt"))
        .stdout(contains("audit passed"));
}

#[test]
fn unexpected_file_fails_when_strict() {
    let dir = TempDir::new().expect("dir");
    fs::write(dir.path().join("stray.txt"), "?").expect("write");
    let manifest = write_manifest(dir.path(), "strict: true\nfiles: {}\n");
    tether_cmd()
        .arg(&manifest)
        .assert()
        .code(1)
        .stdout(contains("Unexpected files (strict mode)"))
        .stdout(contains("audit failed"));
}

#[test]
fn allowed_extra_is_not_reported() {
    let dir = TempDir::new().expect("dir");
    fs::write(dir.path().join("README.md"), "docs").expect("write");
    let manifest = write_manifest(
        dir.path(),
        "strict: true\nallowedExtra: [README.md]\nfiles: {}\n",
    );
    tether_cmd()
        .arg(&manifest)
        .assert()
        .success()
        .stdout(contains("Unexpected files").not());
}

#[test]
fn unsupported_source_is_rejected() {
    let dir = TempDir::new().expect("dir");
    let manifest = write_manifest(
        dir.path(),
        "files:\n  a.js:\n    source:\n      svn: { url: \"svn://example\" }\n",
    );
    tether_cmd()
        .arg(&manifest)
        .assert()
        .failure()
        .stderr(contains("unsupported source 'svn'"));
}

#[test]
fn dry_run_requires_sync() {
    let dir = TempDir::new().expect("dir");
    let manifest = write_manifest(dir.path(), "files: {}\n");
    tether_cmd()
        .arg(&manifest)
        .arg("--dry-run")
        .assert()
        .failure()
        .stderr(contains("--sync"));
}

#[test]
fn patches_conflicts_with_sync() {
    let dir = TempDir::new().expect("dir");
    let manifest = write_manifest(dir.path(), "files: {}\n");
    tether_cmd()
        .arg(&manifest)
        .args(["--sync", "--patches"])
        .assert()
        .failure();
}

#[test]
fn sync_with_no_declared_files_has_nothing_to_do() {
    let dir = TempDir::new().expect("dir");
    let manifest = write_manifest(dir.path(), "files: {}\n");
    tether_cmd()
        .arg(&manifest)
        .arg("--sync")
        .assert()
        .success()
        .stdout(contains("nothing to do"));
}

#[test]
fn patches_flag_without_divergence_writes_no_side_file() {
    let dir = TempDir::new().expect("dir");
    let manifest = write_manifest(dir.path(), "files: {}\n");
    tether_cmd()
        .arg(&manifest)
        .arg("--patches")
        .assert()
        .success();
    assert!(!dir.path().join("tether.patches.yaml").exists());
}

#[test]
fn malformed_manifest_is_a_parse_error() {
    let dir = TempDir::new().expect("dir");
    let manifest = write_manifest(dir.path(), "files: [not, a, map]\n");
    tether_cmd()
        .arg(&manifest)
        .assert()
        .failure()
        .stderr(contains("failed to parse manifest"));
}

#[test]
fn unknown_top_level_key_is_rejected() {
    let dir = TempDir::new().expect("dir");
    let manifest = write_manifest(dir.path(), "files: {}\nstrictt: true\n");
    tether_cmd()
        .arg(&manifest)
        .assert()
        .failure()
        .stderr(contains("strictt"));
}
