//! E2E tests for the doc-link-guardian CLI

#![allow(deprecated)] // cargo_bin deprecation - will update when assert_cmd stabilizes replacement

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

fn guardian() -> Command {
    Command::cargo_bin("doc-link-guardian").unwrap()
}

#[test]
fn test_help() {
    guardian()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("check"))
        .stdout(predicate::str::contains("url"));
}

#[test]
fn test_check_help() {
    guardian()
        .args(["check", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--workers"))
        .stdout(predicate::str::contains("--skip-external"))
        .stdout(predicate::str::contains("--site-host"));
}

#[test]
fn test_clean_site_exits_zero() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("index.html"), r#"<a href="about.html">About</a>"#).unwrap();
    fs::write(dir.path().join("about.html"), r#"<a href="/">Home</a>"#).unwrap();

    guardian()
        .arg("check")
        .arg(dir.path())
        .arg("--skip-external")
        .assert()
        .code(0)
        .stdout(predicate::str::contains("No broken links found"));
}

#[test]
fn test_broken_link_exits_one() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("index.html"), r#"<a href="/01-intro">Intro</a>"#).unwrap();

    guardian()
        .arg("check")
        .arg(dir.path())
        .arg("--skip-external")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("/01-intro"))
        .stdout(predicate::str::contains("/docs/01-intro"));
}

#[test]
fn test_json_to_stdout() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("index.html"), r##"<h2>Intro</h2><a href="#nope">x</a>"##).unwrap();

    let output = guardian()
        .arg("check")
        .arg(dir.path())
        .args(["--skip-external", "--json", "-"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["stats"]["broken_links"], 1);
    assert_eq!(report["broken"][0]["error"], "Anchor not found in file");
}

#[test]
fn test_csv_export() {
    let dir = tempdir().unwrap();
    let site = dir.path().join("site");
    fs::create_dir_all(&site).unwrap();
    fs::write(site.join("index.html"), r#"<a href="missing.html">x</a>"#).unwrap();
    let csv = dir.path().join("broken.csv");

    guardian()
        .arg("check")
        .arg(&site)
        .arg("--skip-external")
        .arg("--csv")
        .arg(&csv)
        .assert()
        .code(1);

    let contents = fs::read_to_string(csv).unwrap();
    assert!(contents.starts_with("url,kind,status_code,error"));
    assert!(contents.contains("missing.html,internal"));
}

#[test]
fn test_missing_build_dir_exits_two() {
    let dir = tempdir().unwrap();
    guardian()
        .arg("check")
        .arg(dir.path().join("does-not-exist"))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Error"));
}
