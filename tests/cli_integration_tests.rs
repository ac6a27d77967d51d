//! CLI Integration Tests
//!
//! Runs the `pivot` binary directly using assert_cmd.

#![allow(deprecated)] // Command::cargo_bin deprecation - no stable replacement yet

mod common;

use assert_cmd::Command;
use common::{empty_workbook, paris_rome, read_report, write_file};
use predicates::prelude::*;
use tempfile::TempDir;

// ═══════════════════════════════════════════════════════════════════════════
// HELP AND VERSION TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_cli_help() {
    let mut cmd = Command::cargo_bin("pivot").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("pivot"))
        .stdout(predicate::str::contains("30+ Days"));
}

#[test]
fn test_cli_version() {
    let mut cmd = Command::cargo_bin("pivot").unwrap();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("pivot"));
}

#[test]
fn test_report_help() {
    let mut cmd = Command::cargo_bin("pivot").unwrap();
    cmd.args(["report", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--all-buckets"));
}

#[test]
fn test_server_help() {
    let mut cmd = Command::cargo_bin("pivot-server").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("/api/v1/report"));
}

// ═══════════════════════════════════════════════════════════════════════════
// REPORT COMMAND
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_report_writes_output() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("bookings.xlsx");
    let output = dir.path().join("aging.xlsx");
    write_file(&input, &paris_rome());

    let mut cmd = Command::cargo_bin("pivot").unwrap();
    cmd.env("NO_COLOR", "1")
        .arg("report")
        .arg(&input)
        .args(["--date", "2024-01-15", "-o"])
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Report ready"))
        .stdout(predicate::str::contains("Counted: 3"));

    let bytes = std::fs::read(&output).unwrap();
    let rows = read_report(&bytes, "Report");
    assert_eq!(rows.last().unwrap()[0], "Grand Total");
    assert_eq!(rows.last().unwrap().last().unwrap(), "3");
}

#[test]
fn test_report_default_name_in_working_dir() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("bookings.xlsx");
    write_file(&input, &paris_rome());

    let mut cmd = Command::cargo_bin("pivot").unwrap();
    cmd.current_dir(dir.path())
        .args(["report", "bookings.xlsx", "--date", "2024-01-15", "--prefix", "Aging"])
        .assert()
        .success();

    let written: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .filter(|n| n.starts_with("Aging-"))
        .collect();
    assert_eq!(written.len(), 1);
    assert!(written[0].ends_with(".xlsx"));
}

#[test]
fn test_report_without_date_fails() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("bookings.xlsx");
    write_file(&input, &paris_rome());

    let mut cmd = Command::cargo_bin("pivot").unwrap();
    cmd.arg("report")
        .arg(&input)
        .assert()
        .failure()
        .stdout(predicate::str::contains("No file or date selected"));
}

#[test]
fn test_report_empty_sheet_fails() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("empty.xlsx");
    write_file(&input, &empty_workbook());

    let mut cmd = Command::cargo_bin("pivot").unwrap();
    cmd.arg("report")
        .arg(&input)
        .args(["--date", "2024-01-15"])
        .current_dir(dir.path())
        .assert()
        .failure()
        .stdout(predicate::str::contains("No valid data found in the file."));
}

// ═══════════════════════════════════════════════════════════════════════════
// PREVIEW COMMAND
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_preview_prints_table() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("bookings.xlsx");
    write_file(&input, &paris_rome());

    let mut cmd = Command::cargo_bin("pivot").unwrap();
    cmd.arg("preview")
        .arg(&input)
        .args(["-d", "2024-01-15"])
        .assert()
        .success()
        .stdout(predicate::str::contains("14 Days"))
        .stdout(predicate::str::contains("Paris"))
        .stdout(predicate::str::contains("Rome"));
}

#[test]
fn test_preview_missing_file_fails() {
    let mut cmd = Command::cargo_bin("pivot").unwrap();
    cmd.args(["preview", "does-not-exist.xlsx", "-d", "2024-01-15"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Error reading the file"));
}
