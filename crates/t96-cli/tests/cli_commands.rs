//! Integration tests for the t96 CLI commands.
#![allow(deprecated)] // Command::cargo_bin – macro replacement not yet stable

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn t96() -> Command {
    let mut cmd = Command::cargo_bin("t96").unwrap();
    cmd.env("NO_COLOR", "1");
    cmd
}

fn script(dir: &TempDir, lines: &str) -> std::path::PathBuf {
    let path = dir.path().join("session.txt");
    fs::write(&path, lines).unwrap();
    path
}

// ---------------------------------------------------------------------------
// help
// ---------------------------------------------------------------------------

#[test]
fn help_lists_subcommands() {
    t96()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("play"))
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("inspect"));
}

// ---------------------------------------------------------------------------
// run
// ---------------------------------------------------------------------------

#[test]
fn run_lists_root_in_free_play() {
    let dir = TempDir::new().unwrap();
    let path = script(&dir, "# look around\nls\n");
    t96()
        .args(["run", "--skip-tutorial"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Directory: /"))
        .stdout(predicate::str::contains("storage"))
        .stdout(predicate::str::contains("1 commands"));
}

#[test]
fn run_reads_stdin() {
    t96()
        .args(["run", "--skip-tutorial", "-"])
        .write_stdin("status\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("SYSTEM STATUS"));
}

#[test]
fn run_starts_with_onboarding() {
    t96()
        .args(["run", "-"])
        .write_stdin("ls\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("files/"));
}

#[test]
fn run_json_emits_one_object_per_command() {
    let output = t96()
        .args(["run", "--skip-tutorial", "--json", "-"])
        .write_stdin("ls\nstatus\n")
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let records: Vec<serde_json::Value> = stdout.lines().map(|l| serde_json::from_str(l).unwrap()).collect();
    // boot record plus one per command
    assert_eq!(records.len(), 3);
    assert_eq!(records[1]["input"], "ls");
    assert_eq!(records[2]["input"], "status");
    assert!(records[2]["output"].as_array().is_some_and(|lines| !lines.is_empty()));
    assert!(records[2]["state"]["detection"].as_u64().is_some());
}

#[test]
fn run_is_deterministic_for_a_seed() {
    let run = || {
        t96()
            .args(["run", "--skip-tutorial", "--seed", "42", "-"])
            .write_stdin("ls\ncd storage\nls\nstatus\nxyzzy\n")
            .output()
            .unwrap()
            .stdout
    };
    assert_eq!(run(), run());
}

#[test]
fn run_logs_script_lifecycle_when_asked() {
    t96()
        .env("RUST_LOG", "info")
        .args(["run", "--skip-tutorial", "-"])
        .write_stdin("status\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("script_started"))
        .stderr(predicate::str::contains("script_finished"));
}

#[test]
fn run_stays_quiet_on_stderr_by_default() {
    t96()
        .env_remove("RUST_LOG")
        .args(["run", "--skip-tutorial", "-"])
        .write_stdin("ls\n")
        .assert()
        .success()
        .stderr(predicate::str::is_empty());
}

#[test]
fn run_missing_script_fails() {
    t96()
        .args(["run", "/nonexistent/script.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}

// ---------------------------------------------------------------------------
// save / inspect
// ---------------------------------------------------------------------------

#[test]
fn run_save_then_inspect() {
    let dir = TempDir::new().unwrap();
    let save = dir.path().join("run.json");
    t96()
        .args(["run", "--skip-tutorial", "--seed", "7", "--save"])
        .arg(&save)
        .arg("-")
        .write_stdin("cd storage\n")
        .assert()
        .success();
    assert!(save.exists());

    t96()
        .arg("inspect")
        .arg(&save)
        .assert()
        .success()
        .stdout(predicate::str::contains("Seed"))
        .stdout(predicate::str::contains("/storage"))
        .stdout(predicate::str::contains("in progress"));
}

#[test]
fn inspect_missing_file_fails() {
    t96()
        .args(["inspect", "/nonexistent/save.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}

#[test]
fn inspect_rejects_other_versions() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("old.json");
    fs::write(&path, r#"{"version": 99, "saved_at": "2026-01-01T00:00:00Z", "state": {}}"#).unwrap();
    t96()
        .arg("inspect")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported save version"));
}

// ---------------------------------------------------------------------------
// play
// ---------------------------------------------------------------------------

#[test]
fn play_with_piped_input() {
    t96()
        .args(["play", "--instant", "--skip-tutorial", "--seed", "3"])
        .write_stdin("status\n:quit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("SYSTEM STATUS"));
}

#[test]
fn play_slots_meta_commands() {
    t96()
        .args(["play", "--instant", "--skip-tutorial", "--seed", "3"])
        .write_stdin(":save first\n:slots\n:load missing\n:quit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("saved slot first"))
        .stdout(predicate::str::contains("no save slot named 'missing'"));
}
