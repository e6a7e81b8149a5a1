//! Integration tests for the prt CLI
//!
//! These exercise argument parsing and startup validation end-to-end with
//! assert_cmd. Nothing here talks to a FileMaker server or a database;
//! commands are expected to fail fast on missing configuration before any
//! network traffic would happen.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Helper to get a prt command with a clean environment: no inherited
/// config file, no credentials.
fn prt() -> (Command, TempDir) {
    let tmp = TempDir::new().unwrap();
    let mut cmd = Command::cargo_bin("prt").unwrap();
    cmd.current_dir(tmp.path())
        .env("HOME", tmp.path())
        .env("XDG_CONFIG_HOME", tmp.path().join(".config"))
        .env_remove("PRT_SERVER_URL")
        .env_remove("PRT_DATABASE")
        .env_remove("PRT_ARCHIVES_HOST")
        .env_remove("PRT_FM_USER")
        .env_remove("PRT_FM_PASSWORD")
        .env_remove("PRT_ARCHIVES_USER")
        .env_remove("PRT_ARCHIVES_PASSWORD")
        .env_remove("RUST_LOG");
    (cmd, tmp)
}

#[test]
fn test_help_lists_subcommands() {
    let (mut cmd, _tmp) = prt();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("reassign"))
        .stdout(predicate::str::contains("sync-locations"))
        .stdout(predicate::str::contains("completions"));
}

#[test]
fn test_sync_locations_requires_server_url() {
    let (mut cmd, _tmp) = prt();
    cmd.arg("sync-locations")
        .assert()
        .failure()
        .stderr(predicate::str::contains("server.url"));
}

#[test]
fn test_reassign_requires_credentials_once_configured() {
    let (mut cmd, _tmp) = prt();
    cmd.env("PRT_SERVER_URL", "https://fm.example.edu/")
        .arg("reassign")
        .assert()
        .failure()
        .stderr(predicate::str::contains("PRT_FM_USER"));
}

#[test]
fn test_config_file_is_picked_up_from_cwd() {
    let (mut cmd, tmp) = prt();
    // A config that names the server but not the archives host gets past
    // the first check and stops at the second.
    std::fs::write(
        tmp.path().join("prt.yaml"),
        "server:\n  url: https://fm.example.edu/\n",
    )
    .unwrap();
    cmd.arg("sync-locations")
        .assert()
        .failure()
        .stderr(predicate::str::contains("archives.host"));
}

#[test]
fn test_explicit_missing_config_is_an_error() {
    let (mut cmd, _tmp) = prt();
    cmd.args(["sync-locations", "--config", "nope.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nope.yaml"));
}

#[test]
fn test_completions_emit_script() {
    let (mut cmd, _tmp) = prt();
    cmd.args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("prt"));
}
