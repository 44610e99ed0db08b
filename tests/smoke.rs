//! Smoke tests -- verify the binary runs and its commands are wired.

use assert_cmd::Command;
use predicates::prelude::*;

fn edgepick() -> Command {
    let mut cmd = Command::cargo_bin("edgepick").unwrap();
    cmd.env_remove("EDGEPICK_CONFIG").env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_cli_help() {
    edgepick()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("edge IP speed-test engine"));
}

#[test]
fn test_cli_version() {
    edgepick()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("edgepick"));
}

#[test]
fn test_subcommands_exist() {
    for sub in ["show", "check", "save", "run"] {
        edgepick().args([sub, "--help"]).assert().success();
    }
}

#[test]
fn test_edit_flags_documented() {
    edgepick()
        .args(["run", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--set"))
        .stdout(predicate::str::contains("--toggle-region"))
        .stdout(predicate::str::contains("--toggle-colo"))
        .stdout(predicate::str::contains("--copy"));
}

#[test]
fn test_missing_settings_file_is_fatal() {
    let dir = tempfile::TempDir::new().unwrap();
    edgepick()
        .current_dir(dir.path())
        .args(["--settings", "nope.toml", "show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read settings file"));
}

#[test]
fn test_unreachable_engine_alerts() {
    let dir = tempfile::TempDir::new().unwrap();
    edgepick()
        .current_dir(dir.path())
        .args(["--server", "http://127.0.0.1:9", "show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load the initial configuration"));
}
