#![allow(clippy::unwrap_used)]
#![allow(missing_docs)]

use assert_cmd::cargo_bin_cmd;
use predicates::prelude::predicate;

#[test]
fn test_help_lists_subcommands() {
    // Arrange & Act & Assert
    let mut cmd = cargo_bin_cmd!("rankwatch");
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("summoner"));
}

#[test]
fn test_summoner_add_help() {
    // Arrange & Act & Assert
    let mut cmd = cargo_bin_cmd!("rankwatch");
    cmd.args(["summoner", "add", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--name"))
        .stdout(predicate::str::contains("--channel"));
}

#[test]
fn test_summoner_add_missing_channel() {
    // Arrange & Act & Assert
    let mut cmd = cargo_bin_cmd!("rankwatch");
    cmd.args(["summoner", "add", "--name", "Alpha", "--tag", "EUW"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--channel"));
}

#[test]
fn test_summoner_add_rejects_invalid_name() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();

    // Act & Assert
    let mut cmd = cargo_bin_cmd!("rankwatch");
    cmd.arg("--dir")
        .arg(dir.path())
        .args([
            "summoner",
            "add",
            "--name",
            "Robert'); DROP",
            "--tag",
            "EUW",
            "--channel",
            "1",
        ])
        .env("RIOT_API_TOKEN", "RGAPI-test")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid characters"));
}

#[test]
fn test_summoner_add_requires_api_token() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();

    // Act & Assert
    let mut cmd = cargo_bin_cmd!("rankwatch");
    cmd.arg("--dir")
        .arg(dir.path())
        .args([
            "summoner", "add", "--name", "Alpha", "--tag", "EUW", "--channel", "1",
        ])
        .env_remove("RIOT_API_TOKEN")
        .assert()
        .failure()
        .stderr(predicate::str::contains("RIOT_API_TOKEN"));
}

#[test]
fn test_summoner_list_empty() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();

    // Act & Assert
    let mut cmd = cargo_bin_cmd!("rankwatch");
    cmd.arg("--dir")
        .arg(dir.path())
        .args(["summoner", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No summoners tracked"));
    assert!(dir.path().join("rankwatch.db").exists());
}

#[test]
fn test_summoner_remove_unknown() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();

    // Act & Assert
    let mut cmd = cargo_bin_cmd!("rankwatch");
    cmd.arg("--dir")
        .arg(dir.path())
        .args([
            "summoner", "remove", "--name", "Alpha", "--tag", "EUW", "--channel", "1",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("is not tracked"));
}

#[test]
fn test_run_rejects_invalid_config() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("config.toml"),
        "[rate_limit]\nshort_window_requests = 0\n",
    )
    .unwrap();

    // Act & Assert
    let mut cmd = cargo_bin_cmd!("rankwatch");
    cmd.arg("--dir")
        .arg(dir.path())
        .arg("run")
        .env("RIOT_API_TOKEN", "RGAPI-test")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid config"));
}

#[test]
fn test_run_requires_api_token() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();

    // Act & Assert
    let mut cmd = cargo_bin_cmd!("rankwatch");
    cmd.arg("--dir")
        .arg(dir.path())
        .arg("run")
        .env_remove("RIOT_API_TOKEN")
        .assert()
        .failure()
        .stderr(predicate::str::contains("RIOT_API_TOKEN"));
}
