//! Integration tests for the wharf CLI.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

fn wharf(config: &Path) -> Command {
    let mut cmd = Command::cargo_bin("wharf").unwrap();
    cmd.env("WHARF_CONFIG", config).env_remove("RUST_LOG");
    cmd
}

fn json_stdout(cmd: &mut Command) -> serde_json::Value {
    let output = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&output).unwrap()
}

#[test]
fn test_bindings_command() {
    let temp = TempDir::new().unwrap();
    let config = write(temp.path(), "config.yml", "docker:\n  network:\n    interface: 172.18.0.1\n");
    let allocations = write(
        temp.path(),
        "alloc.json",
        r#"{"mappings": {"0.0.0.0": [25565, 0, 70000]}}"#,
    );

    let value = json_stdout(wharf(&config).arg("bindings").arg(&allocations));
    assert_eq!(
        value,
        serde_json::json!({
            "25565/tcp": [{"HostIp": "[::]", "HostPort": "25565"}],
            "25565/udp": [{"HostIp": "[::]", "HostPort": "25565"}],
        })
    );
}

#[test]
fn test_exposed_command() {
    let temp = TempDir::new().unwrap();
    let config = write(temp.path(), "config.yml", "");
    let allocations = write(
        temp.path(),
        "alloc.json",
        r#"{"mappings": {"127.0.0.1": [8080], "10.0.0.2": [27015]}}"#,
    );

    let value = json_stdout(
        wharf(&config)
            .arg("exposed")
            .arg(&allocations)
            .arg("--isolated"),
    );
    assert_eq!(
        value,
        serde_json::json!({
            "8080/tcp": {},
            "8080/udp": {},
            "27015/tcp": {},
            "27015/udp": {},
        })
    );
}

#[test]
fn test_missing_config_file_fails() {
    let temp = TempDir::new().unwrap();
    let allocations = write(temp.path(), "alloc.json", "{}");

    wharf(&temp.path().join("missing.yml"))
        .arg("bindings")
        .arg(&allocations)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load configuration"));
}

#[test]
fn test_invalid_allocations_fail() {
    let temp = TempDir::new().unwrap();
    let config = write(temp.path(), "config.yml", "");
    let allocations = write(temp.path(), "alloc.json", r#"{"mappings": [1, 2]}"#);

    wharf(&config)
        .arg("bindings")
        .arg(&allocations)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid allocations"));
}

#[test]
fn test_empty_allocations() {
    let temp = TempDir::new().unwrap();
    let config = write(temp.path(), "config.yml", "");
    let allocations = write(temp.path(), "alloc.json", "{}");

    let value = json_stdout(wharf(&config).arg("exposed").arg(&allocations));
    assert_eq!(value, serde_json::json!({}));
}
