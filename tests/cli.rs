//! Integration tests for the `smp-submit` binary.
//!
//! Only commands that never reach GitHub are exercised here: `resolve`,
//! help output, and the configuration errors `submit` reports before any
//! network call.

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const DOC: &str = r#"{
    "@context": {"schema": "https://schema.org/"},
    "@type": "schema:SoftwareSourceCode",
    "schema:codeRepository": "https://github.com/acme/widgets"
}"#;

/// The binary with every configuration variable cleared.
fn smp() -> Command {
    let mut cmd = Command::cargo_bin("smp-submit").unwrap();
    for var in [
        "SMP_SUBMITTER_CONFIG",
        "GITHUB_TOKEN",
        "GITHUB_API_URL",
        "GITHUB_NAME",
        "GITHUB_EMAIL",
        "API_TOKEN",
        "SMP_LISTEN_ADDR",
        "LOG_LEVEL",
        "LOG_FORMAT",
        "RUST_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

fn write_doc(dir: &TempDir, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join("metadata.json");
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn help_lists_commands() {
    smp()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("submit"))
        .stdout(predicate::str::contains("resolve"));
}

#[test]
fn version_flag() {
    smp()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn resolve_from_file() {
    let dir = TempDir::new().unwrap();
    let path = write_doc(&dir, DOC);

    smp()
        .arg("resolve")
        .arg(&path)
        .assert()
        .success()
        .stdout("acme/widgets\n");
}

#[test]
fn resolve_from_stdin() {
    smp()
        .args(["resolve", "-"])
        .write_stdin(DOC)
        .assert()
        .success()
        .stdout("acme/widgets\n");
}

#[test]
fn resolve_without_repository_fails() {
    smp()
        .args(["resolve", "-"])
        .write_stdin(r#"{"@context": {"schema": "https://schema.org/"}, "schema:name": "w"}"#)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains(
            "error: no valid GitHub repository found as schema:codeRepository",
        ));
}

#[test]
fn resolve_malformed_json_fails() {
    smp()
        .args(["resolve", "-"])
        .write_stdin("{ not json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to parse metadata as JSON-LD"));
}

#[test]
fn strict_media_type_from_config() {
    let dir = TempDir::new().unwrap();
    let doc = write_doc(&dir, DOC);
    let config = dir.path().join("smp.toml");
    fs::write(&config, "[metadata]\nstrict_media_type = true\n").unwrap();

    smp()
        .arg("--config")
        .arg(&config)
        .arg("resolve")
        .arg(&doc)
        .args(["--content-type", "text/plain"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported media type 'text/plain'"));

    smp()
        .arg("resolve")
        .arg(&doc)
        .args(["--content-type", "text/plain"])
        .assert()
        .success()
        .stdout("acme/widgets\n");
}

#[test]
fn missing_config_file_fails() {
    smp()
        .args(["--config", "/nonexistent/smp.toml", "resolve", "-"])
        .write_stdin(DOC)
        .assert()
        .failure()
        .stderr(predicate::str::contains("config file not found"));
}

#[test]
fn submit_requires_credentials() {
    let dir = TempDir::new().unwrap();
    let path = write_doc(&dir, DOC);

    smp()
        .arg("submit")
        .arg(&path)
        .env("GITHUB_NAME", "SMP Bot")
        .env("GITHUB_EMAIL", "bot@example.org")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("missing required setting 'github.token'"));
}

#[test]
fn submit_requires_committer() {
    let dir = TempDir::new().unwrap();
    let path = write_doc(&dir, DOC);

    smp()
        .arg("submit")
        .arg(&path)
        .env("GITHUB_TOKEN", "ghp_unused")
        .assert()
        .failure()
        .stderr(predicate::str::contains("committer.name"));
}

#[test]
fn missing_document_fails() {
    smp()
        .args(["resolve", "/nonexistent/metadata.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read '/nonexistent/metadata.json'"));
}
