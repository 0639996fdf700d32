//! End-to-end tests for the `vellum` binary's conversion surface:
//! `--from-format`/`--from-path`, `--to-format`/`--to-path`, `--silent`,
//! exit codes.

use assert_cmd::cargo::cargo_bin;
use predicates::prelude::*;
use std::process::Command;
use tempfile::tempdir;

fn vellum() -> Command {
    Command::new(cargo_bin("vellum"))
}

#[test]
fn list_formats_enumerates_every_required_format() {
    vellum()
        .arg("--list-formats")
        .assert()
        .success()
        .stdout(predicate::str::contains("requirements.txt"))
        .stdout(predicate::str::contains("Pipfile"))
        .stdout(predicate::str::contains("Pipfile.lock"))
        .stdout(predicate::str::contains("lockfile"))
        .stdout(predicate::str::contains("pyproject-manifest"))
        .stdout(predicate::str::contains("installed"))
        .stdout(predicate::str::contains("setup.py"));
}

#[test]
fn manifest_to_manifest_is_direct_transcription_no_network() {
    let dir = tempdir().unwrap();
    let from = dir.path().join("pyproject.toml");
    let to = dir.path().join("out.toml");
    std::fs::write(
        &from,
        r#"
[project]
name = "demo"
version = "1.0.0"
dependencies = ["requests>=2.0,<3"]
"#,
    )
    .unwrap();

    vellum()
        .args(["--from-format", "pyproject-manifest", "--from-path"])
        .arg(&from)
        .args(["--to-format", "pyproject-manifest", "--to-path"])
        .arg(&to)
        .assert()
        .success();

    let written = std::fs::read_to_string(&to).unwrap();
    assert!(written.contains("requests"));
    assert!(written.contains(">=2.0"));
}

#[test]
fn to_path_dash_writes_to_stdout() {
    let dir = tempdir().unwrap();
    let from = dir.path().join("pyproject.toml");
    std::fs::write(
        &from,
        r#"
[project]
name = "demo"
dependencies = ["requests>=2.0"]
"#,
    )
    .unwrap();

    vellum()
        .args(["--from-format", "pyproject-manifest", "--from-path"])
        .arg(&from)
        .args(["--to-format", "pyproject-manifest", "--to-path", "-"])
        .assert()
        .success()
        .stdout(predicate::str::contains("requests"));
}

#[test]
fn unknown_format_name_fails_with_usage_message() {
    let dir = tempdir().unwrap();
    let from = dir.path().join("pyproject.toml");
    std::fs::write(&from, "[project]\nname = \"demo\"\n").unwrap();

    vellum()
        .args(["--from-format", "not-a-real-format", "--from-path"])
        .arg(&from)
        .args(["--to-format", "pyproject-manifest", "--to-path", "-"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown --from-format"));
}

#[test]
fn missing_source_file_fails() {
    let dir = tempdir().unwrap();
    vellum()
        .args(["--from-format", "pyproject-manifest", "--from-path"])
        .arg(dir.path().join("does-not-exist.toml"))
        .args(["--to-format", "pyproject-manifest", "--to-path", "-"])
        .assert()
        .failure();
}
