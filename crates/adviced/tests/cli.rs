//! Integration tests for the advice CLI commands.
//!
//! Every test points `--config` at a temporary file so the user's real
//! configuration is never touched.

use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use serial_test::serial;
use tempfile::{tempdir, TempDir};

// Helper function to create a clean command instance
fn advice() -> Command { Command::cargo_bin("advice").unwrap() }

// Helper to get a temporary config path and a one-entry corpus next to it
fn workspace() -> (TempDir, PathBuf, PathBuf) {
  let dir = tempdir().unwrap();
  let config = dir.path().join("config.toml");
  let corpus = dir.path().join("wisdoms.json");
  std::fs::write(&corpus, r#"{ "wisdoms": ["Never give up."] }"#).unwrap();
  (dir, config, corpus)
}

#[test]
#[serial]
fn test_init_writes_config_once() {
  let (dir, config, _) = workspace();

  advice()
    .arg("--config")
    .arg(&config)
    .arg("init")
    .assert()
    .success()
    .stderr(predicate::str::contains("Wrote configuration"));
  let written = std::fs::read_to_string(&config).unwrap();
  assert!(written.contains("wisdoms16k.json"));

  advice()
    .arg("--config")
    .arg(&config)
    .arg("init")
    .assert()
    .success()
    .stderr(predicate::str::contains("already exists"));

  advice()
    .arg("--config")
    .arg(&config)
    .args(["init", "--force"])
    .assert()
    .success()
    .stderr(predicate::str::contains("Wrote configuration"));
  dir.close().unwrap();
}

#[test]
#[serial]
fn test_resolve_prints_parameters() {
  let (_dir, config, corpus) = workspace();

  advice()
    .arg("--config")
    .arg(&config)
    .args(["resolve", "--query", "top=Listen&bottom=random()", "--set"])
    .arg(format!("json={}", corpus.display()))
    .assert()
    .success()
    .stdout(predicate::str::contains("\"topText\": \"Listen\""))
    .stdout(predicate::str::contains("\"bottomText\": \"Never give up.\""))
    .stdout(predicate::str::contains("\"fellBack\": false"))
    .stdout(predicate::str::contains("\"share\": \"http://localhost/?"))
    .stdout(predicate::str::contains("\"title\": \"Listen\""));
}

#[test]
#[serial]
fn test_resolve_falls_back_on_missing_corpus() {
  let (dir, config, _) = workspace();

  advice()
    .arg("--config")
    .arg(&config)
    .args(["resolve", "--set"])
    .arg(format!("json={}", dir.path().join("missing.json").display()))
    .assert()
    .success()
    .stdout(predicate::str::contains("\"fellBack\": true"))
    .stderr(predicate::str::contains("built-in defaults"));
}

#[test]
#[serial]
fn test_render_without_fonts_fails() {
  let (dir, config, corpus) = workspace();
  let output = dir.path().join("out.png");

  advice()
    .arg("--config")
    .arg(&config)
    .args(["render", "--query", "top=Hi", "--viewport", "200x100", "--output"])
    .arg(&output)
    .arg("--set")
    .arg(format!("json={}", corpus.display()))
    .assert()
    .failure()
    .stderr(predicate::str::contains("No fonts could be loaded"))
    .stderr(predicate::str::contains("No font available"));
  assert!(!output.exists());
}

#[test]
#[serial]
fn test_save_requires_store() {
  let (_dir, config, corpus) = workspace();

  advice()
    .arg("--config")
    .arg(&config)
    .args(["save", "--set"])
    .arg(format!("json={}", corpus.display()))
    .assert()
    .failure()
    .stderr(predicate::str::contains("No settings_store configured"));
}

#[test]
#[serial]
fn test_malformed_arguments_rejected() {
  advice().args(["resolve", "--set", "nokey"]).assert().failure();
  advice().args(["render", "--viewport", "wide", "--output", "x.png"]).assert().failure();
}
