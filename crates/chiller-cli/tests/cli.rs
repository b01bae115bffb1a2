//! End-to-end tests for the `chiller` binary.
//!
//! Every command runs with its config directory pointed into a temp dir so
//! the user's own configuration never leaks into the results.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn chiller(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("chiller").unwrap();
    cmd.env("HOME", home).env("XDG_CONFIG_HOME", home.join(".config"));
    cmd
}

#[test]
fn fields_lists_builtin_table() {
    let home = TempDir::new().unwrap();

    chiller(home.path())
        .arg("fields")
        .assert()
        .success()
        .stdout(predicate::str::contains("net_capacity_kw"))
        .stdout(predicate::str::contains("refrigerant"));
}

#[test]
fn fields_includes_configured_extras() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("chiller.json");
    fs::write(
        &config,
        r#"{"extraction": {"extra_fields": [
            {"key": "serial_number", "pattern": "Serial\\s+(\\S+)", "class": "text"}
        ]}}"#,
    )
    .unwrap();

    chiller(home.path())
        .args(["--config", config.to_str().unwrap(), "fields", "-f", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"serial_number\""));
}

#[test]
fn invalid_extra_field_is_rejected() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("chiller.json");
    fs::write(
        &config,
        r#"{"extraction": {"extra_fields": [
            {"key": "broken", "pattern": "no group here", "class": "numeric"}
        ]}}"#,
    )
    .unwrap();

    chiller(home.path())
        .args(["-c", config.to_str().unwrap(), "fields"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid field definition 'broken'"));
}

#[test]
fn extract_corrupt_file_is_unreadable() {
    let home = TempDir::new().unwrap();
    let input = home.path().join("broken.pdf");
    fs::write(&input, b"this is not a pdf at all").unwrap();

    chiller(home.path())
        .args(["extract", input.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("document unreadable"));
}

#[test]
fn extract_missing_file_fails() {
    let home = TempDir::new().unwrap();

    chiller(home.path())
        .args(["extract", "does-not-exist.pdf"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn compare_requires_both_inputs() {
    let home = TempDir::new().unwrap();
    let input = home.path().join("a.pdf");
    fs::write(&input, b"%PDF-1.4").unwrap();

    chiller(home.path())
        .args(["compare", input.to_str().unwrap(), "missing-b.pdf"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing-b.pdf"));
}

#[test]
fn batch_without_matches_fails() {
    let home = TempDir::new().unwrap();
    let pattern = home.path().join("*.pdf");

    chiller(home.path())
        .args(["batch", pattern.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No matching files"));
}

#[test]
fn batch_continue_on_error_writes_summary() {
    let home = TempDir::new().unwrap();
    let inputs = home.path().join("in");
    let out = home.path().join("out");
    fs::create_dir_all(&inputs).unwrap();
    fs::write(inputs.join("a.pdf"), b"garbage").unwrap();
    fs::write(inputs.join("notes.txt"), b"ignored").unwrap();

    chiller(home.path())
        .args([
            "batch",
            inputs.join("*").to_str().unwrap(),
            "-o",
            out.to_str().unwrap(),
            "--summary",
            "--continue-on-error",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 1 files"));

    let summary = fs::read_to_string(out.join("summary.csv")).unwrap();
    let mut lines = summary.lines();
    assert!(lines.next().unwrap().starts_with("filename,status,fields_found,"));
    let row = lines.next().unwrap();
    assert!(row.starts_with("a.pdf,error,"));
    assert!(row.contains("document unreadable"));
}

#[test]
fn config_init_get_set_roundtrip() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("conf").join("chiller.json");
    let config = config.to_str().unwrap();

    chiller(home.path())
        .args(["-c", config, "config", "init"])
        .assert()
        .success();

    chiller(home.path())
        .args(["-c", config, "config", "get", "opex.years"])
        .assert()
        .success()
        .stdout(predicate::str::diff("10\n"));

    chiller(home.path())
        .args(["-c", config, "config", "set", "opex.electricity_price", "0.2"])
        .assert()
        .success();

    chiller(home.path())
        .args(["-c", config, "config", "get", "opex.electricity_price"])
        .assert()
        .success()
        .stdout(predicate::str::diff("0.2\n"));

    chiller(home.path())
        .args(["-c", config, "config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn config_set_rejects_unknown_key() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("chiller.json");

    chiller(home.path())
        .args(["-c", config.to_str().unwrap(), "config", "set", "opex.colour", "blue"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration key not found"));

    assert!(!config.exists());
}

#[test]
fn config_path_reports_default_location() {
    let home = TempDir::new().unwrap();

    chiller(home.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("chiller"))
        .stdout(predicate::str::contains("not created"));
}

#[test]
fn explicit_missing_config_fails() {
    let home = TempDir::new().unwrap();

    chiller(home.path())
        .args(["-c", "nowhere/chiller.json", "fields"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Config file not found"));
}
