//! Command-line tests for the `shave-match` binary.

use std::io::Write;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;

fn data_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("data")
}

fn shave_match() -> Command {
    Command::cargo_bin("shave-match").unwrap()
}

#[test]
fn test_match_text_output() {
    shave_match()
        .arg("match")
        .args(["--domain", "blade", "--context", "Shavette (AC)"])
        .arg("--data-dir")
        .arg(data_dir())
        .arg("Feather")
        .assert()
        .success()
        .stdout(predicate::str::contains("Match: regex"))
        .stdout(predicate::str::contains("Brand: Feather"))
        .stdout(predicate::str::contains("Format: DE"))
        .stdout(predicate::str::contains("Pattern: feather"));
}

#[test]
fn test_match_json_output() {
    let output = shave_match()
        .args(["--format", "json", "match", "--domain", "razor"])
        .arg("--data-dir")
        .arg(data_dir())
        .args(["GILLETTE SUPERSPEED", "zzz_not_in_any_catalog"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let results: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let results = results.as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["match_type"], "exact");
    assert_eq!(results[0]["matched"]["model"], "Super Speed");
    assert!(results[1]["match_type"].is_null());
}

#[test]
fn test_match_tsv_from_stdin() {
    shave_match()
        .args(["-f", "tsv", "match", "-d", "blade"])
        .arg("--data-dir")
        .arg(data_dir())
        .arg("-")
        .write_stdin("Perma-Sharp SE\n\nnone\n")
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "original\tnormalized\tmatch_type\tbrand\tmodel\tformat\tpattern\n",
        ))
        .stdout(predicate::str::contains(
            "Perma-Sharp SE\tPerma-Sharp SE\tregex\tPerma-Sharp\tSE\tHALF DE\tperma.*sharp",
        ))
        .stdout(predicate::str::contains("none\tnone\tfiltered\t\t\t\t"));
}

#[test]
fn test_bypass_correct_matches() {
    shave_match()
        .args(["--format", "tsv", "match", "--domain", "razor", "--bypass-correct"])
        .arg("--data-dir")
        .arg(data_dir())
        .arg("Super Speed Tech")
        .assert()
        .success()
        .stdout(predicate::str::contains("\tregex\tGillette\tSuper Speed\t"));
}

#[test]
fn test_explicit_catalog_path() {
    let mut catalog = tempfile::NamedTempFile::with_suffix(".yaml").unwrap();
    writeln!(catalog, "Simpson:\n  Chubby 2:\n    patterns: ['chubby.*2']").unwrap();

    shave_match()
        .args(["match", "--domain", "brush", "--catalog"])
        .arg(catalog.path())
        .arg("Simpson Chubby 2")
        .assert()
        .success()
        .stdout(predicate::str::contains("Model: Chubby 2"));
}

#[test]
fn test_missing_catalog_fails() {
    let dir = tempfile::tempdir().unwrap();
    shave_match()
        .args(["match", "--domain", "brush", "--data-dir"])
        .arg(dir.path())
        .arg("Simpson Chubby 2")
        .assert()
        .failure()
        .stderr(predicate::str::contains("brushes.yaml"));
}

#[test]
fn test_catalog_patterns_in_partition() {
    shave_match()
        .args(["catalog", "--domain", "blade"])
        .arg("--data-dir")
        .arg(data_dir())
        .args(["patterns", "--partition", "gem"])
        .assert()
        .success()
        .stdout(predicate::str::contains("GEM order (2 patterns)"))
        .stdout(predicate::str::contains("personna.*gem"));
}

#[test]
fn test_catalog_unknown_partition_fails() {
    shave_match()
        .args(["catalog", "--domain", "blade"])
        .arg("--data-dir")
        .arg(data_dir())
        .args(["patterns", "--partition", "Rotary"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not declared"));
}

#[test]
fn test_catalog_formats_json() {
    let output = shave_match()
        .args(["-f", "json", "catalog", "--domain", "blade"])
        .arg("--data-dir")
        .arg(data_dir())
        .arg("formats")
        .output()
        .unwrap();
    assert!(output.status.success());

    let formats: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let half = formats
        .as_array()
        .unwrap()
        .iter()
        .find(|f| f["format"] == "HALF DE")
        .unwrap();
    assert_eq!(half["patterns"], 2);
    assert_eq!(half["fallbacks"], serde_json::json!(["DE"]));
}

#[test]
fn test_catalog_warnings() {
    let mut catalog = tempfile::NamedTempFile::with_suffix(".yaml").unwrap();
    writeln!(catalog, "Simpson:\n  Chubby 2:\n    patterns: ['chubby\\s*(2']").unwrap();

    shave_match()
        .args(["catalog", "--domain", "brush", "--catalog"])
        .arg(catalog.path())
        .arg("warnings")
        .assert()
        .success()
        .stdout(predicate::str::contains("1 pattern(s) skipped"))
        .stdout(predicate::str::contains("Simpson"));
}
