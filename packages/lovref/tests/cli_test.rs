//! Tests for the lovref binary.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn lovref() -> Command {
    let mut cmd = Command::cargo_bin("lovref").unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}

/// Extract the XML fixture into `dir` and return the seed path.
fn extract_seed(dir: &Path) -> PathBuf {
    lovref()
        .arg("extract")
        .arg(fixture("databeskyttelsesloven.xml"))
        .args(["--document-id", "2018:502"])
        .args(["--title", "Databeskyttelsesloven"])
        .args(["--in-force-from", "2018-05-25"])
        .args(["--legal-basis", "1"])
        .arg("--output")
        .arg(dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved to:"));
    dir.join("databeskyttelsesloven.json")
}

#[test]
fn test_parse_full_style() {
    lovref()
        .args(["parse", "2018:502 kap. 3 § 5a, stk. 2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Section: 5 a"))
        .stdout(predicate::str::contains("2018:502 kap. 3 § 5 a, stk. 2"));
}

#[test]
fn test_parse_short_style_with_ambient_document() {
    lovref()
        .args(["parse", "§ 7", "--document", "2018:502", "--style", "short"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Document: 2018:502"))
        .stdout(predicate::str::contains("Citation: § 7"));
}

#[test]
fn test_parse_without_document_fails() {
    lovref()
        .args(["parse", "§ 7"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_parse_unknown_style_fails() {
    lovref()
        .args(["parse", "2018:502 § 7", "--style", "long"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown citation style"));
}

#[test]
fn test_extract_writes_seed() {
    let dir = tempdir().unwrap();
    let seed = extract_seed(dir.path());

    let content = std::fs::read_to_string(&seed).unwrap();
    let value: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(value["document"]["document_id"], "2018:502");
    assert_eq!(value["provisions"].as_array().unwrap().len(), 4);
    assert_eq!(value["eu_references"][0]["is_primary_implementation"], true);
    assert_eq!(value["definitions"][0]["term"], "personoplysninger");
}

#[test]
fn test_extract_yaml_to_stdout() {
    lovref()
        .arg("extract")
        .arg(fixture("tobaksvarer.json"))
        .args(["--document-id", "2019:1010", "--format", "yaml"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("---\n"))
        .stdout(predicate::str::contains("directive:2014/40"))
        .stderr(predicate::str::contains("Provisions: 2"));
}

#[test]
fn test_extract_rejects_invalid_inputs() {
    lovref()
        .arg("extract")
        .arg(fixture("databeskyttelsesloven.xml"))
        .args(["--document-id", "§ 1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid document identifier"));

    lovref()
        .arg("extract")
        .arg(fixture("databeskyttelsesloven.xml"))
        .args(["--document-id", "2018:502", "--in-force-from", "25-05-2018"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid date format"));
}

#[test]
fn test_validate_against_extracted_seed() {
    let dir = tempdir().unwrap();
    let seed = extract_seed(dir.path());

    lovref()
        .args(["validate", "2018:502 § 5, stk. 2", "--store"])
        .arg(&seed)
        .assert()
        .success()
        .stdout(predicate::str::contains("Matched:"))
        .stdout(predicate::str::contains("Provision: 2:5"));

    lovref()
        .args(["validate", "§ 1", "--document", "2018:502", "--as-of", "2017-01-01"])
        .arg("--store")
        .arg(&seed)
        .assert()
        .success()
        .stdout(predicate::str::contains("not in force on 2017-01-01"));
}

#[test]
fn test_validate_unmatched_exits_with_error() {
    let dir = tempdir().unwrap();
    let seed = extract_seed(dir.path());

    lovref()
        .args(["validate", "2018:502 § 40", "--store"])
        .arg(&seed)
        .assert()
        .failure()
        .stdout(predicate::str::contains("Not matched:"))
        .stderr(predicate::str::contains("provision not found"));

    lovref()
        .args(["validate", "2020:1 § 1", "--store"])
        .arg(&seed)
        .assert()
        .failure()
        .stderr(predicate::str::contains("document not found"));
}
