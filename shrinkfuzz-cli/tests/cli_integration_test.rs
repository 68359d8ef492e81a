//! End-to-end smoke tests: drive the real `shrinkfuzz` binary against toy
//! shell-script "programs under test" and check the corpus it leaves on
//! disk, mirroring the granularity of the teacher's own
//! `cli_integration_test.rs`.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn read_smallest_exemplar(exemplars_dir: &Path, label_prefix: &str) -> Vec<u8> {
    fs::read_dir(exemplars_dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .find(|e| e.file_name().to_string_lossy().starts_with(label_prefix))
        .map(|e| fs::read(e.path()).unwrap())
        .unwrap_or_else(|| panic!("no exemplar found for label prefix {label_prefix:?}"))
}

#[test]
fn shrinks_to_the_smallest_input_matching_grep() {
    let temp = TempDir::new().unwrap();
    let input_path = temp.path().join("input.bin");
    let output_path = temp.path().join("output.bin");
    let corpus_dir = temp.path().join("corpus");

    fs::write(&input_path, b"xxxAxxx").unwrap();

    let command = format!("grep -aq A {}", input_path.display());

    let mut cmd = Command::cargo_bin("shrinkfuzz").unwrap();
    cmd.arg(&command)
        .arg(&input_path)
        .arg(&output_path)
        .arg("--corpus")
        .arg(&corpus_dir)
        .arg("--timeout")
        .arg("2");

    cmd.assert().success();

    assert!(corpus_dir.join("seeds").is_dir());
    assert!(corpus_dir.join("exemplars").is_dir());

    // "return-0" (grep found 'A') shrinks to the single byte 'A'.
    let smallest = read_smallest_exemplar(&corpus_dir.join("exemplars"), "return-0-");
    assert_eq!(smallest, b"A");
}

#[test]
fn records_timeouts_without_crashing_the_run() {
    let temp = TempDir::new().unwrap();
    let input_path = temp.path().join("input.bin");
    let output_path = temp.path().join("output.bin");
    let corpus_dir = temp.path().join("corpus");

    fs::write(&input_path, b"hang").unwrap();

    // Sleeps long enough to trip a half-second timeout on every call.
    let command = "sleep 5".to_string();

    let mut cmd = Command::cargo_bin("shrinkfuzz").unwrap();
    cmd.arg(&command)
        .arg(&input_path)
        .arg(&output_path)
        .arg("--corpus")
        .arg(&corpus_dir)
        .arg("--timeout")
        .arg("0.5");

    cmd.assert().success();

    let timeouts: Vec<_> = fs::read_dir(corpus_dir.join("timeouts"))
        .unwrap()
        .filter_map(|e| e.ok())
        .collect();
    assert!(!timeouts.is_empty(), "expected at least one recorded timeout");
}

#[test]
fn help_lists_the_expected_arguments() {
    let mut cmd = Command::cargo_bin("shrinkfuzz").unwrap();
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("--corpus"))
        .stdout(predicate::str::contains("--timeout"))
        .stdout(predicate::str::contains("--debug"));
}
