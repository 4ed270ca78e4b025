//! Integration tests for the asm16 CLI.

use assembler as _;
use clap as _;
use machine_core as _;
use proptest as _;
use rstest as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror as _;
use tracing as _;
use tracing_subscriber as _;

fn binary_path() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop();
    path.pop();
    path.join("asm16")
}

fn create_temp_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

const ROUND_TRIP: &str = "LOC 6\nStart: LDA 1,0,End\nDATA 0\nEnd:   HLT\n";

#[test]
fn assembles_source_into_listing_and_load_files() {
    let temp_dir = tempfile::tempdir().unwrap();
    let source = create_temp_file(temp_dir.path(), "prog.txt", ROUND_TRIP);

    let status = Command::new(binary_path())
        .arg(&source)
        .status()
        .expect("failed to run asm16");

    assert!(status.success());
    let load = fs::read_to_string(temp_dir.path().join("prog_load.txt")).unwrap();
    assert_eq!(load, "000006 006410\n000007 000000\n000010 000000\n");

    let listing = fs::read_to_string(temp_dir.path().join("prog_listing.txt")).unwrap();
    let rows: Vec<&str> = listing.lines().collect();
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0], "\t\t\tLOC 6");
    assert_eq!(rows[1], "000006\t006410\tStart: LDA 1,0,End");
}

#[test]
fn error_exits_nonzero_and_leaves_no_output() {
    let temp_dir = tempfile::tempdir().unwrap();
    let source = create_temp_file(
        temp_dir.path(),
        "broken.txt",
        "HLT\nLDR 0,0,Nowhere\n",
    );

    let output = Command::new(binary_path())
        .arg(&source)
        .output()
        .expect("failed to run asm16");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("line 2"), "stderr was: {stderr}");
    assert!(stderr.contains("Nowhere"), "stderr was: {stderr}");
    assert!(!temp_dir.path().join("broken_listing.txt").exists());
    assert!(!temp_dir.path().join("broken_load.txt").exists());
}

#[test]
fn duplicate_label_is_reported() {
    let temp_dir = tempfile::tempdir().unwrap();
    let source = create_temp_file(temp_dir.path(), "dup.txt", "A: HLT\nA: HLT\n");

    let output = Command::new(binary_path())
        .arg(&source)
        .output()
        .expect("failed to run asm16");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("duplicate label 'A'"), "stderr was: {stderr}");
}

#[test]
fn missing_source_file_fails() {
    let temp_dir = tempfile::tempdir().unwrap();
    let output = Command::new(binary_path())
        .arg(temp_dir.path().join("absent.txt"))
        .output()
        .expect("failed to run asm16");

    assert!(!output.status.success());
    assert!(!output.stderr.is_empty());
}

#[test]
fn no_arguments_is_a_usage_error() {
    let status = Command::new(binary_path())
        .status()
        .expect("failed to run asm16");
    assert!(!status.success());
}
