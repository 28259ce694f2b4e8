// Copyright (C) Brian G. Milnes 2025

//! Tests for the gomodern binaries

mod common;

use clap::Parser;
use common::testdata;
use gomodern::StandardArgs;
use serial_test::serial;
use std::path::PathBuf;
use std::process::Command;

#[test]
#[serial]
fn test_review_binary_exits_nonzero_on_findings() {
    let binary = env!("CARGO_BIN_EXE_gomodern-review");
    let output = Command::new(binary)
        .arg(testdata().join("src").join("clamptest"))
        .output()
        .expect("Failed to run gomodern-review");

    let stdout = String::from_utf8_lossy(&output.stdout);
    println!("STDOUT:\n{stdout}");

    assert_eq!(output.status.code(), Some(1));
    assert!(stdout.contains("Entering directory"));
    assert!(stdout.contains("clamptest.go:4:2: clamp pattern can be simplified to x = min(max(x, lo), hi)"));
    assert!(stdout.contains("Checked 1 packages (1 files): 4 diagnostics, 0 failures"));
    assert!(stdout.contains("Completed in"));
}

#[test]
#[serial]
fn test_review_binary_clean_package_exits_zero() {
    let binary = env!("CARGO_BIN_EXE_gomodern-review");
    let output = Command::new(binary)
        .args(["-a", "searchmigrate"])
        .arg(testdata().join("src").join("clamptest"))
        .output()
        .expect("Failed to run gomodern-review");
    assert_eq!(output.status.code(), Some(0));
}

#[test]
#[serial]
fn test_review_binary_rejects_unknown_analyzer() {
    let binary = env!("CARGO_BIN_EXE_gomodern-review");
    let output = Command::new(binary)
        .args(["--analyzers", "nosuch"])
        .output()
        .expect("Failed to run gomodern-review");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown analyzer"));
}

#[test]
#[serial]
fn test_parse_binary_prints_tree() {
    let binary = env!("CARGO_BIN_EXE_gomodern-parse");
    let output = Command::new(binary)
        .arg("--path")
        .arg(testdata().join("src").join("searchtest").join("searchtest.go"))
        .output()
        .expect("Failed to run gomodern-parse");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains("searchtest"));
    assert!(stdout.contains("Completed in"));
}

#[test]
fn test_search_paths_accept_recursive_pattern() {
    let args = StandardArgs::parse_from(["gomodern-review", "./...", "pkg/...", "other"]);
    assert_eq!(
        args.search_paths(),
        vec![PathBuf::from("."), PathBuf::from("pkg"), PathBuf::from("other")]
    );
    assert_eq!(StandardArgs::parse_from(["gomodern-review"]).search_paths(), vec![PathBuf::from(".")]);
}

#[test]
#[serial]
fn test_review_binary_accepts_recursive_pattern() {
    let binary = env!("CARGO_BIN_EXE_gomodern-review");
    let pattern = format!("{}/...", testdata().join("src").join("clamptest").display());
    let output = Command::new(binary)
        .arg(pattern)
        .output()
        .expect("Failed to run gomodern-review");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout.contains("Checked 1 packages (1 files): 4 diagnostics, 0 failures"));
}
