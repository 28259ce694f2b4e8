// Copyright (C) Brian G. Milnes 2025

//! Tests for review and fix over directories on disk

mod common;

use common::testdata;
use gomodern::{all_analyzers, fix, review, select_analyzers, FixMode, OutputFormat};
use std::fs;
use tempfile::TempDir;

const CLAMP: &str = r#"package limits

func clamp(v, lo, hi int) int {
	if v < lo {
		return lo
	}
	if v > hi {
		return hi
	}
	return v
}
"#;

const COPY: &str = r#"package limits

func dup(xs []int) []int {
	ys := make([]int, len(xs))
	copy(ys, xs)
	return ys
}
"#;

fn workspace() -> TempDir {
    let dir = TempDir::new().unwrap();
    let pkg = dir.path().join("limits");
    fs::create_dir_all(&pkg).unwrap();
    fs::write(pkg.join("clamp.go"), CLAMP).unwrap();
    fs::write(pkg.join("copy.go"), COPY).unwrap();
    let hidden = dir.path().join("vendor").join("dep");
    fs::create_dir_all(&hidden).unwrap();
    fs::write(hidden.join("dep.go"), "package dep\n\nfunc f(x int) int { return x }\n").unwrap();
    dir
}

#[test]
fn test_review_reports_every_analyzer() {
    let dir = workspace();
    let result = review(&[dir.path().to_path_buf()], &all_analyzers(), OutputFormat::Text).unwrap();
    assert_eq!(result.packages, 1);
    assert_eq!(result.files, 2);
    assert!(result.failures.is_empty());
    let analyzers: Vec<&str> = result.diagnostics.iter().map(|d| d.analyzer.as_str()).collect();
    assert_eq!(analyzers.len(), 2);
    assert!(analyzers.contains(&"clampcheck"));
    assert!(analyzers.contains(&"makecopy"));
    assert!(result.output.contains("clamp.go:4:2: clamp pattern can be simplified to return min(max(v, lo), hi)"));
}

#[test]
fn test_review_json_output() {
    let dir = workspace();
    let analyzers = select_analyzers(&["makecopy".to_string()]).unwrap();
    let result = review(&[dir.path().to_path_buf()], &analyzers, OutputFormat::Json).unwrap();
    let json: serde_json::Value = serde_json::from_str(&result.output).unwrap();
    assert_eq!(json.as_array().unwrap().len(), 1);
    assert_eq!(json[0]["message"], "make+copy can be simplified to ys := slices.Clone(xs)");
}

#[test]
fn test_review_records_unparsable_package() {
    let dir = workspace();
    let broken = dir.path().join("broken");
    fs::create_dir_all(&broken).unwrap();
    fs::write(broken.join("bad.go"), "package broken\n\nfunc (\n").unwrap();
    let result = review(&[dir.path().to_path_buf()], &all_analyzers(), OutputFormat::Text).unwrap();
    assert_eq!(result.packages, 1);
    assert_eq!(result.failures.len(), 1);
    assert!(result.failures[0].contains("broken"));
}

#[test]
fn test_fix_writes_files_and_converges() {
    let dir = workspace();
    let paths = [dir.path().to_path_buf()];
    let report = fix(&paths, &all_analyzers(), FixMode::Write).unwrap();
    assert_eq!(report.applied, 2);
    assert_eq!(report.changed_files.len(), 2);

    let copy = fs::read_to_string(dir.path().join("limits").join("copy.go")).unwrap();
    assert_eq!(
        copy,
        "package limits\n\nimport \"slices\"\n\nfunc dup(xs []int) []int {\n\tys := slices.Clone(xs)\n\treturn ys\n}\n"
    );
    let clamp = fs::read_to_string(dir.path().join("limits").join("clamp.go")).unwrap();
    assert!(clamp.contains("\treturn min(max(v, lo), hi)\n}"));

    let again = review(&paths, &all_analyzers(), OutputFormat::Text).unwrap();
    assert!(again.diagnostics.is_empty());
}

#[test]
fn test_fix_dry_run_leaves_files_alone() {
    let dir = workspace();
    let report = fix(&[dir.path().to_path_buf()], &all_analyzers(), FixMode::DryRun).unwrap();
    assert_eq!(report.changed_files.len(), 2);
    let copy = fs::read_to_string(dir.path().join("limits").join("copy.go")).unwrap();
    assert_eq!(copy, COPY);
}

#[test]
fn test_review_fixture_tree() {
    let result = review(&[testdata().join("src")], &all_analyzers(), OutputFormat::Text).unwrap();
    assert_eq!(result.packages, 6);
    assert!(result.failures.is_empty());
}
