// Copyright (C) Brian G. Milnes 2025

//! Tests for the makecopy analyzer

mod common;

use common::run_fixture;
use gomodern::analysistest::analysistest::{apply_all_fixes, fixed_file};
use gomodern::makecopy::makecopy::ANALYZER;

#[test]
fn test_makecopy_fixture() {
    let outcome = run_fixture("makecopytest", &ANALYZER);
    assert_eq!(outcome.diagnostics.len(), 5);
    assert!(outcome.diagnostics.iter().all(|d| d.analyzer == "makecopy"));
}

#[test]
fn test_makecopy_fix_rewrites_pair_and_imports_slices_once() {
    let outcome = run_fixture("makecopytest", &ANALYZER);
    let fixed = apply_all_fixes(&outcome.package, &outcome.diagnostics).unwrap();
    let text = fixed_file(&fixed, "makecopytest.go").unwrap();

    assert!(text.contains("import (\n\t\"slices\"\n\t\"fmt\"\n)"));
    assert_eq!(text.matches("\"slices\"").count(), 1);
    assert!(text.contains("dst := slices.Clone(src)\n\treturn dst"));
    assert!(text.contains("out := slices.Clone(b.data)"));
    assert!(text.contains("tail := slices.Clone(src[start:])"));
    assert!(text.contains("kept := slices.Clone(names)"));
    assert!(text.contains("rest := slices.Clone(src[k:])\n\treturn rest"));
    // Near misses are untouched.
    assert!(text.contains("dst := make([]int, len(src)-1)"));
    assert!(text.contains("dst := make([]int, len(src), 2*len(src))"));
    assert!(text.contains("dst := make([]int, len(src)+1)"));
}

#[test]
fn test_makecopy_only_first_diagnostic_in_file_carries_import() {
    let outcome = run_fixture("makecopytest", &ANALYZER);
    let with_import: Vec<_> = outcome
        .diagnostics
        .iter()
        .filter(|d| d.suggested_fixes[0].text_edits.len() == 2)
        .collect();
    assert_eq!(with_import.len(), 1);
    assert_eq!(with_import[0].line, 10);
}

#[test]
fn test_makecopy_uses_alias_without_new_import() {
    let outcome = run_fixture("makecopyalias", &ANALYZER);
    let fixed = apply_all_fixes(&outcome.package, &outcome.diagnostics).unwrap();
    let text = fixed_file(&fixed, "makecopyalias.go").unwrap();

    assert!(text.contains("dst := sl.Clone(src)"));
    assert!(text.contains("import sl \"slices\"\n"));
    assert!(!text.contains("import (\n"));
}

#[test]
fn test_makecopy_dot_import_reports_without_fix() {
    let outcome = run_fixture("makecopydot", &ANALYZER);
    assert_eq!(outcome.diagnostics.len(), 1);
    assert!(outcome.diagnostics[0].suggested_fixes.is_empty());
}

#[test]
fn test_makecopy_ignores_string_source() {
    let outcome = run_fixture("makecopytest", &ANALYZER);
    assert!(outcome.diagnostics.iter().all(|d| !d.message.contains("Clone(s)")));

    let fixed = apply_all_fixes(&outcome.package, &outcome.diagnostics).unwrap();
    let text = fixed_file(&fixed, "makecopytest.go").unwrap();
    assert!(text.contains("b := make([]byte, len(s))\n\tcopy(b, s)"));
}
