// Copyright (C) Brian G. Milnes 2025

//! Tests for the clampcheck analyzer

mod common;

use common::{package, run_fixture};
use gomodern::{Package, SourceText};
use gomodern::analysistest::analysistest::{apply_all_fixes, fixed_file};
use gomodern::clampcheck::clampcheck::ANALYZER;

#[test]
fn test_clampcheck_fixture() {
    let outcome = run_fixture("clamptest", &ANALYZER);
    assert_eq!(outcome.diagnostics.len(), 4);
    assert!(outcome.diagnostics.iter().all(|d| d.suggested_fixes.len() == 1));
}

#[test]
fn test_clampcheck_fix_replaces_whole_statement() {
    let outcome = run_fixture("clamptest", &ANALYZER);
    let fixed = apply_all_fixes(&outcome.package, &outcome.diagnostics).unwrap();
    let text = fixed_file(&fixed, "clamptest.go").unwrap();

    assert!(text.contains("func ifElse(x, lo, hi int) int {\n\tx = min(max(x, lo), hi)\n\treturn x\n}"));
    assert!(text.contains("func upperFirst(x int) int {\n\tx = max(min(x, 100), 0)\n\treturn x\n}"));
    assert!(text.contains("func consecutive(v, lo, hi float64) float64 {\n\treturn min(max(v, lo), hi)\n}"));
    assert!(text.contains("\tcase 1:\n\t\treturn min(max(v, 0), 10)\n\t}"));
    // Near misses keep their shape.
    assert!(text.contains("} else {\n\t\tx = 0\n\t}"));
    assert!(text.contains("\treturn w\n"));
}

#[test]
fn test_clampcheck_bound_expressions_are_printed() {
    let source = r#"package p

type limits struct{ lo, hi int }

func f(x int, l limits) int {
	if x < l.lo {
		x = l.lo
	} else if x >= l.hi-1 {
		x = l.hi - 1
	}
	return x
}
"#;
    let pkg = package(source);
    let diagnostics = pkg.analyze(&[&ANALYZER]).unwrap();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(
        diagnostics[0].message,
        "clamp pattern can be simplified to x = min(max(x, l.lo), l.hi - 1) or use a clamp helper"
    );
    assert_eq!(diagnostics[0].line, 6);
}

#[test]
fn test_clampcheck_return_form_needs_both_bounds_on_one_variable() {
    let source = r#"package p

func f(v, w int) int {
	if v < 0 {
		return 0
	}
	if w > 9 {
		return 9
	}
	return v
}

func g(v int) int {
	if v < 0 {
		return 0
	}
	if v <= 9 {
		return 9
	}
	return v
}
"#;
    let pkg = package(source);
    assert!(pkg.analyze(&[&ANALYZER]).unwrap().is_empty());
}

#[test]
fn test_clampcheck_else_if_in_one_file_does_not_hide_clamp_in_another() {
    let clamp = "if x < 0 {\n\t\tx = 0\n\t} else if x > 9 {\n\t\tx = 9\n\t}";
    let prefix_a = "package p\n\nfunc f(flag bool, x int) int {\n\tif flag {\n\t\tx = 1\n\t} else ";
    let prefix_b = "package p\n\nfunc g(x int) int {\n";
    let padding = "\t".repeat(prefix_a.len() - prefix_b.len());
    let a = format!("{prefix_a}{clamp}\n\treturn x\n}}\n");
    let b = format!("{prefix_b}{padding}{clamp}\n\treturn x\n}}\n");

    let pkg = Package::from_sources(
        "example.com/p",
        vec![SourceText::new("a.go", &a), SourceText::new("b.go", &b)],
    )
    .unwrap();
    let diagnostics = pkg.analyze(&[&ANALYZER]).unwrap();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].filename, "b.go");
    assert_eq!(diagnostics[0].pos, prefix_a.len());
}
