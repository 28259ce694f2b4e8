// Copyright (C) Brian G. Milnes 2025

//! Tests for the searchmigrate analyzer

mod common;

use common::{package, run_fixture};
use gomodern::searchmigrate::searchmigrate::{ANALYZER, MESSAGE};

#[test]
fn test_searchmigrate_fixture() {
    let outcome = run_fixture("searchtest", &ANALYZER);
    assert_eq!(outcome.diagnostics.len(), 3);
}

#[test]
fn test_searchmigrate_never_offers_a_fix() {
    let outcome = run_fixture("searchtest", &ANALYZER);
    for diagnostic in &outcome.diagnostics {
        assert_eq!(diagnostic.message, MESSAGE);
        assert!(diagnostic.suggested_fixes.is_empty());
    }
}

#[test]
fn test_searchmigrate_ignores_other_sort_functions() {
    let pkg = package(
        r#"package p

import "sort"

func f(words []string) int {
	sort.Strings(words)
	return sort.SearchStrings(words, "x")
}
"#,
    );
    let diagnostics = pkg.analyze(&[&ANALYZER]).unwrap();
    assert!(diagnostics.is_empty());
}

#[test]
fn test_searchmigrate_diagnostic_covers_whole_call() {
    let source = r#"package p

import "sort"

func f(n int) int {
	return sort.Search(n, func(i int) bool { return i > 3 })
}
"#;
    let pkg = package(source);
    let diagnostics = pkg.analyze(&[&ANALYZER]).unwrap();
    assert_eq!(diagnostics.len(), 1);
    let d = &diagnostics[0];
    assert_eq!(&source[d.pos..d.end], "sort.Search(n, func(i int) bool { return i > 3 })");
    assert_eq!((d.line, d.column), (6, 9));
}
