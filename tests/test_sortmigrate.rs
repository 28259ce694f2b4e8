// Copyright (C) Brian G. Milnes 2025

//! Tests for the sortmigrate analyzer

mod common;

use common::{package, run_fixture};
use gomodern::analysistest::analysistest::{apply_all_fixes, fixed_file};
use gomodern::sortmigrate::sortmigrate::{migration, Tier, ANALYZER, MIGRATIONS};

#[test]
fn test_migration_table() {
    assert_eq!(MIGRATIONS.len(), 9);
    assert_eq!(migration("Ints"), Some(("Sort", Tier::Direct)));
    assert_eq!(migration("Float64sAreSorted"), Some(("IsSorted", Tier::Direct)));
    assert_eq!(migration("SliceStable"), Some(("SortStableFunc", Tier::Callback)));
    assert_eq!(migration("Search"), None);
    assert_eq!(migration("Sort"), None);
}

#[test]
fn test_sortmigrate_fixture() {
    let outcome = run_fixture("sorttest", &ANALYZER);
    assert_eq!(outcome.diagnostics.len(), 11);
}

#[test]
fn test_sortmigrate_direct_and_callback_fixes() {
    let outcome = run_fixture("sorttest", &ANALYZER);
    let fixed = apply_all_fixes(&outcome.package, &outcome.diagnostics).unwrap();
    let text = fixed_file(&fixed, "slice_callback.go").unwrap();

    assert!(text.contains("\tslices.Sort(names)"));
    assert!(text.contains("\tslices.Sort(ids)"));
    assert!(text.contains("\tslices.Sort(weights)"));
    assert!(text.contains("return slices.IsSorted(ids)"));
    assert!(text.contains(
        "slices.SortFunc(people, func(a, b Person) int { return cmp.Compare(a.Name, b.Name) })"
    ));
    assert!(text.contains(
        "slices.SortStableFunc(people, func(a, b Person) int { return cmp.Compare(b.Age, a.Age) })"
    ));
    assert!(text.contains(
        "slices.IsSortedFunc(people, func(a, b Person) int { return cmp.Compare(a.Key(), b.Key()) })"
    ));
    assert!(text.contains("import (\n\t\"sort\"\n\t\"strings\"\n\t\"cmp\"\n\t\"slices\"\n)"));
}

#[test]
fn test_sortmigrate_unsafe_callbacks_are_reported_without_fix() {
    let outcome = run_fixture("sorttest", &ANALYZER);
    let unfixed: Vec<usize> = outcome
        .diagnostics
        .iter()
        .filter(|d| d.suggested_fixes.is_empty())
        .map(|d| d.line)
        .collect();
    // Two-key comparator, element type named b, and a comparator over another slice.
    assert_eq!(unfixed.len(), 3);

    let fixed = apply_all_fixes(&outcome.package, &outcome.diagnostics).unwrap();
    let text = fixed_file(&fixed, "slice_callback.go").unwrap();
    assert!(text.contains("sort.Slice(people, func(i, j int) bool { // want"));
    assert!(text.contains("sort.Slice(items, func(i, j int) bool"));
}

#[test]
fn test_sortmigrate_follows_aliases() {
    let outcome = run_fixture("sorttest", &ANALYZER);
    let fixed = apply_all_fixes(&outcome.package, &outcome.diagnostics).unwrap();
    let text = fixed_file(&fixed, "aliased.go").unwrap();

    assert!(text.contains("sl.Sort(values)"));
    assert!(text.contains("sort.Ints(values)\n"));
    assert_eq!(text.matches("\"slices\"").count(), 1);
}

#[test]
fn test_sortmigrate_ignores_package_without_sort() {
    let source = r#"package p

type sorter struct{}

func (sorter) Slice(xs []int, less func(i, j int) bool) {}

func f(xs []int) {
	var sort sorter
	sort.Slice(xs, func(i, j int) bool { return xs[i] < xs[j] })
}
"#;
    let pkg = package(source);
    assert!(pkg.analyze(&[&ANALYZER]).unwrap().is_empty());
}

#[test]
fn test_sortmigrate_less_or_equal_and_swapped_parameters() {
    let source = r#"package p

import "sort"

func f(xs []int) {
	sort.Slice(xs, func(i, j int) bool { return xs[j] <= xs[i] })
}
"#;
    let pkg = package(source);
    let diagnostics = pkg.analyze(&[&ANALYZER]).unwrap();
    assert_eq!(diagnostics.len(), 1);
    let fixed = apply_all_fixes(&pkg, &diagnostics).unwrap();
    assert_eq!(
        fixed[0].1,
        r#"package p

import (
	"cmp"
	"slices"
	"sort"
)

func f(xs []int) {
	slices.SortFunc(xs, func(a, b int) int { return cmp.Compare(b, a) })
}
"#
    );
}

#[test]
fn test_sortmigrate_element_type_declared_after_slice_type() {
    let source = r#"package p

import "sort"

type People []Person

type Person struct {
	Name string
}

func f(ps People) {
	sort.Slice(ps, func(i, j int) bool { return ps[i].Name < ps[j].Name })
}
"#;
    let pkg = package(source);
    let diagnostics = pkg.analyze(&[&ANALYZER]).unwrap();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].suggested_fixes.len(), 1);
    let fixed = apply_all_fixes(&pkg, &diagnostics).unwrap();
    assert!(fixed[0]
        .1
        .contains("slices.SortFunc(ps, func(a, b Person) int { return cmp.Compare(a.Name, b.Name) })"));
}

#[test]
fn test_sortmigrate_foreign_element_type_needs_unaliased_import() {
    let source = r#"package p

import (
	"sort"
	tm "time"
)

func f(ts []tm.Duration) {
	sort.Slice(ts, func(i, j int) bool { return ts[i] < ts[j] })
}
"#;
    let pkg = package(source);
    let diagnostics = pkg.analyze(&[&ANALYZER]).unwrap();
    assert_eq!(diagnostics.len(), 1);
    assert!(diagnostics[0].suggested_fixes.is_empty());
}

#[test]
fn test_sortmigrate_pointer_elements_and_double_reversal() {
    let source = r#"package p

import (
	"cmp"
	"slices"
	"sort"
)

type Item struct {
	Inner struct{ Rank int }
}

func f(items []*Item) {
	sort.Slice(items, func(i int, j int) bool { return items[j].Inner.Rank > items[i].Inner.Rank })
	_ = cmp.Less(1, 2)
	_ = slices.Max([]int{1})
}
"#;
    let pkg = package(source);
    let diagnostics = pkg.analyze(&[&ANALYZER]).unwrap();
    assert_eq!(diagnostics.len(), 1);
    let edits = &diagnostics[0].suggested_fixes[0].text_edits;
    // Both modules are already imported, so only the call is rewritten.
    assert_eq!(edits.len(), 2);
    let fixed = apply_all_fixes(&pkg, &diagnostics).unwrap();
    assert!(fixed[0].1.contains(
        "slices.SortFunc(items, func(a, b *Item) int { return cmp.Compare(a.Inner.Rank, b.Inner.Rank) })"
    ));
}
