// Copyright (C) Brian G. Milnes 2025

//! Tests for name resolution and type checking

mod common;

use common::{exprs, package};
use gomodern::{Package, Resolution, SourceText};

fn type_text(pkg: &Package, text: &str) -> String {
    let expr = exprs(pkg, text)[0];
    let ty = pkg.info.type_of(expr).unwrap();
    pkg.info.type_string(ty)
}

#[test]
fn test_builtins_and_shadowing() {
    let pkg = package(
        r#"package p

func f(s []int) int {
	n := len(s)
	{
		len := func(x []int) int { return 0 }
		n = len(s)
	}
	return n
}
"#,
    );
    let calls = exprs(&pkg, "len(s)");
    assert_eq!(calls.len(), 2);
    let callee = |index: usize| calls[index].as_call().unwrap().func.as_ident().unwrap();
    assert!(pkg.info.resolve(callee(0)).is_builtin());
    assert!(matches!(pkg.info.resolve(callee(1)), Resolution::Declared(_)));
}

#[test]
fn test_expression_types() {
    let pkg = package(
        r#"package p

import "time"

type Person struct {
	Name string
	Born time.Time
}

type People []Person

func (p Person) Key() string { return p.Name }

func f(ps People, m map[string][]*Person) {
	_ = ps[0]
	_ = ps[0].Key()
	_ = ps[0].Born
	_ = m["x"]
	_ = ps[1:]
}
"#,
    );
    assert_eq!(type_text(&pkg, "ps[0]"), "Person");
    assert_eq!(type_text(&pkg, "ps[0].Key()"), "string");
    assert_eq!(type_text(&pkg, "ps[0].Born"), "time.Time");
    assert_eq!(type_text(&pkg, "m[\"x\"]"), "[]*Person");
    assert_eq!(type_text(&pkg, "ps[1:]"), "People");

    let ps = exprs(&pkg, "ps")[0];
    let elem = pkg.info.slice_elem(pkg.info.type_of(ps).unwrap()).unwrap();
    assert_eq!(pkg.info.type_string(&elem), "Person");
}

#[test]
fn test_type_declarations_resolve_in_any_order() {
    let pkg = package(
        r#"package p

type Group = Crowd

type Crowd = People

type People []Person

type Person struct {
	Name string
}

func f(ps People, g Group) {
	_ = ps[0].Name
	_ = g
}
"#,
    );
    assert_eq!(type_text(&pkg, "ps[0]"), "Person");
    assert_eq!(type_text(&pkg, "ps[0].Name"), "string");
    assert_eq!(type_text(&pkg, "g"), "People");

    let ps = exprs(&pkg, "ps")[0];
    let elem = pkg.info.slice_elem(pkg.info.type_of(ps).unwrap()).unwrap();
    assert_eq!(pkg.info.type_string(&elem), "Person");
}

#[test]
fn test_aliased_import_resolves_to_path() {
    let pkg = package(
        r#"package p

import legacy "sort"

func f(xs []int) {
	legacy.Ints(xs)
}
"#,
    );
    let call = exprs(&pkg, "legacy.Ints(xs)")[0].as_call().unwrap();
    let qualifier = call.func.as_selector().unwrap().base.as_ident().unwrap();
    match pkg.info.resolve(qualifier) {
        Resolution::PackageName { imported, .. } => {
            assert_eq!(imported.path, "sort");
            assert_eq!(imported.name, "sort");
        }
        other => panic!("unexpected resolution {other:?}"),
    }
}

#[test]
fn test_package_scope_spans_files() {
    let pkg = Package::from_sources(
        "example.com/p",
        vec![
            SourceText::new("a.go", "package p\n\nfunc f() int { return limit }\n"),
            SourceText::new("b.go", "package p\n\nconst limit = 3\n"),
        ],
    )
    .unwrap();
    let limit = exprs(&pkg, "limit")[0].as_ident().unwrap();
    assert!(matches!(pkg.info.resolve(limit), Resolution::Declared(_)));
}

#[test]
fn test_conflicting_package_clauses_fail() {
    let result = Package::from_sources(
        "example.com/p",
        vec![
            SourceText::new("a.go", "package p\n"),
            SourceText::new("b.go", "package q\n"),
        ],
    );
    assert!(result.is_err());
}
