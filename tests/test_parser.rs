// Copyright (C) Brian G. Milnes 2025

//! Tests for the Go lexer, parser and expression printer

use gomodern::lexer::lexer::{tokenize, Tok};
use gomodern::package::package::package_clause;
use gomodern::syntax::syntax::{Decl, GenKind, StmtKind};
use gomodern::{expr_string, parse_file};

#[test]
fn test_parse_simple_file() {
    let source = r#"package main

import (
	"fmt"
	str "strings"
)

type Point struct {
	X, Y int
}

func main() {
	fmt.Println(str.ToUpper("hi"))
}
"#;
    let file = parse_file("main.go", source).unwrap();
    assert_eq!(file.package.name, "main");
    assert_eq!(file.imports.len(), 1);
    assert!(file.imports[0].is_grouped());

    let specs: Vec<_> = file.import_specs().collect();
    assert_eq!(specs.len(), 2);
    assert_eq!(specs[0].path, "fmt");
    assert!(specs[0].name.is_none());
    assert_eq!(specs[1].name.as_ref().map(|n| n.name.as_str()), Some("str"));
    assert_eq!(specs[1].source_text(), "str \"strings\"");

    assert_eq!(file.decls.len(), 2);
    assert!(matches!(&file.decls[0], Decl::Gen(gen) if gen.kind == GenKind::Type));
    assert!(matches!(&file.decls[1], Decl::Func(func) if func.name.name == "main"));
}

#[test]
fn test_parse_statements() {
    let source = r#"package p

func f(xs []int, m map[string]int) (total int) {
	for i, x := range xs {
		if i%2 == 0 {
			total += x
		} else if x > 10 {
			continue
		}
	}
	switch v := m["k"]; {
	case v > 0:
		total++
	default:
	}
	return
}
"#;
    let file = parse_file("p.go", source).unwrap();
    let Decl::Func(func) = &file.decls[0] else {
        panic!("expected a function");
    };
    let body = func.body.as_ref().unwrap();
    assert_eq!(body.stmts.len(), 3);
    assert!(matches!(body.stmts[0].kind, StmtKind::Range(_)));
    assert!(matches!(body.stmts[1].kind, StmtKind::Switch(_)));
    assert!(body.stmts[2].as_return().is_some_and(|results| results.is_empty()));
}

#[test]
fn test_parse_error_is_reported() {
    assert!(parse_file("bad.go", "package p\n\nfunc f( {\n").is_err());
    assert!(parse_file("bad.go", "func f() {}\n").is_err());
}

#[test]
fn test_semicolon_insertion() {
    let tokens = tokenize("p.go", "package p\nvar x = 1\n").unwrap();
    let kinds: Vec<Tok> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(kinds[0], Tok::Package);
    assert_eq!(kinds[1], Tok::Ident);
    assert_eq!(kinds[2], Tok::Semicolon);
}

#[test]
fn test_package_clause_after_comments() {
    let text = "// Package p does things.\n/* more */\npackage p_test\n";
    assert_eq!(package_clause("p.go", text).unwrap(), "p_test");
    assert!(package_clause("p.go", "func f() {}\n").is_err());
}

#[test]
fn test_expr_string() {
    let source = r#"package p

var a = s[i:j:k]
var b = x.y(z, w...)
var c = -n + m*2
var d = []int{1, 2}
var e = func(i, j int) bool { return i < j }
var f = (*T)(nil)
var g = v.(fmt.Stringer)
"#;
    let file = parse_file("p.go", source).unwrap();
    let rendered: Vec<String> = file
        .decls
        .iter()
        .filter_map(|decl| match decl {
            Decl::Gen(gen) => Some(gen),
            Decl::Func(_) => None,
        })
        .flat_map(|gen| gen.specs.iter())
        .filter_map(|spec| match spec {
            gomodern::syntax::syntax::Spec::Value(vs) => vs.values.first().map(expr_string),
            gomodern::syntax::syntax::Spec::Type(_) => None,
        })
        .collect();
    assert_eq!(
        rendered,
        vec![
            "s[i:j:k]",
            "x.y(z, w...)",
            "-n + m * 2",
            "[]int{…}",
            "(func(i, j int) bool literal)",
            "(*T)(nil)",
            "v.(fmt.Stringer)",
        ]
    );
}
