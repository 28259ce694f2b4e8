// Copyright (C) Brian G. Milnes 2025

//! Tests for the analyzer framework and the analyzer registry

mod common;

use anyhow::Result;
use common::package;
use gomodern::analysistest::analysistest::parse_want_patterns;
use gomodern::syntax::syntax::Span;
use gomodern::visitor::visitor::Node;
use gomodern::{all_analyzers, run_analyzers, select_analyzers, Analyzer, NodeKind, Pass, INSPECT};

static FIRST: Analyzer = Analyzer {
    name: "first",
    doc: "report every function declaration",
    requires: &[&INSPECT],
    run: report_funcs,
};

static SECOND: Analyzer = Analyzer {
    name: "second",
    doc: "depends on first",
    requires: &[&FIRST, &INSPECT],
    run: report_nothing,
};

static LOOP_A: Analyzer = Analyzer {
    name: "loop_a",
    doc: "requires loop_b",
    requires: &[&LOOP_B],
    run: report_nothing,
};

static LOOP_B: Analyzer = Analyzer {
    name: "loop_b",
    doc: "requires loop_a",
    requires: &[&LOOP_A],
    run: report_nothing,
};

fn report_funcs(pass: &mut Pass<'_>) -> Result<()> {
    let mut found: Vec<(gomodern::syntax::syntax::FileId, Span, String)> = Vec::new();
    pass.inspector().preorder(&[NodeKind::FuncDecl], |file, node| {
        if let Node::FuncDecl(func) = node {
            found.push((file, func.name.span, func.name.name.clone()));
        }
    });
    for (file, span, name) in found {
        pass.reportf(file, span, format!("func {name}"));
    }
    Ok(())
}

fn report_nothing(_pass: &mut Pass<'_>) -> Result<()> {
    Ok(())
}

const SOURCE: &str = "package p\n\nfunc a() {}\n\nfunc b() {}\n";

#[test]
fn test_prerequisites_run_once() {
    let pkg = package(SOURCE);
    let diagnostics = run_analyzers(&pkg.files, &pkg.sources, &pkg.info, &[&SECOND, &FIRST]).unwrap();
    let messages: Vec<&str> = diagnostics.iter().map(|d| d.message.as_str()).collect();
    assert_eq!(messages, vec!["func a", "func b"]);
    assert!(diagnostics.iter().all(|d| d.analyzer == "first"));
    assert_eq!((diagnostics[1].line, diagnostics[1].column), (5, 6));
    assert_eq!(diagnostics[1].to_string(), "p.go:5:6: func b");
}

#[test]
fn test_requirement_cycle_is_an_error() {
    let pkg = package(SOURCE);
    let err = run_analyzers(&pkg.files, &pkg.sources, &pkg.info, &[&LOOP_A]).unwrap_err();
    assert!(err.to_string().contains("loop_a -> loop_b -> loop_a"));
}

#[test]
fn test_select_analyzers() {
    let names: Vec<&str> = all_analyzers().iter().map(|a| a.name).collect();
    assert_eq!(names, vec!["makecopy", "searchmigrate", "sortmigrate", "clampcheck"]);

    assert_eq!(select_analyzers(&[]).unwrap().len(), 4);
    let picked = select_analyzers(&["clampcheck".to_string(), "makecopy".to_string(), "clampcheck".to_string()]).unwrap();
    let picked: Vec<&str> = picked.iter().map(|a| a.name).collect();
    assert_eq!(picked, vec!["clampcheck", "makecopy"]);

    let err = select_analyzers(&["nosuch".to_string()]).unwrap_err();
    assert!(err.to_string().contains("unknown analyzer 'nosuch'"));
}

#[test]
fn test_parse_want_patterns() {
    assert_eq!(parse_want_patterns(r#"`a\.b` "c\\d""#).unwrap(), vec![r"a\.b", r"c\d"]);
    assert_eq!(parse_want_patterns(r#""quote \"x\"""#).unwrap(), vec![r#"quote "x""#]);
    assert!(parse_want_patterns("`open").is_err());
    assert!(parse_want_patterns("bare").is_err());
}

#[test]
fn test_diagnostics_serialize_to_json() {
    let pkg = package(SOURCE);
    let diagnostics = run_analyzers(&pkg.files, &pkg.sources, &pkg.info, &[&FIRST]).unwrap();
    let json = serde_json::to_value(&diagnostics).unwrap();
    assert_eq!(json[0]["analyzer"], "first");
    assert_eq!(json[0]["message"], "func a");
    assert_eq!(json[0]["line"], 3);
}
