// Copyright (C) Brian G. Milnes 2025

//! Tests for visitor module

mod common;

use common::package;
use gomodern::{expr_string, Inspector, Node, NodeKind};

const SOURCE: &str = r#"package p

func f(x int) int {
	switch x {
	case 1:
		x++
	default:
		if x > 2 {
			return g(x)
		}
	}
	return x
}

func g(y int) int { return y }
"#;

#[test]
fn test_preorder_filters_by_kind() {
    let pkg = package(SOURCE);
    let inspector = Inspector::new(&pkg.files);
    assert!(!inspector.is_empty());

    let mut funcs = Vec::new();
    inspector.preorder(&[NodeKind::FuncDecl], |_, node| {
        if let Node::FuncDecl(func) = node {
            funcs.push(func.name.name.clone());
        }
    });
    assert_eq!(funcs, vec!["f", "g"]);

    let mut clauses = 0;
    let mut blocks = 0;
    inspector.preorder(&[NodeKind::CaseClause, NodeKind::Block], |_, node| match node.kind() {
        NodeKind::CaseClause => clauses += 1,
        NodeKind::Block => blocks += 1,
        _ => unreachable!(),
    });
    assert_eq!(clauses, 2);
    // Two function bodies and the if body.
    assert_eq!(blocks, 3);
}

#[test]
fn test_preorder_visits_parents_before_children() {
    let pkg = package(SOURCE);
    let inspector = Inspector::new(&pkg.files);
    let mut calls = Vec::new();
    inspector.preorder(&[NodeKind::Expr], |_, node| {
        if let Node::Expr(expr) = node {
            if expr.as_call().is_some() || expr.as_ident().is_some_and(|i| i.name == "g") {
                calls.push(expr_string(expr));
            }
        }
    });
    assert_eq!(calls, vec!["g(x)", "g"]);
}

#[test]
fn test_empty_filter_visits_everything() {
    let pkg = package(SOURCE);
    let inspector = Inspector::new(&pkg.files);
    let mut count = 0;
    inspector.preorder(&[], |_, _| count += 1);
    assert_eq!(count, inspector.len());

    let mut first = None;
    inspector.preorder(&[], |_, node| {
        if first.is_none() {
            first = Some(node.kind());
        }
    });
    assert_eq!(first, Some(NodeKind::File));
}
