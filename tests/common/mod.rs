// Copyright (C) Brian G. Milnes 2025

//! Common test utilities for integration tests

#![allow(dead_code)]

use gomodern::analysistest::analysistest::{self, Outcome};
use gomodern::syntax::syntax::Expr;
use gomodern::{expr_string, Analyzer, Inspector, Node, NodeKind, Package, SourceText};
use std::path::PathBuf;

/// Root of the fixture tree, laid out as `testdata/src/<pkg>/*.go`.
pub fn testdata() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("testdata")
}

/// Run `analyzer` on a fixture package and fail on any `want` mismatch.
pub fn run_fixture(pkg: &str, analyzer: &'static Analyzer) -> Outcome {
    let outcome = analysistest::run(&testdata(), pkg, analyzer).unwrap();
    assert!(outcome.problems.is_empty(), "{}", outcome.problems.join("\n"));
    outcome
}

/// Type-checked single-file package.
pub fn package(source: &str) -> Package {
    Package::from_sources("example.com/p", vec![SourceText::new("p.go", source)]).unwrap()
}

/// Every expression of `package` rendering as `text`, in source order.
pub fn exprs<'a>(package: &'a Package, text: &str) -> Vec<&'a Expr> {
    let inspector = Inspector::new(&package.files);
    let mut found = Vec::new();
    inspector.preorder(&[NodeKind::Expr], |_, node| {
        if let Node::Expr(expr) = node {
            if expr_string(expr) == text {
                found.push(expr);
            }
        }
    });
    found
}
