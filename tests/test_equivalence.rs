// Copyright (C) Brian G. Milnes 2025

//! Tests for value and object equivalence

mod common;

use common::{exprs, package};
use gomodern::{same_object, same_value};

const SOURCE: &str = r#"package p

type T struct {
	items []int
}

func f(s []int, t T, i, j int) {
	_ = s
	_ = s
	{
		s := []int{}
		_ = s
	}
	_ = t.items
	_ = t.items
	_ = s[i:]
	_ = s[i:]
	_ = s[j:]
	_ = s[i:j]
	_ = s[i:j:j]
	_ = s[i]
	_ = s[i]
	_ = (s)
	_ = len(s)
	_ = len(s)
}
"#;

#[test]
fn test_same_object_by_declaration() {
    let pkg = package(SOURCE);
    let uses = exprs(&pkg, "s");
    let ident = |index: usize| uses[index].as_ident().unwrap();
    // Parameter twice, then the inner definition and its use.
    assert!(same_object(&pkg.info, ident(0), ident(1)));
    assert!(!same_object(&pkg.info, ident(0), ident(3)));
    assert!(same_object(&pkg.info, ident(2), ident(3)));
}

#[test]
fn test_same_value_access_paths() {
    let pkg = package(SOURCE);
    let info = &pkg.info;
    let first = |text: &str| exprs(&pkg, text)[0];
    let second = |text: &str| exprs(&pkg, text)[1];

    assert!(same_value(info, first("t.items"), second("t.items")));
    assert!(same_value(info, first("s[i:]"), second("s[i:]")));
    assert!(!same_value(info, first("s[i:]"), first("s[j:]")));
    assert!(!same_value(info, first("s[i:j]"), first("s[i:j:j]")));
    assert!(same_value(info, first("s[i]"), second("s[i]")));
    assert!(same_value(info, first("(s)"), first("s")));
}

#[test]
fn test_calls_are_never_the_same_value() {
    let pkg = package(SOURCE);
    let calls = exprs(&pkg, "len(s)");
    assert!(!same_value(&pkg.info, calls[0], calls[1]));
}
