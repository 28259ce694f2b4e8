// Copyright (C) Brian G. Milnes 2025

//! Tests for fixer module

use gomodern::syntax::syntax::FileId;
use gomodern::{apply_edits, fix_source, Diagnostic, SuggestedFix, TextEdit};

fn edit(pos: usize, end: usize, new_text: &str) -> TextEdit {
    TextEdit {
        pos,
        end,
        new_text: new_text.to_string(),
    }
}

fn diagnostic(file: u32, edits: Vec<TextEdit>) -> Diagnostic {
    Diagnostic {
        analyzer: "test".to_string(),
        file: FileId(file),
        filename: "p.go".to_string(),
        line: 1,
        column: 1,
        pos: edits.first().map(|e| e.pos).unwrap_or(0),
        end: edits.first().map(|e| e.end).unwrap_or(0),
        message: "test".to_string(),
        suggested_fixes: vec![SuggestedFix {
            message: "test".to_string(),
            text_edits: edits,
        }],
    }
}

#[test]
fn test_apply_edits_in_any_order() {
    let source = "abcdef";
    let out = apply_edits(source, &[edit(4, 6, "XY"), edit(0, 1, "A"), edit(2, 2, "+")]).unwrap();
    assert_eq!(out, "Ab+cdXY");
}

#[test]
fn test_apply_edits_rejects_overlap_and_range() {
    assert!(apply_edits("abcdef", &[edit(0, 3, "x"), edit(2, 4, "y")]).is_err());
    assert!(apply_edits("abc", &[edit(2, 9, "x")]).is_err());
    assert!(apply_edits("é", &[edit(1, 2, "x")]).is_err());
}

#[test]
fn test_apply_edits_identical_edits_apply_once() {
    let out = apply_edits("ab", &[edit(1, 1, "\"slices\""), edit(1, 1, "\"slices\"")]).unwrap();
    assert_eq!(out, "a\"slices\"b");
}

#[test]
fn test_fix_source_skips_overlapping_fix_whole() {
    let source = "0123456789";
    let diagnostics = vec![
        diagnostic(0, vec![edit(0, 4, "a"), edit(9, 9, "!")]),
        diagnostic(0, vec![edit(3, 6, "b"), edit(7, 8, "c")]),
        diagnostic(0, vec![edit(9, 9, "!"), edit(5, 6, "d")]),
        diagnostic(1, vec![edit(0, 10, "other file")]),
    ];
    let outcome = fix_source(source, FileId(0), &diagnostics).unwrap();
    assert_eq!(outcome.text, "a4d678!9");
    assert_eq!(outcome.applied, 2);
    assert_eq!(outcome.skipped, 1);
}

#[test]
fn test_fix_source_without_fixes_is_identity() {
    let source = "package p\n";
    let mut d = diagnostic(0, vec![]);
    d.suggested_fixes.clear();
    let outcome = fix_source(source, FileId(0), &[d]).unwrap();
    assert_eq!(outcome.text, source);
    assert_eq!(outcome.applied, 0);
}
