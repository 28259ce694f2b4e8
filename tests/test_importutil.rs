// Copyright (C) Brian G. Milnes 2025

//! Tests for import block editing

use gomodern::syntax::syntax::FileId;
use gomodern::{add_imports_edit, apply_edits, is_imported_unaliased, local_qualifier, parse_file, PendingFileState};

fn with_imports(source: &str, paths: &[&str]) -> String {
    let file = parse_file("p.go", source).unwrap();
    let edit = add_imports_edit(&file, paths).unwrap();
    apply_edits(source, &[edit]).unwrap()
}

#[test]
fn test_add_import_to_file_without_imports() {
    let source = "package p\n\nfunc f() {}\n";
    assert_eq!(
        with_imports(source, &["slices"]),
        "package p\n\nimport \"slices\"\n\nfunc f() {}\n"
    );
    assert_eq!(
        with_imports(source, &["cmp", "slices"]),
        "package p\n\nimport (\n\t\"cmp\"\n\t\"slices\"\n)\n\nfunc f() {}\n"
    );
}

#[test]
fn test_add_import_converts_single_import_to_group() {
    let source = "package p\n\nimport m \"math\"\n\nvar x = m.Pi\n";
    assert_eq!(
        with_imports(source, &["slices"]),
        "package p\n\nimport (\n\t\"slices\"\n\tm \"math\"\n)\n\nvar x = m.Pi\n"
    );
}

#[test]
fn test_add_import_appends_to_group() {
    let source = "package p\n\nimport (\n\t\"fmt\"\n\t\"os\"\n)\n";
    assert_eq!(
        with_imports(source, &["slices", "fmt", "slices"]),
        "package p\n\nimport (\n\t\"fmt\"\n\t\"os\"\n\t\"slices\"\n)\n"
    );
}

#[test]
fn test_add_import_nothing_missing() {
    let file = parse_file("p.go", "package p\n\nimport _ \"slices\"\n").unwrap();
    assert!(add_imports_edit(&file, &["slices"]).is_none());
}

#[test]
fn test_local_qualifier() {
    let file = parse_file(
        "p.go",
        "package p\n\nimport (\n\tsl \"slices\"\n\t. \"cmp\"\n\t_ \"math/rand\"\n\t\"strings\"\n)\n",
    )
    .unwrap();
    assert_eq!(local_qualifier(&file, "slices").as_deref(), Some("sl"));
    assert_eq!(local_qualifier(&file, "cmp"), None);
    assert_eq!(local_qualifier(&file, "math/rand"), None);
    assert_eq!(local_qualifier(&file, "strings").as_deref(), Some("strings"));
    assert_eq!(local_qualifier(&file, "encoding/json").as_deref(), Some("json"));

    assert!(is_imported_unaliased(&file, "strings"));
    assert!(!is_imported_unaliased(&file, "slices"));
}

#[test]
fn test_pending_file_state_claims_once_per_file() {
    let mut pending = PendingFileState::new();
    assert!(pending.claim(FileId(0), "slices"));
    assert!(!pending.claim(FileId(0), "slices"));
    assert!(pending.claim(FileId(1), "slices"));
    assert!(pending.is_scheduled(FileId(0), "slices"));
    assert!(!pending.is_scheduled(FileId(0), "cmp"));
}
