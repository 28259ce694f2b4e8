// Copyright (C) Brian G. Milnes 2025

//! Import block editing
//!
//! Builds one text edit that adds any missing import paths to a file, and
//! answers which qualifier synthesized code has to use for a package.

pub mod importutil {
    use crate::analyzer::analyzer::TextEdit;
    use crate::syntax::syntax::{File, FileId, ImportSpec};
    use crate::types::types::default_package_name;
    use std::collections::{BTreeSet, HashMap};

    /// One edit adding every path in `paths` that `file` does not import.
    /// None when nothing is missing.
    pub fn add_imports_edit(file: &File, paths: &[&str]) -> Option<TextEdit> {
        let mut missing: Vec<&str> = Vec::new();
        for &path in paths {
            if !is_imported(file, path) && !missing.contains(&path) {
                missing.push(path);
            }
        }
        if missing.is_empty() {
            return None;
        }

        if let Some(group) = file.imports.iter().find(|decl| decl.is_grouped()) {
            let rparen = group.rparen?;
            let new_text: String = missing.iter().map(|p| format!("\t{}\n", quote(p))).collect();
            return Some(TextEdit {
                pos: rparen,
                end: rparen,
                new_text,
            });
        }

        if let Some(single) = file.imports.first() {
            let existing = single.specs.first()?;
            let mut new_text = String::from("import (\n");
            for path in &missing {
                new_text.push_str(&format!("\t{}\n", quote(path)));
            }
            new_text.push_str(&format!("\t{}\n)", existing.source_text()));
            return Some(TextEdit {
                pos: single.span.start,
                end: single.span.end,
                new_text,
            });
        }

        let anchor = file.package.span.end;
        let new_text = match missing.as_slice() {
            [only] => format!("\n\nimport {}", quote(only)),
            many => {
                let mut text = String::from("\n\nimport (\n");
                for path in many {
                    text.push_str(&format!("\t{}\n", quote(path)));
                }
                text.push(')');
                text
            }
        };
        Some(TextEdit {
            pos: anchor,
            end: anchor,
            new_text,
        })
    }

    fn quote(path: &str) -> String {
        format!("\"{path}\"")
    }

    /// Imported under any name, including `.` and `_`.
    pub fn is_imported(file: &File, path: &str) -> bool {
        file.import_specs().any(|spec| spec.path == path)
    }

    /// Imported with no local name.
    pub fn is_imported_unaliased(file: &File, path: &str) -> bool {
        file.import_specs().any(|spec| spec.path == path && spec.name.is_none())
    }

    /// Qualifier code in `file` must write for package `path`. A missing
    /// import is qualified by the package name, since it will be added.
    /// None when the package is only reachable through a dot or blank import.
    pub fn local_qualifier(file: &File, path: &str) -> Option<String> {
        let specs: Vec<&ImportSpec> = file.import_specs().filter(|spec| spec.path == path).collect();
        if specs.is_empty() {
            return Some(default_package_name(path));
        }
        specs.iter().find_map(|spec| match &spec.name {
            None => Some(default_package_name(path)),
            Some(name) if name.name == "." || name.is_blank() => None,
            Some(name) => Some(name.name.clone()),
        })
    }

    /// Import paths already scheduled for insertion, per file. Lives for
    /// one analyzer invocation over one package.
    #[derive(Debug, Default)]
    pub struct PendingFileState {
        scheduled: HashMap<FileId, BTreeSet<String>>,
    }

    impl PendingFileState {
        pub fn new() -> Self {
            Self::default()
        }

        /// True the first time `path` is claimed for `file`.
        pub fn claim(&mut self, file: FileId, path: &str) -> bool {
            self.scheduled.entry(file).or_default().insert(path.to_string())
        }

        pub fn is_scheduled(&self, file: FileId, path: &str) -> bool {
            self.scheduled.get(&file).is_some_and(|paths| paths.contains(path))
        }
    }
}
