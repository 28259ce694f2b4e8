// Copyright (C) Brian G. Milnes 2025

//! Loading Go packages from disk
//!
//! A package is every `.go` file of one directory sharing a package clause.
//! Files are parsed with one NodeId generator and then type-checked
//! together.

pub mod package {
    use crate::analyzer::analyzer::{run_analyzers, Analyzer, Diagnostic};
    use crate::checker::checker::check_package;
    use crate::lexer::lexer::{tokenize, Tok};
    use crate::parser::parser::parse_file_with_ids;
    use crate::syntax::syntax::{position, File, FileId, NodeIdGen, Pos};
    use crate::types::types::TypeInfo;
    use anyhow::{bail, Context, Result};
    use log::debug;
    use serde::{Deserialize, Serialize};
    use std::collections::BTreeMap;
    use std::fs;
    use std::path::{Path, PathBuf};
    use walkdir::WalkDir;

    /// One source file as read from disk.
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct SourceText {
        pub name: String,
        pub text: String,
    }

    impl SourceText {
        pub fn new(name: &str, text: &str) -> Self {
            SourceText {
                name: name.to_string(),
                text: text.to_string(),
            }
        }
    }

    #[derive(Debug)]
    pub struct Package {
        /// Import path; types declared here render unqualified.
        pub path: String,
        pub sources: Vec<SourceText>,
        pub files: Vec<File>,
        pub info: TypeInfo,
    }

    impl Package {
        pub fn from_sources(path: &str, sources: Vec<SourceText>) -> Result<Package> {
            let mut ids = NodeIdGen::new();
            let mut files = Vec::with_capacity(sources.len());
            for (index, source) in sources.iter().enumerate() {
                files.push(parse_file_with_ids(FileId(index as u32), &source.name, &source.text, &mut ids)?);
            }
            let info = check_package(path, &files)?;
            Ok(Package {
                path: path.to_string(),
                sources,
                files,
                info,
            })
        }

        /// Every package in `dir`, not recursing. `path` is the import path of
        /// the directory; an external test package gets `path` + `_test`.
        pub fn load_dir(dir: &Path, path: &str) -> Result<Vec<Package>> {
            let mut groups: BTreeMap<String, Vec<SourceText>> = BTreeMap::new();
            for file in go_files(dir)? {
                let text =
                    fs::read_to_string(&file).with_context(|| format!("Failed to read {}", file.display()))?;
                let name = file.display().to_string();
                let clause = package_clause(&name, &text)?;
                groups.entry(clause).or_default().push(SourceText { name, text });
            }

            let clauses: Vec<String> = groups.keys().cloned().collect();
            let mut packages = Vec::new();
            for (clause, sources) in groups {
                let external_test = clause
                    .strip_suffix("_test")
                    .is_some_and(|base| clauses.iter().any(|c| c == base));
                let package_path = if external_test {
                    format!("{path}_test")
                } else {
                    path.to_string()
                };
                debug!("loading package {} ({} files)", package_path, sources.len());
                packages.push(Package::from_sources(&package_path, sources)?);
            }
            Ok(packages)
        }

        pub fn analyze(&self, analyzers: &[&'static Analyzer]) -> Result<Vec<Diagnostic>> {
            run_analyzers(&self.files, &self.sources, &self.info, analyzers)
        }

        pub fn source(&self, file: FileId) -> &str {
            &self.sources[file.index()].text
        }

        /// 1-based line and column.
        pub fn position(&self, file: FileId, pos: Pos) -> (usize, usize) {
            position(self.source(file), pos)
        }
    }

    /// `.go` files directly inside `dir`, sorted by name.
    pub fn go_files(dir: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in fs::read_dir(dir).with_context(|| format!("Failed to read directory {}", dir.display()))? {
            let path = entry?.path();
            if path.is_file() && path.extension().is_some_and(|e| e == "go") {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    /// Name in the file's `package` clause.
    pub fn package_clause(name: &str, text: &str) -> Result<String> {
        let tokens = tokenize(name, text)?;
        match tokens.as_slice() {
            [first, second, ..] if first.kind == Tok::Package && second.kind == Tok::Ident => {
                Ok(text[second.span.start..second.span.end].to_string())
            }
            _ => bail!("{name}: expected package clause"),
        }
    }

    /// Directories under `roots` that hold `.go` files. Hidden directories,
    /// `vendor` and `testdata` are skipped. A root that is a file yields
    /// its directory.
    pub fn discover_packages(roots: &[PathBuf]) -> Result<Vec<PathBuf>> {
        let mut dirs = Vec::new();
        for root in roots {
            if root.is_file() {
                if let Some(parent) = root.parent() {
                    dirs.push(parent.to_path_buf());
                }
                continue;
            }
            let walker = WalkDir::new(root).into_iter().filter_entry(|entry| {
                let name = entry.file_name().to_string_lossy();
                entry.depth() == 0
                    || !(entry.file_type().is_dir()
                        && (name.starts_with('.') || name == "vendor" || name == "testdata"))
            });
            for entry in walker {
                let entry = entry?;
                if entry.file_type().is_dir() && !go_files(entry.path())?.is_empty() {
                    dirs.push(entry.path().to_path_buf());
                }
            }
        }
        dirs.sort();
        dirs.dedup();
        Ok(dirs)
    }
}
