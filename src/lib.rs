// Copyright (C) Brian G. Milnes 2025

//! gomodern - analyzers that modernize Go code
//!
//! Four passes over type-checked Go packages: make+copy to `slices.Clone`,
//! `sort.Search` advisories, legacy `sort` calls to `slices`, and clamp
//! idioms to `min`/`max`. Each pass reports diagnostics with suggested
//! fixes where the rewrite is provably safe.

pub mod syntax;
pub mod lexer;
pub mod parser;
pub mod printer;
pub mod types;
pub mod checker;
pub mod visitor;
pub mod analyzer;
pub mod equivalence;
pub mod ast_utils;
pub mod importutil;
pub mod makecopy;
pub mod searchmigrate;
pub mod sortmigrate;
pub mod clampcheck;
pub mod fixer;
pub mod package;
pub mod analysistest;
pub mod args;
pub mod logging;
pub mod tool_runner;

use anyhow::{bail, Context, Result};
use log::{debug, warn};
use rayon::prelude::*;
use std::path::{Path, PathBuf};

// Re-export commonly used items
pub use analyzer::analyzer::{run_analyzers, Analyzer, Diagnostic, Pass, SuggestedFix, TextEdit, INSPECT};
pub use args::args::{format_number, StandardArgs};
pub use checker::checker::check_package;
pub use equivalence::equivalence::{same_object, same_value};
pub use fixer::fixer::{apply_edits, fix_source, FixOutcome};
pub use importutil::importutil::{add_imports_edit, is_imported_unaliased, local_qualifier, PendingFileState};
pub use package::package::{discover_packages, Package, SourceText};
pub use parser::parser::{parse_file, parse_file_with_ids};
pub use printer::printer::expr_string;
pub use types::types::{DeclId, PackageRef, Resolution, Type, TypeInfo};
pub use visitor::visitor::{Inspector, Node, NodeKind};

/// Every modernization pass, in reporting order.
pub fn all_analyzers() -> Vec<&'static Analyzer> {
    vec![
        &makecopy::makecopy::ANALYZER,
        &searchmigrate::searchmigrate::ANALYZER,
        &sortmigrate::sortmigrate::ANALYZER,
        &clampcheck::clampcheck::ANALYZER,
    ]
}

/// Analyzers by name; all of them when `names` is empty.
pub fn select_analyzers(names: &[String]) -> Result<Vec<&'static Analyzer>> {
    let all = all_analyzers();
    if names.is_empty() {
        return Ok(all);
    }
    let mut selected = Vec::new();
    for name in names {
        let Some(analyzer) = all.iter().find(|a| a.name == name.trim()) else {
            let known: Vec<&str> = all.iter().map(|a| a.name).collect();
            bail!("unknown analyzer '{}' (known: {})", name, known.join(", "));
        };
        if !selected.iter().any(|a: &&Analyzer| a.name == analyzer.name) {
            selected.push(*analyzer);
        }
    }
    Ok(selected)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Packages analyzed, what they reported, and what could not be loaded.
#[derive(Debug, Default)]
pub struct Review {
    pub packages: usize,
    pub files: usize,
    pub diagnostics: Vec<Diagnostic>,
    pub failures: Vec<String>,
    /// Diagnostics rendered in the requested format.
    pub output: String,
}

/// One loaded package and what the analyzers reported on it.
struct Analyzed {
    package: Package,
    diagnostics: Vec<Diagnostic>,
}

fn analyze_dir(dir: &Path, analyzers: &[&'static Analyzer]) -> Result<Vec<Analyzed>> {
    let path = dir.display().to_string();
    let mut analyzed = Vec::new();
    for package in Package::load_dir(dir, &path)? {
        let diagnostics = package.analyze(analyzers)?;
        debug!("{}: {} diagnostic(s)", package.path, diagnostics.len());
        analyzed.push(Analyzed { package, diagnostics });
    }
    Ok(analyzed)
}

/// Load and analyze every package under `paths`, in parallel.
fn analyze_paths(paths: &[PathBuf], analyzers: &[&'static Analyzer]) -> Result<(Vec<Analyzed>, Vec<String>)> {
    let dirs = discover_packages(paths)?;
    let results: Vec<(PathBuf, Result<Vec<Analyzed>>)> = dirs
        .par_iter()
        .map(|dir| (dir.clone(), analyze_dir(dir, analyzers)))
        .collect();

    let mut analyzed = Vec::new();
    let mut failures = Vec::new();
    for (dir, result) in results {
        match result {
            Ok(mut packages) => analyzed.append(&mut packages),
            Err(e) => {
                warn!("{}: {e:#}", dir.display());
                failures.push(format!("{}: {e:#}", dir.display()));
            }
        }
    }
    Ok((analyzed, failures))
}

/// Report diagnostics for every package under `paths`.
pub fn review(paths: &[PathBuf], analyzers: &[&'static Analyzer], format: OutputFormat) -> Result<Review> {
    let (analyzed, failures) = analyze_paths(paths, analyzers)?;
    let mut review = Review {
        packages: analyzed.len(),
        files: analyzed.iter().map(|a| a.package.files.len()).sum(),
        failures,
        ..Review::default()
    };
    for entry in analyzed {
        review.diagnostics.extend(entry.diagnostics);
    }
    review.output = match format {
        OutputFormat::Json => serde_json::to_string_pretty(&review.diagnostics)?,
        OutputFormat::Text => review
            .diagnostics
            .iter()
            .map(|d| format!("{d} [{}]", d.analyzer))
            .collect::<Vec<_>>()
            .join("\n"),
    };
    Ok(review)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixMode {
    Write,
    DryRun,
}

#[derive(Debug, Default)]
pub struct FixReport {
    pub diagnostics: usize,
    pub applied: usize,
    pub skipped: usize,
    /// Files whose text changed (or would change, for a dry run).
    pub changed_files: Vec<String>,
    pub failures: Vec<String>,
}

/// Apply suggested fixes to every package under `paths`.
pub fn fix(paths: &[PathBuf], analyzers: &[&'static Analyzer], mode: FixMode) -> Result<FixReport> {
    let (analyzed, failures) = analyze_paths(paths, analyzers)?;
    let mut report = FixReport {
        failures,
        ..FixReport::default()
    };
    for entry in &analyzed {
        report.diagnostics += entry.diagnostics.len();
        for (index, source) in entry.package.sources.iter().enumerate() {
            let file = entry.package.files[index].id;
            let outcome = fix_source(&source.text, file, &entry.diagnostics)
                .with_context(|| format!("Failed to fix {}", source.name))?;
            report.applied += outcome.applied;
            report.skipped += outcome.skipped;
            if outcome.text == source.text {
                continue;
            }
            if mode == FixMode::Write {
                std::fs::write(&source.name, &outcome.text)
                    .with_context(|| format!("Failed to write {}", source.name))?;
            }
            report.changed_files.push(source.name.clone());
        }
    }
    Ok(report)
}

/// Parse a Go file and render its syntax tree.
pub fn parse(file: &Path) -> Result<String> {
    let source = std::fs::read_to_string(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let syntax = parse_file(&file.display().to_string(), &source)?;
    Ok(format!("{syntax:#?}"))
}
