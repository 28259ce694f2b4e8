// Copyright (C) Brian G. Milnes 2025

//! Fixture harness for analyzers
//!
//! Fixtures live in `<testdata>/src/<pkg>/*.go`. A line expecting a
//! diagnostic carries a comment `// want "regexp"` (Go string syntax) or
//! ``// want `regexp` ``; several patterns may follow one `want`.

pub mod analysistest {
    use crate::analyzer::analyzer::{Analyzer, Diagnostic};
    use crate::fixer::fixer::fix_source;
    use crate::package::package::Package;
    use crate::syntax::syntax::FileId;
    use anyhow::{anyhow, bail, Result};
    use regex::Regex;
    use std::path::Path;

    /// One `want` pattern.
    #[derive(Debug, Clone)]
    pub struct Expectation {
        pub file: FileId,
        pub line: usize,
        pub pattern: Regex,
    }

    /// Result of running an analyzer over a fixture package.
    pub struct Outcome {
        pub package: Package,
        pub diagnostics: Vec<Diagnostic>,
        /// Mismatches between diagnostics and expectations; empty on success.
        pub problems: Vec<String>,
    }

    /// Patterns in one `want` comment body.
    pub fn parse_want_patterns(text: &str) -> Result<Vec<String>> {
        let mut patterns = Vec::new();
        let mut chars = text.trim().chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                ' ' | '\t' => {}
                '`' => {
                    let mut raw = String::new();
                    loop {
                        match chars.next() {
                            Some('`') => break,
                            Some(ch) => raw.push(ch),
                            None => bail!("unterminated raw string in want: {text}"),
                        }
                    }
                    patterns.push(raw);
                }
                '"' => {
                    let mut cooked = String::new();
                    loop {
                        match chars.next() {
                            Some('"') => break,
                            Some('\\') => match chars.next() {
                                Some('n') => cooked.push('\n'),
                                Some('t') => cooked.push('\t'),
                                Some('\\') => cooked.push('\\'),
                                Some('"') => cooked.push('"'),
                                Some(other) => {
                                    cooked.push('\\');
                                    cooked.push(other);
                                }
                                None => bail!("unterminated string in want: {text}"),
                            },
                            Some(ch) => cooked.push(ch),
                            None => bail!("unterminated string in want: {text}"),
                        }
                    }
                    patterns.push(cooked);
                }
                other => bail!("unexpected {other:?} in want: {text}"),
            }
        }
        Ok(patterns)
    }

    /// Every expectation in a package's sources.
    pub fn expectations(package: &Package) -> Result<Vec<Expectation>> {
        let marker = Regex::new(r"//\s*want\s+(.*)$")?;
        let mut found = Vec::new();
        for (index, source) in package.sources.iter().enumerate() {
            for (line_index, line) in source.text.lines().enumerate() {
                let Some(captures) = marker.captures(line) else { continue };
                let body = captures.get(1).map(|m| m.as_str()).unwrap_or_default();
                for pattern in parse_want_patterns(body)? {
                    let pattern = Regex::new(&pattern)
                        .map_err(|e| anyhow!("{}:{}: bad want pattern: {e}", source.name, line_index + 1))?;
                    found.push(Expectation {
                        file: FileId(index as u32),
                        line: line_index + 1,
                        pattern,
                    });
                }
            }
        }
        Ok(found)
    }

    /// Match diagnostics to expectations one to one, by line.
    pub fn check_expectations(package: &Package, diagnostics: &[Diagnostic]) -> Result<Vec<String>> {
        let mut pending = expectations(package)?;
        let mut problems = Vec::new();
        for diagnostic in diagnostics {
            let hit = pending.iter().position(|want| {
                want.file == diagnostic.file && want.line == diagnostic.line && want.pattern.is_match(&diagnostic.message)
            });
            match hit {
                Some(index) => {
                    pending.remove(index);
                }
                None => problems.push(format!("unexpected diagnostic: {diagnostic}")),
            }
        }
        for want in pending {
            problems.push(format!(
                "{}:{}: no diagnostic was reported matching {:?}",
                package.sources[want.file.index()].name,
                want.line,
                want.pattern.as_str()
            ));
        }
        Ok(problems)
    }

    /// Run `analyzer` over `<testdata>/src/<pkg>` and compare with its `want`s.
    pub fn run(testdata: &Path, pkg: &str, analyzer: &'static Analyzer) -> Result<Outcome> {
        let dir = testdata.join("src").join(pkg);
        let mut packages = Package::load_dir(&dir, pkg)?;
        if packages.len() != 1 {
            bail!("{}: expected one package, found {}", dir.display(), packages.len());
        }
        let package = packages.remove(0);
        let diagnostics = package.analyze(&[analyzer])?;
        let problems = check_expectations(&package, &diagnostics)?;
        Ok(Outcome {
            package,
            diagnostics,
            problems,
        })
    }

    /// Sources after applying every first suggested fix, as (name, text).
    pub fn apply_all_fixes(package: &Package, diagnostics: &[Diagnostic]) -> Result<Vec<(String, String)>> {
        let mut fixed = Vec::new();
        for (index, source) in package.sources.iter().enumerate() {
            let outcome = fix_source(&source.text, FileId(index as u32), diagnostics)?;
            fixed.push((source.name.clone(), outcome.text));
        }
        Ok(fixed)
    }

    /// Fixed text of the source whose name ends with `file`.
    pub fn fixed_file(fixed: &[(String, String)], file: &str) -> Option<String> {
        fixed.iter().find(|(name, _)| name.ends_with(file)).map(|(_, text)| text.clone())
    }
}
