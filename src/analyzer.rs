// Copyright (C) Brian G. Milnes 2025

//! Pass framework: diagnostics, pass descriptors and the runner

pub mod analyzer {
    use crate::package::package::SourceText;
    use crate::syntax::syntax::{position, File, FileId, Span};
    use crate::types::types::TypeInfo;
    use crate::visitor::visitor::Inspector;
    use anyhow::{bail, Result};
    use log::debug;
    use serde::{Deserialize, Serialize};
    use std::collections::HashSet;

    /// Replace `pos..end` of the original source with `new_text`.
    #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct TextEdit {
        pub pos: usize,
        pub end: usize,
        pub new_text: String,
    }

    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct SuggestedFix {
        pub message: String,
        pub text_edits: Vec<TextEdit>,
    }

    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Diagnostic {
        pub analyzer: String,
        pub file: FileId,
        pub filename: String,
        pub line: usize,
        pub column: usize,
        pub pos: usize,
        pub end: usize,
        pub message: String,
        pub suggested_fixes: Vec<SuggestedFix>,
    }

    impl std::fmt::Display for Diagnostic {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{}:{}:{}: {}", self.filename, self.line, self.column, self.message)
        }
    }

    /// A pass descriptor.
    pub struct Analyzer {
        pub name: &'static str,
        pub doc: &'static str,
        pub requires: &'static [&'static Analyzer],
        pub run: fn(&mut Pass<'_>) -> Result<()>,
    }

    impl std::fmt::Debug for Analyzer {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("Analyzer").field("name", &self.name).finish()
        }
    }

    /// Traversal index every pass here depends on.
    pub static INSPECT: Analyzer = Analyzer {
        name: "inspect",
        doc: "build the preorder traversal index for a package",
        requires: &[],
        run: run_inspect,
    };

    fn run_inspect(pass: &mut Pass<'_>) -> Result<()> {
        debug!("{}: {} nodes indexed", pass.info.package.path, pass.inspector.len());
        Ok(())
    }

    /// Context for one analyzer over one package.
    pub struct Pass<'a> {
        pub analyzer: &'static Analyzer,
        pub files: &'a [File],
        pub sources: &'a [SourceText],
        pub info: &'a TypeInfo,
        inspector: &'a Inspector<'a>,
        diagnostics: Vec<Diagnostic>,
    }

    impl<'a> Pass<'a> {
        pub fn inspector(&self) -> &'a Inspector<'a> {
            self.inspector
        }

        pub fn file(&self, id: FileId) -> &'a File {
            &self.files[id.index()]
        }

        pub fn source(&self, id: FileId) -> &'a str {
            &self.sources[id.index()].text
        }

        pub fn report(&mut self, file: FileId, span: Span, message: String, suggested_fixes: Vec<SuggestedFix>) {
            let (line, column) = position(self.source(file), span.start);
            self.diagnostics.push(Diagnostic {
                analyzer: self.analyzer.name.to_string(),
                file,
                filename: self.sources[file.index()].name.clone(),
                line,
                column,
                pos: span.start,
                end: span.end,
                message,
                suggested_fixes,
            });
        }

        /// Report without a fix.
        pub fn reportf(&mut self, file: FileId, span: Span, message: String) {
            self.report(file, span, message, Vec::new());
        }
    }

    /// Run `analyzers` and their prerequisites over one package. Each
    /// analyzer runs at most once, prerequisites first.
    pub fn run_analyzers(
        files: &[File],
        sources: &[SourceText],
        info: &TypeInfo,
        analyzers: &[&'static Analyzer],
    ) -> Result<Vec<Diagnostic>> {
        let mut order = Vec::new();
        let mut done = HashSet::new();
        let mut active = Vec::new();
        for analyzer in analyzers {
            schedule(analyzer, &mut order, &mut done, &mut active)?;
        }

        let inspector = Inspector::new(files);
        let mut diagnostics = Vec::new();
        for analyzer in order {
            let mut pass = Pass {
                analyzer,
                files,
                sources,
                info,
                inspector: &inspector,
                diagnostics: Vec::new(),
            };
            (analyzer.run)(&mut pass)?;
            debug!(
                "{}: {} reported {} diagnostic(s)",
                info.package.path,
                analyzer.name,
                pass.diagnostics.len()
            );
            diagnostics.append(&mut pass.diagnostics);
        }
        Ok(diagnostics)
    }

    fn schedule(
        analyzer: &'static Analyzer,
        order: &mut Vec<&'static Analyzer>,
        done: &mut HashSet<&'static str>,
        active: &mut Vec<&'static str>,
    ) -> Result<()> {
        if done.contains(analyzer.name) {
            return Ok(());
        }
        if active.contains(&analyzer.name) {
            bail!("analyzer cycle: {} -> {}", active.join(" -> "), analyzer.name);
        }
        active.push(analyzer.name);
        for required in analyzer.requires {
            schedule(required, order, done, active)?;
        }
        active.pop();
        done.insert(analyzer.name);
        order.push(analyzer);
        Ok(())
    }
}
