// Copyright (C) Brian G. Milnes 2025

//! sortmigrate: legacy `sort` functions to their `slices` equivalents
//!
//! Six functions are a rename (`sort.Ints` -> `slices.Sort`). The three
//! taking a `less(i, j int) bool` callback are fixed only when the callback
//! is an inline literal comparing the same index chain on both indices,
//! `s[i].Name < s[j].Name`, which rewrites to
//! `func(a, b T) int { return cmp.Compare(a.Name, b.Name) }`. Any other
//! callback is reported without a fix.
//!
//! Import edits are computed after all call sites are known, one combined
//! edit per file, attached to that file's first fixable diagnostic.

pub mod sortmigrate {
    use crate::analyzer::analyzer::{Analyzer, Pass, SuggestedFix, TextEdit, INSPECT};
    use crate::ast_utils::ast_utils::{qualified_call, single_return};
    use crate::equivalence::equivalence::same_object;
    use crate::importutil::importutil::{add_imports_edit, is_imported_unaliased, local_qualifier};
    use crate::syntax::syntax::*;
    use crate::types::types::{relative_to, TypeInfo};
    use crate::visitor::visitor::{Node, NodeKind};
    use anyhow::Result;
    use log::{debug, trace};
    use regex::Regex;
    use std::collections::{BTreeMap, BTreeSet};

    pub static ANALYZER: Analyzer = Analyzer {
        name: "sortmigrate",
        doc: "detect sort.Xyz calls that can use slices equivalents",
        requires: &[&INSPECT],
        run,
    };

    /// How a legacy function migrates.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Tier {
        /// Same arguments, new name.
        Direct,
        /// Same slice, callback must be rewritten.
        Callback,
    }

    /// Legacy name, replacement in `slices`, tier.
    pub const MIGRATIONS: &[(&str, &str, Tier)] = &[
        ("Strings", "Sort", Tier::Direct),
        ("Ints", "Sort", Tier::Direct),
        ("Float64s", "Sort", Tier::Direct),
        ("IntsAreSorted", "IsSorted", Tier::Direct),
        ("StringsAreSorted", "IsSorted", Tier::Direct),
        ("Float64sAreSorted", "IsSorted", Tier::Direct),
        ("Slice", "SortFunc", Tier::Callback),
        ("SliceStable", "SortStableFunc", Tier::Callback),
        ("SliceIsSorted", "IsSortedFunc", Tier::Callback),
    ];

    pub fn migration(name: &str) -> Option<(&'static str, Tier)> {
        MIGRATIONS
            .iter()
            .find(|(legacy, _, _)| *legacy == name)
            .map(|(_, replacement, tier)| (*replacement, *tier))
    }

    /// A call site waiting for its file's import edit.
    struct Candidate {
        file: FileId,
        span: Span,
        message: String,
        /// None when the site is reported without a fix.
        edits: Option<Vec<TextEdit>>,
        imports: &'static [&'static str],
    }

    fn run(pass: &mut Pass<'_>) -> Result<()> {
        let info = pass.info;
        let files = pass.files;
        let sources = pass.sources;
        let mut candidates = Vec::new();
        pass.inspector().preorder(&[NodeKind::Expr], |file, node| {
            let Node::Expr(expr) = node else { return };
            let Some(call) = expr.as_call() else { return };
            let Some(sel) = qualified_call(info, call, "sort") else { return };
            let Some((replacement, tier)) = migration(&sel.field.name) else { return };
            let message = format!("sort.{} can be replaced with slices.{}", sel.field.name, replacement);
            let ast = &files[file.index()];
            let source = &sources[file.index()].text;
            let (edits, imports): (Option<Vec<TextEdit>>, &'static [&'static str]) = match tier {
                Tier::Direct => (rename_edit(ast, &call.func, replacement).map(|e| vec![e]), &["slices"]),
                Tier::Callback => (callback_edits(info, ast, source, call, replacement), &["cmp", "slices"]),
            };
            candidates.push(Candidate {
                file,
                span: expr.span,
                message,
                edits,
                imports,
            });
        });

        // Phase two: one import edit per file, on its first fixable candidate.
        let mut needed: BTreeMap<FileId, BTreeSet<&'static str>> = BTreeMap::new();
        for candidate in candidates.iter().filter(|c| c.edits.is_some()) {
            needed.entry(candidate.file).or_default().extend(candidate.imports.iter().copied());
        }
        for (file, paths) in needed {
            let paths: Vec<&str> = paths.into_iter().collect();
            let Some(edit) = add_imports_edit(pass.file(file), &paths) else { continue };
            if let Some(first) = candidates.iter_mut().find(|c| c.file == file && c.edits.is_some()) {
                if let Some(edits) = first.edits.as_mut() {
                    edits.push(edit);
                }
            }
        }

        for candidate in candidates {
            match candidate.edits {
                Some(text_edits) => {
                    let fix = SuggestedFix {
                        message: candidate.message.clone(),
                        text_edits,
                    };
                    pass.report(candidate.file, candidate.span, candidate.message, vec![fix]);
                }
                None => pass.reportf(candidate.file, candidate.span, candidate.message),
            }
        }
        Ok(())
    }

    /// Replace `sort.Name` with `slices.Replacement`, written with the
    /// qualifier the file uses for `slices`.
    fn rename_edit(file: &File, callee: &Expr, replacement: &str) -> Option<TextEdit> {
        let qualifier = local_qualifier(file, "slices")?;
        let callee = callee.unparen();
        Some(TextEdit {
            pos: callee.span.start,
            end: callee.span.end,
            new_text: format!("{qualifier}.{replacement}"),
        })
    }

    /// One step after `s[i]` in an index chain.
    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Link {
        Field(String),
        Method(String),
    }

    /// `s[param]` followed by field selections and zero-argument method calls.
    struct Chain<'a> {
        collection: &'a Ident,
        param: &'a Ident,
        links: Vec<Link>,
    }

    fn chain(expr: &Expr) -> Option<Chain<'_>> {
        let mut links = Vec::new();
        let mut current = expr.unparen();
        loop {
            match &current.kind {
                ExprKind::Call(call) if call.args.is_empty() && call.ellipsis.is_none() => {
                    let sel = call.func.unparen().as_selector()?;
                    links.push(Link::Method(sel.field.name.clone()));
                    current = sel.base.unparen();
                }
                ExprKind::Selector(sel) => {
                    links.push(Link::Field(sel.field.name.clone()));
                    current = sel.base.unparen();
                }
                ExprKind::Index(index) => {
                    let collection = index.base.unparen().as_ident()?;
                    let param = index.index.unparen().as_ident()?;
                    links.reverse();
                    return Some(Chain {
                        collection,
                        param,
                        links,
                    });
                }
                _ => return None,
            }
        }
    }

    fn render_chain(var: &str, links: &[Link]) -> String {
        let mut out = var.to_string();
        for link in links {
            match link {
                Link::Field(name) => {
                    out.push('.');
                    out.push_str(name);
                }
                Link::Method(name) => {
                    out.push('.');
                    out.push_str(name);
                    out.push_str("()");
                }
            }
        }
        out
    }

    /// Names of a parameter list when it is exactly two `int` parameters.
    fn int_pair<'a>(info: &TypeInfo, params: &'a [Field]) -> Option<(&'a Ident, &'a Ident)> {
        let mut names = Vec::new();
        for field in params {
            let ty = field.ty.as_ident()?;
            if ty.name != "int" || !info.resolve(ty).is_builtin() {
                return None;
            }
            names.extend(field.names.iter());
        }
        match names.as_slice() {
            [first, second] => Some((*first, *second)),
            _ => None,
        }
    }

    fn mentions_comparator_params(type_text: &str) -> bool {
        match Regex::new(r"\b[ab]\b") {
            Ok(re) => re.is_match(type_text),
            Err(_) => true,
        }
    }

    /// Edits for a callback-tier call, or None when the callback does not
    /// have the one shape that converts safely.
    fn callback_edits(
        info: &TypeInfo,
        file: &File,
        source: &str,
        call: &CallExpr,
        replacement: &str,
    ) -> Option<Vec<TextEdit>> {
        let rejected = |why: &str| {
            let (line, _) = position(source, call.func.span.start);
            trace!("sortmigrate: {}:{}: no fix, {}", file.name, line, why);
        };
        if call.args.len() != 2 || call.ellipsis.is_some() {
            rejected("unexpected arguments");
            return None;
        }
        let Some(slice) = call.args[0].unparen().as_ident() else {
            rejected("slice argument is not a variable");
            return None;
        };
        let Some(lit) = call.args[1].unparen().as_func_lit() else {
            rejected("less is not a function literal");
            return None;
        };
        let Some((first, second)) = int_pair(info, &lit.sig.params) else {
            rejected("less does not take (i, j int)");
            return None;
        };
        let Some(result) = single_return(&lit.body) else {
            rejected("less body is not a single return");
            return None;
        };
        let Some(compare) = result.unparen().as_binary() else {
            rejected("less does not return a comparison");
            return None;
        };
        let greater = match compare.op {
            BinaryOp::Lss | BinaryOp::Leq => false,
            BinaryOp::Gtr | BinaryOp::Geq => true,
            _ => {
                rejected("less is not an ordering comparison");
                return None;
            }
        };

        let (Some(left), Some(right)) = (chain(&compare.lhs), chain(&compare.rhs)) else {
            rejected("operands are not index chains");
            return None;
        };
        if left.links != right.links
            || !same_object(info, left.collection, slice)
            || !same_object(info, right.collection, slice)
        {
            rejected("operands are not the same chain on the sorted slice");
            return None;
        }
        let left_is_second = if same_object(info, left.param, first) && same_object(info, right.param, second) {
            false
        } else if same_object(info, left.param, second) && same_object(info, right.param, first) {
            true
        } else {
            rejected("operands do not index with both parameters");
            return None;
        };
        let descending = greater ^ left_is_second;

        let Some(elem) = info.type_of(&call.args[0]).and_then(|ty| info.slice_elem(ty)) else {
            rejected("slice element type unknown");
            return None;
        };
        for pkg in elem.packages() {
            if pkg.path != info.package.path && !is_imported_unaliased(file, &pkg.path) {
                rejected("element type needs an unaliased import");
                return None;
            }
        }
        let elem_text = elem.render(&relative_to(&info.package.path));
        if mentions_comparator_params(&elem_text) {
            rejected("element type collides with comparator parameters");
            return None;
        }

        let cmp = local_qualifier(file, "cmp")?;
        let slices = local_qualifier(file, "slices")?;
        let (x, y) = if descending { ("b", "a") } else { ("a", "b") };
        let comparator = format!(
            "func(a, b {}) int {{ return {}.Compare({}, {}) }}",
            elem_text,
            cmp,
            render_chain(x, &left.links),
            render_chain(y, &left.links)
        );
        debug!("sortmigrate: {} comparator {}", file.name, comparator);

        let callee = call.func.unparen();
        let lit_span = call.args[1].unparen().span;
        Some(vec![
            TextEdit {
                pos: callee.span.start,
                end: callee.span.end,
                new_text: format!("{slices}.{replacement}"),
            },
            TextEdit {
                pos: lit_span.start,
                end: lit_span.end,
                new_text: comparator,
            },
        ])
    }
}
