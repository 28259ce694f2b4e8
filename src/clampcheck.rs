// Copyright (C) Brian G. Milnes 2025

//! clampcheck: clamp idioms that read better as `min(max(...))`
//!
//! Two shapes are recognized:
//!
//! ```text
//! if x < lo { x = lo } else if x > hi { x = hi }
//!
//! if v < lo { return lo }
//! if v > hi { return hi }
//! return v
//! ```
//!
//! Either bound may be checked first; the rendering follows source order.

pub mod clampcheck {
    use crate::analyzer::analyzer::{Analyzer, Pass, SuggestedFix, TextEdit, INSPECT};
    use crate::ast_utils::ast_utils::{single_assign, single_return, single_return_stmt};
    use crate::equivalence::equivalence::same_object;
    use crate::printer::printer::expr_string;
    use crate::syntax::syntax::*;
    use crate::types::types::TypeInfo;
    use crate::visitor::visitor::{Node, NodeKind};
    use anyhow::Result;
    use std::collections::HashSet;

    pub static ANALYZER: Analyzer = Analyzer {
        name: "clampcheck",
        doc: "detect clamp patterns that can use min/max builtins",
        requires: &[&INSPECT],
        run,
    };

    struct Clamp {
        file: FileId,
        span: Span,
        text: String,
    }

    fn run(pass: &mut Pass<'_>) -> Result<()> {
        let info = pass.info;
        let mut found = Vec::new();
        // `else if` statements, which cannot be replaced by an assignment.
        let mut else_ifs: HashSet<(FileId, Span)> = HashSet::new();
        pass.inspector().preorder(
            &[NodeKind::Stmt, NodeKind::Block, NodeKind::CaseClause],
            |file, node| match node {
                Node::Stmt(stmt) => {
                    let Some(if_stmt) = stmt.as_if() else { return };
                    if let Some(else_branch) = &if_stmt.else_branch {
                        if else_branch.as_if().is_some() {
                            else_ifs.insert((file, else_branch.span));
                        }
                    }
                    if else_ifs.contains(&(file, stmt.span)) {
                        return;
                    }
                    if let Some(text) = if_else_clamp(info, if_stmt) {
                        found.push(Clamp {
                            file,
                            span: stmt.span,
                            text,
                        });
                    }
                }
                _ => {
                    let Some(stmts) = node.stmt_list() else { return };
                    for window in stmts.windows(3) {
                        if let Some(text) = return_clamp(info, &window[0], &window[1], &window[2]) {
                            found.push(Clamp {
                                file,
                                span: window[0].span.to(window[2].span),
                                text,
                            });
                        }
                    }
                }
            },
        );

        for clamp in found {
            let message = format!("clamp pattern can be simplified to {} or use a clamp helper", clamp.text);
            let fix = SuggestedFix {
                message: message.clone(),
                text_edits: vec![TextEdit {
                    pos: clamp.span.start,
                    end: clamp.span.end,
                    new_text: clamp.text,
                }],
            };
            pass.report(clamp.file, clamp.span, message, vec![fix]);
        }
        Ok(())
    }

    /// Which side a comparison bounds.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Bound {
        Lower,
        Upper,
    }

    fn bound(op: BinaryOp) -> Option<Bound> {
        match op {
            BinaryOp::Lss | BinaryOp::Leq => Some(Bound::Lower),
            BinaryOp::Gtr | BinaryOp::Geq => Some(Bound::Upper),
            _ => None,
        }
    }

    /// Bounds of two conditions when one is lower and the other upper,
    /// along with the variable each compares.
    fn opposite_bounds<'a>(first: &'a Expr, second: &'a Expr) -> Option<(Bound, &'a Ident, &'a Ident)> {
        let first = first.as_binary()?;
        let second = second.as_binary()?;
        let b1 = bound(first.op)?;
        let b2 = bound(second.op)?;
        if b1 == b2 {
            return None;
        }
        Some((b1, first.lhs.as_ident()?, second.lhs.as_ident()?))
    }

    fn render(first: Bound, value: &str, bound1: &str, bound2: &str) -> String {
        match first {
            Bound::Lower => format!("min(max({value}, {bound1}), {bound2})"),
            Bound::Upper => format!("max(min({value}, {bound1}), {bound2})"),
        }
    }

    fn if_else_clamp(info: &TypeInfo, if_stmt: &IfStmt) -> Option<String> {
        if if_stmt.init.is_some() {
            return None;
        }
        let else_if = if_stmt.else_branch.as_ref()?.as_if()?;
        if else_if.else_branch.is_some() || else_if.init.is_some() {
            return None;
        }
        let (first, var1, var2) = opposite_bounds(&if_stmt.cond, &else_if.cond)?;

        let body1 = single_assign(&if_stmt.body)?;
        let body2 = single_assign(&else_if.body)?;
        let lhs1 = body1.lhs[0].as_ident()?;
        let lhs2 = body2.lhs[0].as_ident()?;
        if !same_object(info, lhs1, lhs2) || !same_object(info, var1, lhs1) || !same_object(info, var2, lhs1) {
            return None;
        }

        let value = &lhs1.name;
        let clamp = render(first, value, &expr_string(&body1.rhs[0]), &expr_string(&body2.rhs[0]));
        Some(format!("{value} = {clamp}"))
    }

    fn return_clamp(info: &TypeInfo, first: &Stmt, second: &Stmt, last: &Stmt) -> Option<String> {
        let if1 = first.as_if()?;
        let if2 = second.as_if()?;
        if if1.init.is_some() || if1.else_branch.is_some() || if2.init.is_some() || if2.else_branch.is_some() {
            return None;
        }
        let result = single_return_stmt(last)?;
        let bound1 = single_return(&if1.body)?;
        let bound2 = single_return(&if2.body)?;

        let (order, var1, var2) = opposite_bounds(&if1.cond, &if2.cond)?;
        if !same_object(info, var1, var2) {
            return None;
        }
        let returned = result.as_ident()?;
        if !same_object(info, returned, var1) {
            return None;
        }
        let clamp = render(order, &var1.name, &expr_string(bound1), &expr_string(bound2));
        Some(format!("return {clamp}"))
    }
}
