// Copyright (C) Brian G. Milnes 2025

//! makecopy: `dst := make([]T, len(src)); copy(dst, src)` becomes
//! `dst := slices.Clone(src)`
//!
//! Every adjacent statement pair of every statement list is tried. The
//! length argument must provably equal the length of the copy source:
//! `len(src)`, or `len(base)-off` when the source is `base[off:]`.

pub mod makecopy {
    use crate::analyzer::analyzer::{Analyzer, Pass, SuggestedFix, TextEdit, INSPECT};
    use crate::ast_utils::ast_utils::builtin_call;
    use crate::equivalence::equivalence::{same_object, same_value};
    use crate::importutil::importutil::{add_imports_edit, local_qualifier, PendingFileState};
    use crate::printer::printer::expr_string;
    use crate::syntax::syntax::*;
    use crate::types::types::TypeInfo;
    use crate::visitor::visitor::NodeKind;
    use anyhow::Result;
    use log::trace;

    pub static ANALYZER: Analyzer = Analyzer {
        name: "makecopy",
        doc: "detect make+copy pairs that can be replaced with slices.Clone",
        requires: &[&INSPECT],
        run,
    };

    /// A matched pair.
    struct ClonePair<'a> {
        dst: &'a Ident,
        src: &'a Expr,
        span: Span,
    }

    fn run(pass: &mut Pass<'_>) -> Result<()> {
        let info = pass.info;
        let mut found = Vec::new();
        pass.inspector()
            .preorder(&[NodeKind::Block, NodeKind::CaseClause], |file, node| {
                let Some(stmts) = node.stmt_list() else { return };
                for pair in stmts.windows(2) {
                    if let Some(clone) = match_pair(info, &pair[0], &pair[1]) {
                        found.push((file, clone));
                    }
                }
            });

        let mut pending = PendingFileState::new();
        for (file, clone) in found {
            let src = expr_string(clone.src);
            let message = format!("make+copy can be simplified to {} := slices.Clone({})", clone.dst.name, src);
            let ast = pass.file(file);
            let Some(qualifier) = local_qualifier(ast, "slices") else {
                trace!("makecopy: slices only dot/blank imported in {}", ast.name);
                pass.reportf(file, clone.span, message);
                continue;
            };
            let mut text_edits = vec![TextEdit {
                pos: clone.span.start,
                end: clone.span.end,
                new_text: format!("{} := {}.Clone({})", clone.dst.name, qualifier, src),
            }];
            if pending.claim(file, "slices") {
                text_edits.extend(add_imports_edit(ast, &["slices"]));
            }
            let fix = SuggestedFix {
                message: message.clone(),
                text_edits,
            };
            pass.report(file, clone.span, message, vec![fix]);
        }
        Ok(())
    }

    fn match_pair<'a>(info: &TypeInfo, first: &'a Stmt, second: &'a Stmt) -> Option<ClonePair<'a>> {
        let assign = first.as_assign()?;
        if assign.tok != AssignTok::Define || assign.lhs.len() != 1 || assign.rhs.len() != 1 {
            return None;
        }
        let dst = assign.lhs[0].as_ident()?;

        let make = builtin_call(info, &assign.rhs[0], "make", 2)?;
        if !matches!(make.args[0].unparen().kind, ExprKind::ArrayType { len: None, .. }) {
            return None;
        }

        let copy = builtin_call(info, second.as_expr()?, "copy", 2)?;
        let copy_dst = copy.args[0].as_ident()?;
        if copy_dst.name != dst.name || !same_object(info, copy_dst, dst) {
            return None;
        }

        let src = &copy.args[1];
        if !length_of(info, &make.args[1], src) {
            trace!("makecopy: length of {} does not match its copy source", dst.name);
            return None;
        }
        // slices.Clone takes ~[]E; copy also accepts a string source.
        if info.type_of(src).and_then(|ty| info.slice_elem(ty)).is_none() {
            trace!("makecopy: copy source of {} is not a slice", dst.name);
            return None;
        }
        Some(ClonePair {
            dst,
            src,
            span: first.span.to(second.span),
        })
    }

    /// Is `len_expr` the length of `src`?
    fn length_of(info: &TypeInfo, len_expr: &Expr, src: &Expr) -> bool {
        if let Some(call) = builtin_call(info, len_expr, "len", 1) {
            return same_value(info, &call.args[0], src);
        }
        let Some(binary) = len_expr.unparen().as_binary() else {
            return false;
        };
        if binary.op != BinaryOp::Sub {
            return false;
        }
        let Some(len_call) = builtin_call(info, &binary.lhs, "len", 1) else {
            return false;
        };
        let Some(slice) = src.unparen().as_slice() else {
            return false;
        };
        let Some(low) = &slice.low else { return false };
        slice.high.is_none()
            && slice.max.is_none()
            && same_value(info, &len_call.args[0], &slice.base)
            && same_value(info, &binary.rhs, low)
    }
}
