// Copyright (C) Brian G. Milnes 2025

//! searchmigrate: flag `sort.Search(n, pred)`
//!
//! Report only. A boundary predicate cannot be turned into the target and
//! ordering that `slices.BinarySearch` expects from syntax alone.

pub mod searchmigrate {
    use crate::analyzer::analyzer::{Analyzer, Pass, INSPECT};
    use crate::ast_utils::ast_utils::qualified_call;
    use crate::visitor::visitor::{Node, NodeKind};
    use anyhow::Result;

    pub const MESSAGE: &str =
        "sort.Search can potentially be replaced with slices.BinarySearch or slices.BinarySearchFunc";

    pub static ANALYZER: Analyzer = Analyzer {
        name: "searchmigrate",
        doc: "detect sort.Search calls that may be replaceable with slices.BinarySearch",
        requires: &[&INSPECT],
        run,
    };

    fn run(pass: &mut Pass<'_>) -> Result<()> {
        let info = pass.info;
        let mut found = Vec::new();
        pass.inspector().preorder(&[NodeKind::Expr], |file, node| {
            let Node::Expr(expr) = node else { return };
            let Some(call) = expr.as_call() else { return };
            if call.args.len() != 2 {
                return;
            }
            if qualified_call(info, call, "sort").is_some_and(|sel| sel.field.name == "Search") {
                found.push((file, expr.span));
            }
        });
        for (file, span) in found {
            pass.reportf(file, span, MESSAGE.to_string());
        }
        Ok(())
    }
}
