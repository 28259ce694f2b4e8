// Copyright (C) Brian G. Milnes 2025

//! Syntax tree queries shared by the passes
//!
//! Provides common functions for recognizing calls and small statement
//! shapes in the syntax tree

pub mod ast_utils {
    use crate::syntax::syntax::*;
    use crate::types::types::{Resolution, TypeInfo};

    /// Is `call` a call of the predeclared function `name`? A user symbol
    /// that shadows the builtin does not count.
    pub fn is_builtin_call(info: &TypeInfo, call: &CallExpr, name: &str) -> bool {
        match call.func.unparen().as_ident() {
            Some(ident) => ident.name == name && info.resolve(ident).is_builtin(),
            None => false,
        }
    }

    /// `call` as a builtin call of `name` with exactly `arity` arguments.
    pub fn builtin_call<'e>(info: &TypeInfo, expr: &'e Expr, name: &str, arity: usize) -> Option<&'e CallExpr> {
        let call = expr.unparen().as_call()?;
        (call.args.len() == arity && is_builtin_call(info, call, name)).then_some(call)
    }

    /// For `pkg.Name(...)` where `pkg` is an import of `path`, the `Name`
    /// identifier. Aliased imports are followed.
    pub fn qualified_call<'e>(info: &TypeInfo, call: &'e CallExpr, path: &str) -> Option<&'e SelectorExpr> {
        let sel = call.func.unparen().as_selector()?;
        let qualifier = sel.base.as_ident()?;
        match info.resolve(qualifier) {
            Resolution::PackageName { imported, .. } if imported.path == path => Some(sel),
            _ => None,
        }
    }

    pub fn single_stmt(block: &Block) -> Option<&Stmt> {
        match block.stmts.as_slice() {
            [stmt] => Some(stmt),
            _ => None,
        }
    }

    /// The only statement of `block` when it is a plain `x = y`.
    pub fn single_assign(block: &Block) -> Option<&AssignStmt> {
        let assign = single_stmt(block)?.as_assign()?;
        (assign.tok == AssignTok::Assign && assign.lhs.len() == 1 && assign.rhs.len() == 1).then_some(assign)
    }

    /// The result of `block` when its only statement is `return e`.
    pub fn single_return(block: &Block) -> Option<&Expr> {
        single_return_stmt(single_stmt(block)?)
    }

    pub fn single_return_stmt(stmt: &Stmt) -> Option<&Expr> {
        match stmt.as_return()? {
            [result] => Some(result),
            _ => None,
        }
    }
}
