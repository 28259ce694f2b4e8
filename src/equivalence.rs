// Copyright (C) Brian G. Milnes 2025

//! Do two expressions denote the same run-time value?
//!
//! Only side-effect-free access paths are compared: identifiers, field
//! selectors, index and slice expressions. Everything else is unequal.

pub mod equivalence {
    use crate::syntax::syntax::{Expr, ExprKind, Ident};
    use crate::types::types::{Resolution, TypeInfo};

    pub fn same_value(info: &TypeInfo, a: &Expr, b: &Expr) -> bool {
        match (&a.unparen().kind, &b.unparen().kind) {
            (ExprKind::Ident(x), ExprKind::Ident(y)) => same_object(info, x, y),
            (ExprKind::Selector(x), ExprKind::Selector(y)) => {
                x.field.name == y.field.name && same_value(info, &x.base, &y.base)
            }
            (ExprKind::Slice(x), ExprKind::Slice(y)) => {
                x.slice3 == y.slice3
                    && same_value(info, &x.base, &y.base)
                    && same_bound(info, x.low.as_deref(), y.low.as_deref())
                    && same_bound(info, x.high.as_deref(), y.high.as_deref())
                    && same_bound(info, x.max.as_deref(), y.max.as_deref())
            }
            (ExprKind::Index(x), ExprKind::Index(y)) => {
                same_value(info, &x.base, &y.base) && same_value(info, &x.index, &y.index)
            }
            _ => false,
        }
    }

    fn same_bound(info: &TypeInfo, a: Option<&Expr>, b: Option<&Expr>) -> bool {
        match (a, b) {
            (None, None) => true,
            (Some(a), Some(b)) => same_value(info, a, b),
            _ => false,
        }
    }

    /// Identity by declaration, never by spelling.
    pub fn same_object(info: &TypeInfo, a: &Ident, b: &Ident) -> bool {
        match (info.resolve(a), info.resolve(b)) {
            (Resolution::Declared(x), Resolution::Declared(y)) => x == y,
            (Resolution::PackageName { decl: x, .. }, Resolution::PackageName { decl: y, .. }) => x == y,
            (Resolution::Builtin, Resolution::Builtin) => a.name == b.name,
            _ => false,
        }
    }
}
