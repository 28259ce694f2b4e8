// Copyright (C) Brian G. Milnes 2025

//! Canonical text for expressions
//!
//! Renders an expression the way Go tooling shortens it for messages:
//! single spaces around binary operators, composite literal and function
//! bodies elided as `{…}`.

pub mod printer {
    use crate::syntax::syntax::*;

    /// Canonical rendering of `expr`.
    pub fn expr_string(expr: &Expr) -> String {
        let mut out = String::new();
        write_expr(&mut out, expr);
        out
    }

    fn write_list(out: &mut String, exprs: &[Expr]) {
        for (i, expr) in exprs.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            write_expr(out, expr);
        }
    }

    fn write_fields(out: &mut String, fields: &[Field], sep: &str) {
        for (i, field) in fields.iter().enumerate() {
            if i > 0 {
                out.push_str(sep);
            }
            for (j, name) in field.names.iter().enumerate() {
                if j > 0 {
                    out.push_str(", ");
                }
                out.push_str(&name.name);
            }
            if !field.names.is_empty() {
                out.push(' ');
            }
            write_expr(out, &field.ty);
        }
    }

    fn write_sig(out: &mut String, sig: &FuncSig) {
        out.push('(');
        write_fields(out, &sig.params, ", ");
        out.push(')');
        match sig.results.as_slice() {
            [] => {}
            [single] if single.names.is_empty() => {
                out.push(' ');
                write_expr(out, &single.ty);
            }
            results => {
                out.push_str(" (");
                write_fields(out, results, ", ");
                out.push(')');
            }
        }
    }

    fn write_expr(out: &mut String, expr: &Expr) {
        match &expr.kind {
            ExprKind::Ident(ident) => out.push_str(&ident.name),
            ExprKind::BasicLit(lit) => out.push_str(&lit.value),
            ExprKind::CompositeLit(lit) => {
                if let Some(ty) = &lit.ty {
                    write_expr(out, ty);
                }
                out.push_str("{…}");
            }
            ExprKind::KeyValue { key, value } => {
                write_expr(out, key);
                out.push_str(": ");
                write_expr(out, value);
            }
            ExprKind::FuncLit(lit) => {
                out.push_str("(func");
                write_sig(out, &lit.sig);
                out.push_str(" literal)");
            }
            ExprKind::Paren(inner) => {
                out.push('(');
                write_expr(out, inner);
                out.push(')');
            }
            ExprKind::Selector(sel) => {
                write_expr(out, &sel.base);
                out.push('.');
                out.push_str(&sel.field.name);
            }
            ExprKind::Index(index) => {
                write_expr(out, &index.base);
                out.push('[');
                write_expr(out, &index.index);
                out.push(']');
            }
            ExprKind::IndexList { base, indices } => {
                write_expr(out, base);
                out.push('[');
                write_list(out, indices);
                out.push(']');
            }
            ExprKind::Slice(slice) => {
                write_expr(out, &slice.base);
                out.push('[');
                if let Some(low) = &slice.low {
                    write_expr(out, low);
                }
                out.push(':');
                if let Some(high) = &slice.high {
                    write_expr(out, high);
                }
                if slice.slice3 {
                    out.push(':');
                    if let Some(max) = &slice.max {
                        write_expr(out, max);
                    }
                }
                out.push(']');
            }
            ExprKind::TypeAssert { base, ty } => {
                write_expr(out, base);
                out.push_str(".(");
                match ty {
                    Some(ty) => write_expr(out, ty),
                    None => out.push_str("type"),
                }
                out.push(')');
            }
            ExprKind::Call(call) => {
                write_expr(out, &call.func);
                out.push('(');
                write_list(out, &call.args);
                if call.ellipsis.is_some() {
                    out.push_str("...");
                }
                out.push(')');
            }
            ExprKind::Star(inner) => {
                out.push('*');
                write_expr(out, inner);
            }
            ExprKind::Unary { op, operand } => {
                out.push_str(op.as_str());
                write_expr(out, operand);
            }
            ExprKind::Binary(binary) => {
                write_expr(out, &binary.lhs);
                out.push(' ');
                out.push_str(binary.op.as_str());
                out.push(' ');
                write_expr(out, &binary.rhs);
            }
            ExprKind::ArrayType { len, elem } => {
                out.push('[');
                if let Some(len) = len {
                    write_expr(out, len);
                }
                out.push(']');
                write_expr(out, elem);
            }
            ExprKind::MapType { key, value } => {
                out.push_str("map[");
                write_expr(out, key);
                out.push(']');
                write_expr(out, value);
            }
            ExprKind::ChanType { dir, elem } => {
                out.push_str(match dir {
                    ChanDir::Both => "chan ",
                    ChanDir::Send => "chan<- ",
                    ChanDir::Recv => "<-chan ",
                });
                write_expr(out, elem);
            }
            ExprKind::FuncType(sig) => {
                out.push_str("func");
                write_sig(out, sig);
            }
            ExprKind::StructType(fields) => {
                out.push_str("struct{");
                write_fields(out, fields, "; ");
                out.push('}');
            }
            ExprKind::InterfaceType(elems) => {
                out.push_str("interface{");
                for (i, elem) in elems.iter().enumerate() {
                    if i > 0 {
                        out.push_str("; ");
                    }
                    match (elem.names.first(), &elem.ty.kind) {
                        (Some(name), ExprKind::FuncType(sig)) => {
                            out.push_str(&name.name);
                            write_sig(out, sig);
                        }
                        _ => write_expr(out, &elem.ty),
                    }
                }
                out.push('}');
            }
            ExprKind::Ellipsis(elem) => {
                out.push_str("...");
                if let Some(elem) = elem {
                    write_expr(out, elem);
                }
            }
        }
    }
}
