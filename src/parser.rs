// Copyright (C) Brian G. Milnes 2025

//! Recursive descent parser for Go source files
//!
//! Follows the structure of the reference Go parser: expressions by
//! precedence climbing, `expr_lev` to keep composite literals out of
//! control clauses, and post-hoc grouping of parameter names.

pub mod parser {
    use crate::lexer::lexer::{tokenize, Tok, Token};
    use crate::syntax::syntax::*;
    use anyhow::Result;

    /// Parse one file with fresh NodeIds. Use `parse_file_with_ids` when
    /// several files belong to the same package.
    pub fn parse_file(name: &str, source: &str) -> Result<File> {
        let mut ids = NodeIdGen::new();
        parse_file_with_ids(FileId(0), name, source, &mut ids)
    }

    pub fn parse_file_with_ids(
        file: FileId,
        name: &str,
        source: &str,
        ids: &mut NodeIdGen,
    ) -> Result<File> {
        let tokens = tokenize(name, source)?;
        let mut parser = Parser {
            src: source,
            name,
            tokens,
            pos: 0,
            prev_end: 0,
            ids,
            expr_lev: 0,
        };
        parser.file(file)
    }

    /// Result of a simple statement in a `for` header.
    enum Simple {
        Stmt(Stmt),
        Range {
            key: Option<Expr>,
            value: Option<Expr>,
            define: bool,
            expr: Expr,
        },
    }

    /// Parameter list entry before names are grouped with their types.
    enum ParamEntry {
        Lone(Ident),
        Named(Ident, Expr),
        Type(Expr),
    }

    struct Parser<'a> {
        src: &'a str,
        name: &'a str,
        tokens: Vec<Token>,
        pos: usize,
        prev_end: Pos,
        ids: &'a mut NodeIdGen,
        expr_lev: i32,
    }

    impl<'a> Parser<'a> {
        // ---- token plumbing ----

        fn peek(&self) -> Tok {
            self.tokens[self.pos].kind
        }

        fn peek_at(&self, n: usize) -> Tok {
            let idx = (self.pos + n).min(self.tokens.len() - 1);
            self.tokens[idx].kind
        }

        fn start(&self) -> Pos {
            self.tokens[self.pos].span.start
        }

        fn at(&self, kind: Tok) -> bool {
            self.peek() == kind
        }

        fn bump(&mut self) -> Token {
            let token = self.tokens[self.pos];
            if token.kind != Tok::Eof {
                self.pos += 1;
                if !token.span.is_empty() {
                    self.prev_end = token.span.end;
                }
            }
            token
        }

        fn eat(&mut self, kind: Tok) -> bool {
            if self.at(kind) {
                self.bump();
                true
            } else {
                false
            }
        }

        fn expect(&mut self, kind: Tok) -> Result<Token> {
            if self.at(kind) {
                Ok(self.bump())
            } else {
                Err(self.error(&format!("expected {kind:?}, found {:?}", self.peek())))
            }
        }

        /// Statement terminator: `;`, or nothing before a closing `)`/`}`.
        fn expect_semi(&mut self) -> Result<()> {
            match self.peek() {
                Tok::Semicolon => {
                    self.bump();
                    Ok(())
                }
                Tok::RParen | Tok::RBrace | Tok::Eof => Ok(()),
                other => Err(self.error(&format!("expected ';', found {other:?}"))),
            }
        }

        fn error(&self, message: &str) -> anyhow::Error {
            let (line, column) = position(self.src, self.start());
            anyhow::anyhow!("{}:{}:{}: {}", self.name, line, column, message)
        }

        fn text(&self, span: Span) -> &'a str {
            &self.src[span.start..span.end]
        }

        fn span_from(&self, start: Pos) -> Span {
            Span::new(start, self.prev_end.max(start))
        }

        fn mk_expr(&mut self, span: Span, kind: ExprKind) -> Expr {
            Expr {
                id: self.ids.fresh(),
                span,
                kind,
            }
        }

        fn ident(&mut self) -> Result<Ident> {
            let token = self.expect(Tok::Ident)?;
            Ok(Ident {
                id: self.ids.fresh(),
                name: self.text(token.span).to_string(),
                span: token.span,
            })
        }

        fn ident_expr(ident: Ident) -> Expr {
            Expr {
                id: ident.id,
                span: ident.span,
                kind: ExprKind::Ident(ident),
            }
        }

        // ---- file level ----

        fn file(&mut self, id: FileId) -> Result<File> {
            let start = self.start();
            self.expect(Tok::Package)?;
            let package = self.ident()?;
            self.expect_semi()?;

            let mut imports = Vec::new();
            while self.at(Tok::Import) {
                imports.push(self.import_decl()?);
                self.expect_semi()?;
            }

            let mut decls = Vec::new();
            while !self.at(Tok::Eof) {
                let decl = match self.peek() {
                    Tok::Func => Decl::Func(self.func_decl()?),
                    Tok::Var | Tok::Const | Tok::Type => Decl::Gen(self.gen_decl()?),
                    Tok::Import => return Err(self.error("imports must appear before other declarations")),
                    other => return Err(self.error(&format!("expected declaration, found {other:?}"))),
                };
                decls.push(decl);
                self.expect_semi()?;
            }

            Ok(File {
                id,
                name: self.name.to_string(),
                package,
                imports,
                decls,
                span: Span::new(start, self.src.len()),
            })
        }

        fn import_decl(&mut self) -> Result<ImportDecl> {
            let start = self.start();
            self.expect(Tok::Import)?;
            let mut specs = Vec::new();
            if self.at(Tok::LParen) {
                let lparen = self.bump().span.start;
                while !self.at(Tok::RParen) && !self.at(Tok::Eof) {
                    specs.push(self.import_spec()?);
                    self.expect_semi()?;
                }
                let rparen = self.expect(Tok::RParen)?.span.start;
                return Ok(ImportDecl {
                    span: self.span_from(start),
                    lparen: Some(lparen),
                    rparen: Some(rparen),
                    specs,
                });
            }
            specs.push(self.import_spec()?);
            Ok(ImportDecl {
                span: self.span_from(start),
                lparen: None,
                rparen: None,
                specs,
            })
        }

        fn import_spec(&mut self) -> Result<ImportSpec> {
            let start = self.start();
            let name = match self.peek() {
                Tok::Ident => Some(self.ident()?),
                Tok::Period => {
                    let token = self.bump();
                    Some(Ident {
                        id: self.ids.fresh(),
                        name: ".".to_string(),
                        span: token.span,
                    })
                }
                _ => None,
            };
            let token = self.expect(Tok::String)?;
            let literal = self.text(token.span);
            Ok(ImportSpec {
                span: self.span_from(start),
                name,
                path: unquote(literal),
                path_literal: literal.to_string(),
            })
        }

        fn func_decl(&mut self) -> Result<FuncDecl> {
            let start = self.start();
            self.expect(Tok::Func)?;
            let recv = if self.at(Tok::LParen) {
                let mut fields = self.parameters(Tok::LParen, Tok::RParen)?;
                if fields.len() != 1 {
                    return Err(self.error("method has multiple receivers"));
                }
                fields.pop()
            } else {
                None
            };
            let name = self.ident()?;
            let type_params = if self.at(Tok::LBrack) {
                self.parameters(Tok::LBrack, Tok::RBrack)?
            } else {
                Vec::new()
            };
            let mut sig = self.signature_rest(start)?;
            sig.type_params = type_params;
            let body = if self.at(Tok::LBrace) {
                Some(self.block()?)
            } else {
                None
            };
            Ok(FuncDecl {
                span: self.span_from(start),
                recv,
                name,
                sig,
                body,
            })
        }

        fn gen_decl(&mut self) -> Result<GenDecl> {
            let start = self.start();
            let kind = match self.bump().kind {
                Tok::Var => GenKind::Var,
                Tok::Const => GenKind::Const,
                _ => GenKind::Type,
            };
            let mut specs = Vec::new();
            if self.eat(Tok::LParen) {
                while !self.at(Tok::RParen) && !self.at(Tok::Eof) {
                    specs.push(self.spec(kind)?);
                    self.expect_semi()?;
                }
                self.expect(Tok::RParen)?;
            } else {
                specs.push(self.spec(kind)?);
            }
            Ok(GenDecl {
                span: self.span_from(start),
                kind,
                specs,
            })
        }

        fn spec(&mut self, kind: GenKind) -> Result<Spec> {
            let start = self.start();
            if kind == GenKind::Type {
                let name = self.ident()?;
                let type_params = if self.at(Tok::LBrack) && self.looks_like_type_params() {
                    self.parameters(Tok::LBrack, Tok::RBrack)?
                } else {
                    Vec::new()
                };
                let alias = self.eat(Tok::Assign);
                let ty = self.parse_type()?;
                return Ok(Spec::Type(TypeSpec {
                    span: self.span_from(start),
                    name,
                    type_params,
                    alias,
                    ty,
                }));
            }

            let mut names = vec![self.ident()?];
            while self.eat(Tok::Comma) {
                names.push(self.ident()?);
            }
            let ty = if !self.at(Tok::Assign) && !self.at(Tok::Semicolon) && !self.at(Tok::RParen) {
                Some(self.parse_type()?)
            } else {
                None
            };
            let values = if self.eat(Tok::Assign) {
                self.expr_list()?
            } else {
                Vec::new()
            };
            Ok(Spec::Value(ValueSpec {
                span: self.span_from(start),
                names,
                ty,
                values,
            }))
        }

        /// After `type Name`, distinguish `[T any]` from an array length `[N]`.
        fn looks_like_type_params(&self) -> bool {
            self.peek_at(1) == Tok::Ident
                && matches!(
                    self.peek_at(2),
                    Tok::Ident
                        | Tok::Comma
                        | Tok::Tilde
                        | Tok::LBrack
                        | Tok::Interface
                        | Tok::Func
                        | Tok::Map
                        | Tok::Chan
                        | Tok::Struct
                )
        }

        // ---- signatures and parameters ----

        /// Parameters and results; the caller has consumed everything up to `(`.
        fn signature_rest(&mut self, start: Pos) -> Result<FuncSig> {
            let params = self.parameters(Tok::LParen, Tok::RParen)?;
            let results = if self.at(Tok::LParen) {
                self.parameters(Tok::LParen, Tok::RParen)?
            } else if self.starts_type() {
                let ty = self.parse_type()?;
                let span = ty.span;
                vec![Field {
                    names: Vec::new(),
                    ty,
                    tag: None,
                    span,
                }]
            } else {
                Vec::new()
            };
            Ok(FuncSig {
                type_params: Vec::new(),
                params,
                results,
                span: self.span_from(start),
            })
        }

        fn starts_type(&self) -> bool {
            matches!(
                self.peek(),
                Tok::Ident
                    | Tok::LBrack
                    | Tok::Mul
                    | Tok::Map
                    | Tok::Chan
                    | Tok::Arrow
                    | Tok::Func
                    | Tok::Struct
                    | Tok::Interface
                    | Tok::LParen
            )
        }

        fn parameters(&mut self, open: Tok, close: Tok) -> Result<Vec<Field>> {
            self.expect(open)?;
            let mut entries = Vec::new();
            while !self.at(close) && !self.at(Tok::Eof) {
                let entry = if self.at(Tok::Ident) {
                    let ident = self.ident()?;
                    if self.at(Tok::Comma) || self.at(close) {
                        ParamEntry::Lone(ident)
                    } else if self.at(Tok::Period) {
                        let base = Self::ident_expr(ident);
                        let ty = self.qualified_rest(base)?;
                        ParamEntry::Type(ty)
                    } else if self.at(Tok::LBrack)
                        && close == Tok::RParen
                        && !matches!(self.peek_at(1), Tok::RBrack | Tok::Int | Tok::Ellipsis)
                    {
                        // `List[int]` used as an unnamed parameter type.
                        let base = Self::ident_expr(ident);
                        ParamEntry::Type(self.type_args(base)?)
                    } else {
                        let ty = self.param_type()?;
                        ParamEntry::Named(ident, ty)
                    }
                } else {
                    ParamEntry::Type(self.param_type()?)
                };
                entries.push(entry);
                if !self.eat(Tok::Comma) {
                    break;
                }
            }
            self.expect(close)?;
            self.group_params(entries)
        }

        fn group_params(&mut self, entries: Vec<ParamEntry>) -> Result<Vec<Field>> {
            let named = entries.iter().any(|e| matches!(e, ParamEntry::Named(..)));
            let mut fields = Vec::new();
            if named {
                let mut pending: Vec<Ident> = Vec::new();
                for entry in entries {
                    match entry {
                        ParamEntry::Lone(ident) => pending.push(ident),
                        ParamEntry::Named(ident, ty) => {
                            pending.push(ident);
                            let start = pending[0].span.start;
                            let span = Span::new(start, ty.span.end);
                            fields.push(Field {
                                names: std::mem::take(&mut pending),
                                ty,
                                tag: None,
                                span,
                            });
                        }
                        ParamEntry::Type(_) => {
                            return Err(self.error("mixed named and unnamed parameters"));
                        }
                    }
                }
                if !pending.is_empty() {
                    return Err(self.error("missing parameter type"));
                }
            } else {
                for entry in entries {
                    let ty = match entry {
                        ParamEntry::Lone(ident) => Self::ident_expr(ident),
                        ParamEntry::Type(ty) => ty,
                        ParamEntry::Named(..) => unreachable!("handled above"),
                    };
                    let span = ty.span;
                    fields.push(Field {
                        names: Vec::new(),
                        ty,
                        tag: None,
                        span,
                    });
                }
            }
            Ok(fields)
        }

        /// A parameter type: a type, `...T`, or a constraint union.
        fn param_type(&mut self) -> Result<Expr> {
            if self.at(Tok::Ellipsis) {
                let start = self.bump().span.start;
                let elem = self.parse_type()?;
                let span = self.span_from(start);
                return Ok(self.mk_expr(span, ExprKind::Ellipsis(Some(Box::new(elem)))));
            }
            self.constraint()
        }

        /// `~T | U | ...`; a plain type when no union operator follows.
        fn constraint(&mut self) -> Result<Expr> {
            let start = self.start();
            let mut lhs = self.constraint_term()?;
            while self.eat(Tok::Or) {
                let rhs = self.constraint_term()?;
                let span = self.span_from(start);
                lhs = self.mk_expr(
                    span,
                    ExprKind::Binary(BinaryExpr {
                        op: BinaryOp::Or,
                        lhs: Box::new(lhs),
                        rhs: Box::new(rhs),
                    }),
                );
            }
            Ok(lhs)
        }

        fn constraint_term(&mut self) -> Result<Expr> {
            if self.at(Tok::Tilde) {
                let start = self.bump().span.start;
                let operand = self.parse_type()?;
                let span = self.span_from(start);
                return Ok(self.mk_expr(
                    span,
                    ExprKind::Unary {
                        op: UnaryOp::Tilde,
                        operand: Box::new(operand),
                    },
                ));
            }
            self.parse_type()
        }

        // ---- types ----

        fn parse_type(&mut self) -> Result<Expr> {
            let start = self.start();
            match self.peek() {
                Tok::Ident => {
                    let ident = self.ident()?;
                    let mut ty = Self::ident_expr(ident);
                    if self.at(Tok::Period) {
                        ty = self.qualified_rest(ty)?;
                    }
                    if self.at(Tok::LBrack) {
                        ty = self.type_args(ty)?;
                    }
                    Ok(ty)
                }
                Tok::LBrack => {
                    self.bump();
                    let len = if self.eat(Tok::RBrack) {
                        None
                    } else if self.at(Tok::Ellipsis) {
                        let token = self.bump();
                        self.expect(Tok::RBrack)?;
                        Some(Box::new(self.mk_expr(token.span, ExprKind::Ellipsis(None))))
                    } else {
                        self.expr_lev += 1;
                        let len = self.expr()?;
                        self.expr_lev -= 1;
                        self.expect(Tok::RBrack)?;
                        Some(Box::new(len))
                    };
                    let elem = self.parse_type()?;
                    let span = self.span_from(start);
                    Ok(self.mk_expr(
                        span,
                        ExprKind::ArrayType {
                            len,
                            elem: Box::new(elem),
                        },
                    ))
                }
                Tok::Mul => {
                    self.bump();
                    let elem = self.parse_type()?;
                    let span = self.span_from(start);
                    Ok(self.mk_expr(span, ExprKind::Star(Box::new(elem))))
                }
                Tok::Map => {
                    self.bump();
                    self.expect(Tok::LBrack)?;
                    let key = self.parse_type()?;
                    self.expect(Tok::RBrack)?;
                    let value = self.parse_type()?;
                    let span = self.span_from(start);
                    Ok(self.mk_expr(
                        span,
                        ExprKind::MapType {
                            key: Box::new(key),
                            value: Box::new(value),
                        },
                    ))
                }
                Tok::Chan | Tok::Arrow => {
                    let dir = if self.eat(Tok::Arrow) {
                        self.expect(Tok::Chan)?;
                        ChanDir::Recv
                    } else {
                        self.bump();
                        if self.eat(Tok::Arrow) {
                            ChanDir::Send
                        } else {
                            ChanDir::Both
                        }
                    };
                    let elem = self.parse_type()?;
                    let span = self.span_from(start);
                    Ok(self.mk_expr(
                        span,
                        ExprKind::ChanType {
                            dir,
                            elem: Box::new(elem),
                        },
                    ))
                }
                Tok::Func => {
                    self.bump();
                    let sig = self.signature_rest(start)?;
                    let span = self.span_from(start);
                    Ok(self.mk_expr(span, ExprKind::FuncType(sig)))
                }
                Tok::Struct => self.struct_type(),
                Tok::Interface => self.interface_type(),
                Tok::LParen => {
                    self.bump();
                    let inner = self.parse_type()?;
                    self.expect(Tok::RParen)?;
                    let span = self.span_from(start);
                    Ok(self.mk_expr(span, ExprKind::Paren(Box::new(inner))))
                }
                other => Err(self.error(&format!("expected type, found {other:?}"))),
            }
        }

        fn qualified_rest(&mut self, base: Expr) -> Result<Expr> {
            self.expect(Tok::Period)?;
            let field = self.ident()?;
            let span = base.span.to(field.span);
            Ok(self.mk_expr(
                span,
                ExprKind::Selector(SelectorExpr {
                    base: Box::new(base),
                    field,
                }),
            ))
        }

        /// Generic instantiation `T[A, B]` in a type context.
        fn type_args(&mut self, base: Expr) -> Result<Expr> {
            self.expect(Tok::LBrack)?;
            self.expr_lev += 1;
            let mut args = vec![self.parse_type()?];
            while self.eat(Tok::Comma) {
                if self.at(Tok::RBrack) {
                    break;
                }
                args.push(self.parse_type()?);
            }
            self.expr_lev -= 1;
            self.expect(Tok::RBrack)?;
            let span = self.span_from(base.span.start);
            let kind = if args.len() == 1 {
                ExprKind::Index(IndexExpr {
                    base: Box::new(base),
                    index: Box::new(args.remove(0)),
                })
            } else {
                ExprKind::IndexList {
                    base: Box::new(base),
                    indices: args,
                }
            };
            Ok(self.mk_expr(span, kind))
        }

        fn struct_type(&mut self) -> Result<Expr> {
            let start = self.start();
            self.expect(Tok::Struct)?;
            self.expect(Tok::LBrace)?;
            let mut fields = Vec::new();
            while !self.at(Tok::RBrace) && !self.at(Tok::Eof) {
                let field_start = self.start();
                let embedded = match self.peek() {
                    Tok::Mul => true,
                    Tok::Ident => matches!(
                        self.peek_at(1),
                        Tok::Semicolon | Tok::RBrace | Tok::String | Tok::Period
                    ),
                    _ => false,
                };
                let (names, ty) = if embedded {
                    (Vec::new(), self.parse_type()?)
                } else {
                    let mut names = vec![self.ident()?];
                    while self.eat(Tok::Comma) {
                        names.push(self.ident()?);
                    }
                    (names, self.parse_type()?)
                };
                let tag = if self.at(Tok::String) {
                    let token = self.bump();
                    Some(self.text(token.span).to_string())
                } else {
                    None
                };
                fields.push(Field {
                    names,
                    ty,
                    tag,
                    span: self.span_from(field_start),
                });
                self.expect_semi()?;
            }
            self.expect(Tok::RBrace)?;
            let span = self.span_from(start);
            Ok(self.mk_expr(span, ExprKind::StructType(fields)))
        }

        fn interface_type(&mut self) -> Result<Expr> {
            let start = self.start();
            self.expect(Tok::Interface)?;
            self.expect(Tok::LBrace)?;
            let mut elems = Vec::new();
            while !self.at(Tok::RBrace) && !self.at(Tok::Eof) {
                let elem_start = self.start();
                if self.at(Tok::Ident) && self.peek_at(1) == Tok::LParen {
                    let name = self.ident()?;
                    let sig = self.signature_rest(elem_start)?;
                    let ty = self.mk_expr(sig.span, ExprKind::FuncType(sig));
                    elems.push(Field {
                        names: vec![name],
                        ty,
                        tag: None,
                        span: self.span_from(elem_start),
                    });
                } else {
                    let ty = self.constraint()?;
                    elems.push(Field {
                        names: Vec::new(),
                        ty,
                        tag: None,
                        span: self.span_from(elem_start),
                    });
                }
                self.expect_semi()?;
            }
            self.expect(Tok::RBrace)?;
            let span = self.span_from(start);
            Ok(self.mk_expr(span, ExprKind::InterfaceType(elems)))
        }

        // ---- statements ----

        fn block(&mut self) -> Result<Block> {
            let start = self.expect(Tok::LBrace)?.span.start;
            let saved = self.expr_lev;
            self.expr_lev = 0;
            let stmts = self.stmt_list()?;
            self.expr_lev = saved;
            self.expect(Tok::RBrace)?;
            Ok(Block {
                span: self.span_from(start),
                stmts,
            })
        }

        fn stmt_list(&mut self) -> Result<Vec<Stmt>> {
            let mut stmts = Vec::new();
            while !matches!(self.peek(), Tok::RBrace | Tok::Case | Tok::Default | Tok::Eof) {
                if self.eat(Tok::Semicolon) {
                    continue;
                }
                stmts.push(self.stmt()?);
                if !matches!(self.peek(), Tok::RBrace | Tok::Case | Tok::Default) {
                    self.expect_semi()?;
                }
            }
            Ok(stmts)
        }

        fn stmt(&mut self) -> Result<Stmt> {
            let start = self.start();
            let kind = match self.peek() {
                Tok::LBrace => StmtKind::Block(self.block()?),
                Tok::If => return self.if_stmt(),
                Tok::For => return self.for_stmt(),
                Tok::Switch => return self.switch_stmt(),
                Tok::Return => {
                    self.bump();
                    let results = if matches!(self.peek(), Tok::Semicolon | Tok::RBrace) {
                        Vec::new()
                    } else {
                        self.expr_list()?
                    };
                    StmtKind::Return(results)
                }
                Tok::Go | Tok::Defer => {
                    let go = self.bump().kind == Tok::Go;
                    let call = self.expr()?;
                    if call.as_call().is_none() {
                        return Err(self.error("expression in go/defer must be a function call"));
                    }
                    if go {
                        StmtKind::Go(call)
                    } else {
                        StmtKind::Defer(call)
                    }
                }
                Tok::Break | Tok::Continue | Tok::Goto | Tok::Fallthrough => {
                    let kind = match self.bump().kind {
                        Tok::Break => BranchKind::Break,
                        Tok::Continue => BranchKind::Continue,
                        Tok::Goto => BranchKind::Goto,
                        _ => BranchKind::Fallthrough,
                    };
                    let label = if kind != BranchKind::Fallthrough && self.at(Tok::Ident) {
                        Some(self.ident()?)
                    } else {
                        None
                    };
                    StmtKind::Branch { kind, label }
                }
                Tok::Var | Tok::Const | Tok::Type => StmtKind::Decl(self.gen_decl()?),
                Tok::Select => return Err(self.error("select statements are not supported")),
                Tok::Semicolon => StmtKind::Empty,
                _ => {
                    return match self.simple_stmt(false, true)? {
                        Simple::Stmt(stmt) => Ok(stmt),
                        Simple::Range { .. } => Err(self.error("unexpected range")),
                    };
                }
            };
            Ok(Stmt {
                span: self.span_from(start),
                kind,
            })
        }

        fn simple_stmt(&mut self, range_ok: bool, label_ok: bool) -> Result<Simple> {
            let start = self.start();
            if range_ok && self.at(Tok::Range) {
                self.bump();
                let expr = self.expr()?;
                return Ok(Simple::Range {
                    key: None,
                    value: None,
                    define: false,
                    expr,
                });
            }

            let lhs = self.expr_list()?;
            let tok = match self.peek() {
                Tok::Define => Some(AssignTok::Define),
                Tok::Assign => Some(AssignTok::Assign),
                Tok::AddAssign => Some(AssignTok::Op(BinaryOp::Add)),
                Tok::SubAssign => Some(AssignTok::Op(BinaryOp::Sub)),
                Tok::MulAssign => Some(AssignTok::Op(BinaryOp::Mul)),
                Tok::QuoAssign => Some(AssignTok::Op(BinaryOp::Quo)),
                Tok::RemAssign => Some(AssignTok::Op(BinaryOp::Rem)),
                Tok::AndAssign => Some(AssignTok::Op(BinaryOp::And)),
                Tok::OrAssign => Some(AssignTok::Op(BinaryOp::Or)),
                Tok::XorAssign => Some(AssignTok::Op(BinaryOp::Xor)),
                Tok::ShlAssign => Some(AssignTok::Op(BinaryOp::Shl)),
                Tok::ShrAssign => Some(AssignTok::Op(BinaryOp::Shr)),
                Tok::AndNotAssign => Some(AssignTok::Op(BinaryOp::AndNot)),
                _ => None,
            };

            if let Some(tok) = tok {
                self.bump();
                if range_ok && self.at(Tok::Range) && matches!(tok, AssignTok::Define | AssignTok::Assign) {
                    if lhs.len() > 2 {
                        return Err(self.error("range clause permits at most two iteration variables"));
                    }
                    self.bump();
                    let expr = self.expr()?;
                    let mut lhs = lhs.into_iter();
                    return Ok(Simple::Range {
                        key: lhs.next(),
                        value: lhs.next(),
                        define: tok == AssignTok::Define,
                        expr,
                    });
                }
                let rhs = self.expr_list()?;
                return Ok(Simple::Stmt(Stmt {
                    span: self.span_from(start),
                    kind: StmtKind::Assign(AssignStmt { lhs, tok, rhs }),
                }));
            }

            let mut lhs = lhs;
            if lhs.len() > 1 {
                return Err(self.error("expected assignment after expression list"));
            }
            let x = lhs.remove(0);
            let kind = match self.peek() {
                Tok::Inc | Tok::Dec => {
                    let inc = self.bump().kind == Tok::Inc;
                    StmtKind::IncDec { target: x, inc }
                }
                Tok::Arrow => {
                    self.bump();
                    let value = self.expr()?;
                    StmtKind::Send { chan: x, value }
                }
                Tok::Colon if label_ok && x.as_ident().is_some() => {
                    self.bump();
                    let label = match x.kind {
                        ExprKind::Ident(ident) => ident,
                        _ => unreachable!("checked by guard"),
                    };
                    let stmt = if self.at(Tok::RBrace) {
                        Stmt {
                            span: Span::new(self.start(), self.start()),
                            kind: StmtKind::Empty,
                        }
                    } else {
                        self.stmt()?
                    };
                    StmtKind::Labeled {
                        label,
                        stmt: Box::new(stmt),
                    }
                }
                _ => StmtKind::Expr(x),
            };
            Ok(Simple::Stmt(Stmt {
                span: self.span_from(start),
                kind,
            }))
        }

        fn simple_stmt_plain(&mut self) -> Result<Stmt> {
            match self.simple_stmt(false, false)? {
                Simple::Stmt(stmt) => Ok(stmt),
                Simple::Range { .. } => Err(self.error("unexpected range")),
            }
        }

        fn stmt_to_expr(&self, stmt: Stmt, what: &str) -> Result<Expr> {
            match stmt.kind {
                StmtKind::Expr(expr) => Ok(expr),
                _ => Err(self.error(&format!("expected {what} expression"))),
            }
        }

        fn if_stmt(&mut self) -> Result<Stmt> {
            let start = self.expect(Tok::If)?.span.start;
            let saved = self.expr_lev;
            self.expr_lev = -1;
            if self.at(Tok::LBrace) {
                return Err(self.error("missing condition in if statement"));
            }
            let (init, cond) = if self.at(Tok::Semicolon) {
                self.bump();
                (None, self.expr()?)
            } else {
                let first = self.simple_stmt_plain()?;
                if self.eat(Tok::Semicolon) {
                    let cond = self.expr()?;
                    (Some(Box::new(first)), cond)
                } else {
                    (None, self.stmt_to_expr(first, "boolean")?)
                }
            };
            self.expr_lev = saved;
            let body = self.block()?;
            let else_branch = if self.eat(Tok::Else) {
                match self.peek() {
                    Tok::If => Some(Box::new(self.if_stmt()?)),
                    Tok::LBrace => {
                        let block = self.block()?;
                        Some(Box::new(Stmt {
                            span: block.span,
                            kind: StmtKind::Block(block),
                        }))
                    }
                    _ => return Err(self.error("else must be followed by if or statement block")),
                }
            } else {
                None
            };
            Ok(Stmt {
                span: self.span_from(start),
                kind: StmtKind::If(IfStmt {
                    init,
                    cond,
                    body,
                    else_branch,
                }),
            })
        }

        fn for_stmt(&mut self) -> Result<Stmt> {
            let start = self.expect(Tok::For)?.span.start;
            let saved = self.expr_lev;
            self.expr_lev = -1;

            let mut init = None;
            let mut cond = None;
            let mut post = None;
            let mut range = None;

            if !self.at(Tok::LBrace) {
                let first = if self.at(Tok::Semicolon) {
                    None
                } else {
                    Some(self.simple_stmt(true, false)?)
                };
                match first {
                    Some(Simple::Range {
                        key,
                        value,
                        define,
                        expr,
                        ..
                    }) => range = Some((key, value, define, expr)),
                    first => {
                        let first = first.map(|s| match s {
                            Simple::Stmt(stmt) => stmt,
                            Simple::Range { .. } => unreachable!("matched above"),
                        });
                        if self.eat(Tok::Semicolon) {
                            init = first.map(Box::new);
                            if !self.at(Tok::Semicolon) {
                                cond = Some(self.expr()?);
                            }
                            self.expect(Tok::Semicolon)?;
                            if !self.at(Tok::LBrace) {
                                post = Some(Box::new(self.simple_stmt_plain()?));
                            }
                        } else if let Some(stmt) = first {
                            cond = Some(self.stmt_to_expr(stmt, "for loop condition")?);
                        }
                    }
                }
            }
            self.expr_lev = saved;
            let body = self.block()?;
            let span = self.span_from(start);

            let kind = match range {
                Some((key, value, define, expr)) => StmtKind::Range(RangeStmt {
                    key,
                    value,
                    define,
                    expr,
                    body,
                }),
                None => StmtKind::For(ForStmt {
                    init,
                    cond,
                    post,
                    body,
                }),
            };
            Ok(Stmt { span, kind })
        }

        fn switch_stmt(&mut self) -> Result<Stmt> {
            let start = self.expect(Tok::Switch)?.span.start;
            let saved = self.expr_lev;
            self.expr_lev = -1;
            let mut init = None;
            let mut tag = None;
            if !self.at(Tok::LBrace) {
                let first = if self.at(Tok::Semicolon) {
                    None
                } else {
                    Some(self.simple_stmt_plain()?)
                };
                if self.eat(Tok::Semicolon) {
                    init = first.map(Box::new);
                    if !self.at(Tok::LBrace) {
                        tag = Some(Box::new(self.simple_stmt_plain()?));
                    }
                } else {
                    tag = first.map(Box::new);
                }
            }
            self.expr_lev = saved;

            self.expect(Tok::LBrace)?;
            let mut clauses = Vec::new();
            while !self.at(Tok::RBrace) && !self.at(Tok::Eof) {
                let clause_start = self.start();
                let (list, is_default) = if self.eat(Tok::Default) {
                    (Vec::new(), true)
                } else {
                    self.expect(Tok::Case)?;
                    (self.expr_list()?, false)
                };
                self.expect(Tok::Colon)?;
                let body = self.stmt_list()?;
                clauses.push(CaseClause {
                    span: self.span_from(clause_start),
                    list,
                    is_default,
                    body,
                });
            }
            self.expect(Tok::RBrace)?;
            let span = self.span_from(start);
            Ok(Stmt {
                span,
                kind: StmtKind::Switch(SwitchStmt {
                    init,
                    tag,
                    clauses,
                    span,
                }),
            })
        }

        // ---- expressions ----

        fn expr_list(&mut self) -> Result<Vec<Expr>> {
            let mut list = vec![self.expr()?];
            while self.eat(Tok::Comma) {
                list.push(self.expr()?);
            }
            Ok(list)
        }

        fn expr(&mut self) -> Result<Expr> {
            self.binary_expr(1)
        }

        fn binary_op(&self) -> Option<BinaryOp> {
            let op = match self.peek() {
                Tok::LOr => BinaryOp::LOr,
                Tok::LAnd => BinaryOp::LAnd,
                Tok::Eql => BinaryOp::Eql,
                Tok::Neq => BinaryOp::Neq,
                Tok::Lss => BinaryOp::Lss,
                Tok::Leq => BinaryOp::Leq,
                Tok::Gtr => BinaryOp::Gtr,
                Tok::Geq => BinaryOp::Geq,
                Tok::Add => BinaryOp::Add,
                Tok::Sub => BinaryOp::Sub,
                Tok::Or => BinaryOp::Or,
                Tok::Xor => BinaryOp::Xor,
                Tok::Mul => BinaryOp::Mul,
                Tok::Quo => BinaryOp::Quo,
                Tok::Rem => BinaryOp::Rem,
                Tok::Shl => BinaryOp::Shl,
                Tok::Shr => BinaryOp::Shr,
                Tok::And => BinaryOp::And,
                Tok::AndNot => BinaryOp::AndNot,
                _ => return None,
            };
            Some(op)
        }

        fn binary_expr(&mut self, min_prec: u8) -> Result<Expr> {
            let mut lhs = self.unary_expr()?;
            while let Some(op) = self.binary_op() {
                if op.precedence() < min_prec {
                    break;
                }
                self.bump();
                let rhs = self.binary_expr(op.precedence() + 1)?;
                let span = lhs.span.to(rhs.span);
                lhs = self.mk_expr(
                    span,
                    ExprKind::Binary(BinaryExpr {
                        op,
                        lhs: Box::new(lhs),
                        rhs: Box::new(rhs),
                    }),
                );
            }
            Ok(lhs)
        }

        fn unary_expr(&mut self) -> Result<Expr> {
            let start = self.start();
            let op = match self.peek() {
                Tok::Add => Some(UnaryOp::Plus),
                Tok::Sub => Some(UnaryOp::Neg),
                Tok::Not => Some(UnaryOp::Not),
                Tok::Xor => Some(UnaryOp::BitNot),
                Tok::And => Some(UnaryOp::Addr),
                Tok::Tilde => Some(UnaryOp::Tilde),
                _ => None,
            };
            if let Some(op) = op {
                self.bump();
                let operand = self.unary_expr()?;
                let span = self.span_from(start);
                return Ok(self.mk_expr(
                    span,
                    ExprKind::Unary {
                        op,
                        operand: Box::new(operand),
                    },
                ));
            }
            match self.peek() {
                Tok::Arrow => {
                    if self.peek_at(1) == Tok::Chan {
                        let ty = self.parse_type()?;
                        return self.primary_suffixes(ty);
                    }
                    self.bump();
                    let operand = self.unary_expr()?;
                    let span = self.span_from(start);
                    Ok(self.mk_expr(
                        span,
                        ExprKind::Unary {
                            op: UnaryOp::Recv,
                            operand: Box::new(operand),
                        },
                    ))
                }
                Tok::Mul => {
                    self.bump();
                    let operand = self.unary_expr()?;
                    let span = self.span_from(start);
                    Ok(self.mk_expr(span, ExprKind::Star(Box::new(operand))))
                }
                _ => self.primary_expr(),
            }
        }

        fn primary_expr(&mut self) -> Result<Expr> {
            let operand = self.operand()?;
            self.primary_suffixes(operand)
        }

        fn operand(&mut self) -> Result<Expr> {
            let start = self.start();
            match self.peek() {
                Tok::Ident => {
                    let ident = self.ident()?;
                    Ok(Self::ident_expr(ident))
                }
                Tok::Int | Tok::Float | Tok::Imag | Tok::Char | Tok::String => {
                    let token = self.bump();
                    let kind = match token.kind {
                        Tok::Int => LitKind::Int,
                        Tok::Float => LitKind::Float,
                        Tok::Imag => LitKind::Imag,
                        Tok::Char => LitKind::Char,
                        _ => LitKind::String,
                    };
                    let value = self.text(token.span).to_string();
                    Ok(self.mk_expr(token.span, ExprKind::BasicLit(BasicLit { kind, value })))
                }
                Tok::LParen => {
                    self.bump();
                    self.expr_lev += 1;
                    let inner = self.expr()?;
                    self.expr_lev -= 1;
                    self.expect(Tok::RParen)?;
                    let span = self.span_from(start);
                    Ok(self.mk_expr(span, ExprKind::Paren(Box::new(inner))))
                }
                Tok::Func => {
                    self.bump();
                    let sig = self.signature_rest(start)?;
                    if self.at(Tok::LBrace) {
                        self.expr_lev += 1;
                        let body = self.block()?;
                        self.expr_lev -= 1;
                        let span = self.span_from(start);
                        Ok(self.mk_expr(span, ExprKind::FuncLit(FuncLit { sig, body })))
                    } else {
                        let span = self.span_from(start);
                        Ok(self.mk_expr(span, ExprKind::FuncType(sig)))
                    }
                }
                Tok::LBrack | Tok::Map | Tok::Chan | Tok::Struct | Tok::Interface => self.parse_type(),
                other => Err(self.error(&format!("expected operand, found {other:?}"))),
            }
        }

        fn primary_suffixes(&mut self, mut x: Expr) -> Result<Expr> {
            loop {
                match self.peek() {
                    Tok::Period => {
                        self.bump();
                        if self.eat(Tok::LParen) {
                            let ty = if self.eat(Tok::Type) {
                                None
                            } else {
                                Some(Box::new(self.parse_type()?))
                            };
                            self.expect(Tok::RParen)?;
                            let span = self.span_from(x.span.start);
                            x = self.mk_expr(
                                span,
                                ExprKind::TypeAssert {
                                    base: Box::new(x),
                                    ty,
                                },
                            );
                        } else {
                            let field = self.ident()?;
                            let span = x.span.to(field.span);
                            x = self.mk_expr(
                                span,
                                ExprKind::Selector(SelectorExpr {
                                    base: Box::new(x),
                                    field,
                                }),
                            );
                        }
                    }
                    Tok::LBrack => x = self.index_or_slice(x)?,
                    Tok::LParen => x = self.call(x)?,
                    Tok::LBrace => {
                        if !self.is_literal_type(&x) {
                            return Ok(x);
                        }
                        x = self.composite_lit(Some(x))?;
                    }
                    _ => return Ok(x),
                }
            }
        }

        fn is_literal_type(&self, x: &Expr) -> bool {
            match &x.unparen().kind {
                ExprKind::Ident(_) | ExprKind::Selector(_) => {
                    self.expr_lev >= 0 && is_type_name(x.unparen())
                }
                ExprKind::Index(_) | ExprKind::IndexList { .. } => self.expr_lev >= 0,
                ExprKind::ArrayType { .. } | ExprKind::StructType(_) | ExprKind::MapType { .. } => true,
                _ => false,
            }
        }

        fn index_or_slice(&mut self, base: Expr) -> Result<Expr> {
            self.expect(Tok::LBrack)?;
            self.expr_lev += 1;
            let mut parts: [Option<Box<Expr>>; 3] = [None, None, None];
            let mut colons = 0;
            if !self.at(Tok::Colon) {
                parts[0] = Some(Box::new(self.expr_or_type()?));
            }
            if self.at(Tok::Comma) {
                let Some(first) = parts[0].take() else {
                    return Err(self.error("expected operand"));
                };
                let mut indices = vec![*first];
                while self.eat(Tok::Comma) {
                    if self.at(Tok::RBrack) {
                        break;
                    }
                    indices.push(self.expr_or_type()?);
                }
                self.expr_lev -= 1;
                self.expect(Tok::RBrack)?;
                let span = self.span_from(base.span.start);
                return Ok(self.mk_expr(
                    span,
                    ExprKind::IndexList {
                        base: Box::new(base),
                        indices,
                    },
                ));
            }
            while colons < 2 && self.eat(Tok::Colon) {
                colons += 1;
                if !self.at(Tok::Colon) && !self.at(Tok::RBrack) {
                    parts[colons] = Some(Box::new(self.expr()?));
                }
            }
            self.expr_lev -= 1;
            self.expect(Tok::RBrack)?;
            let span = self.span_from(base.span.start);

            if colons == 0 {
                let Some(index) = parts[0].take() else {
                    return Err(self.error("expected operand"));
                };
                return Ok(self.mk_expr(
                    span,
                    ExprKind::Index(IndexExpr {
                        base: Box::new(base),
                        index,
                    }),
                ));
            }
            let [low, high, max] = parts;
            let slice3 = colons == 2;
            if slice3 && (high.is_none() || max.is_none()) {
                return Err(self.error("middle and final index required in 3-index slice"));
            }
            Ok(self.mk_expr(
                span,
                ExprKind::Slice(SliceExpr {
                    base: Box::new(base),
                    low,
                    high,
                    max,
                    slice3,
                }),
            ))
        }

        /// Arguments may be types (`make([]int, n)`, `new(T)`).
        fn expr_or_type(&mut self) -> Result<Expr> {
            self.expr()
        }

        fn call(&mut self, func: Expr) -> Result<Expr> {
            self.expect(Tok::LParen)?;
            self.expr_lev += 1;
            let mut args = Vec::new();
            let mut ellipsis = None;
            while !self.at(Tok::RParen) && !self.at(Tok::Eof) {
                args.push(self.expr_or_type()?);
                if self.at(Tok::Ellipsis) {
                    ellipsis = Some(self.bump().span.start);
                }
                if !self.eat(Tok::Comma) {
                    break;
                }
            }
            self.expr_lev -= 1;
            let rparen = self.expect(Tok::RParen)?.span.start;
            let span = self.span_from(func.span.start);
            Ok(self.mk_expr(
                span,
                ExprKind::Call(CallExpr {
                    func: Box::new(func),
                    args,
                    ellipsis,
                    rparen,
                }),
            ))
        }

        fn composite_lit(&mut self, ty: Option<Expr>) -> Result<Expr> {
            let start = ty.as_ref().map(|t| t.span.start).unwrap_or_else(|| self.start());
            let lbrace = self.expect(Tok::LBrace)?.span.start;
            self.expr_lev += 1;
            let mut elts = Vec::new();
            while !self.at(Tok::RBrace) && !self.at(Tok::Eof) {
                let key = self.element()?;
                let elt = if self.eat(Tok::Colon) {
                    let value = self.element()?;
                    let span = key.span.to(value.span);
                    self.mk_expr(
                        span,
                        ExprKind::KeyValue {
                            key: Box::new(key),
                            value: Box::new(value),
                        },
                    )
                } else {
                    key
                };
                elts.push(elt);
                if !self.eat(Tok::Comma) {
                    break;
                }
            }
            self.expr_lev -= 1;
            let rbrace = self.expect(Tok::RBrace)?.span.start;
            let span = self.span_from(start);
            Ok(self.mk_expr(
                span,
                ExprKind::CompositeLit(CompositeLit {
                    ty: ty.map(Box::new),
                    elts,
                    lbrace,
                    rbrace,
                }),
            ))
        }

        fn element(&mut self) -> Result<Expr> {
            if self.at(Tok::LBrace) {
                self.composite_lit(None)
            } else {
                self.expr()
            }
        }
    }

    fn is_type_name(x: &Expr) -> bool {
        match &x.kind {
            ExprKind::Ident(_) => true,
            ExprKind::Selector(sel) => matches!(sel.base.kind, ExprKind::Ident(_)),
            _ => false,
        }
    }

    /// Value of a Go string literal as used for import paths.
    fn unquote(literal: &str) -> String {
        let inner = literal
            .strip_prefix('"')
            .and_then(|s| s.strip_suffix('"'))
            .or_else(|| literal.strip_prefix('`').and_then(|s| s.strip_suffix('`')))
            .unwrap_or(literal);
        let mut out = String::with_capacity(inner.len());
        let mut chars = inner.chars();
        while let Some(c) = chars.next() {
            if c == '\\' && literal.starts_with('"') {
                match chars.next() {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some(other) => out.push(other),
                    None => {}
                }
            } else {
                out.push(c);
            }
        }
        out
    }
}
