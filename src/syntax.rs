// Copyright (C) Brian G. Milnes 2025

//! Syntax tree for Go compilation units
//!
//! Nodes own their children. Every identifier and expression carries a
//! NodeId that is unique within one package, so resolution and type facts
//! can live outside the tree (see `checker`).

pub mod syntax {
    use serde::{Deserialize, Serialize};

    /// Byte offset into a source buffer.
    pub type Pos = usize;

    /// Half-open byte range `start..end` in one file.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct Span {
        pub start: Pos,
        pub end: Pos,
    }

    impl Span {
        pub fn new(start: Pos, end: Pos) -> Self {
            Span { start, end }
        }

        /// Span from the start of `self` to the end of `other`.
        pub fn to(self, other: Span) -> Span {
            Span::new(self.start, other.end)
        }

        pub fn len(self) -> usize {
            self.end - self.start
        }

        pub fn is_empty(self) -> bool {
            self.start == self.end
        }

        pub fn contains(self, pos: Pos) -> bool {
            self.start <= pos && pos < self.end
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
    pub struct NodeId(pub u32);

    /// Hands out NodeIds; shared by every file parsed into one package.
    #[derive(Debug, Default)]
    pub struct NodeIdGen {
        next: u32,
    }

    impl NodeIdGen {
        pub fn new() -> Self {
            NodeIdGen { next: 0 }
        }

        pub fn fresh(&mut self) -> NodeId {
            let id = NodeId(self.next);
            self.next += 1;
            id
        }
    }

    /// Index of a file within its package.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
    pub struct FileId(pub u32);

    impl FileId {
        pub fn index(self) -> usize {
            self.0 as usize
        }
    }

    /// 1-based line and column of `pos` in `source`.
    pub fn position(source: &str, pos: Pos) -> (usize, usize) {
        let pos = pos.min(source.len());
        let before = &source[..pos];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map(|p| p + 1).unwrap_or(0);
        let column = before[line_start..].chars().count() + 1;
        (line, column)
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct Ident {
        pub id: NodeId,
        pub name: String,
        pub span: Span,
    }

    impl Ident {
        pub fn is_blank(&self) -> bool {
            self.name == "_"
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum LitKind {
        Int,
        Float,
        Imag,
        Char,
        String,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct BasicLit {
        pub kind: LitKind,
        /// Literal exactly as written, quotes included.
        pub value: String,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum UnaryOp {
        Plus,
        Neg,
        Not,
        BitNot,
        Addr,
        Recv,
        Tilde,
    }

    impl UnaryOp {
        pub fn as_str(self) -> &'static str {
            match self {
                UnaryOp::Plus => "+",
                UnaryOp::Neg => "-",
                UnaryOp::Not => "!",
                UnaryOp::BitNot => "^",
                UnaryOp::Addr => "&",
                UnaryOp::Recv => "<-",
                UnaryOp::Tilde => "~",
            }
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum BinaryOp {
        Add,
        Sub,
        Mul,
        Quo,
        Rem,
        And,
        Or,
        Xor,
        Shl,
        Shr,
        AndNot,
        LAnd,
        LOr,
        Eql,
        Neq,
        Lss,
        Leq,
        Gtr,
        Geq,
    }

    impl BinaryOp {
        pub fn as_str(self) -> &'static str {
            match self {
                BinaryOp::Add => "+",
                BinaryOp::Sub => "-",
                BinaryOp::Mul => "*",
                BinaryOp::Quo => "/",
                BinaryOp::Rem => "%",
                BinaryOp::And => "&",
                BinaryOp::Or => "|",
                BinaryOp::Xor => "^",
                BinaryOp::Shl => "<<",
                BinaryOp::Shr => ">>",
                BinaryOp::AndNot => "&^",
                BinaryOp::LAnd => "&&",
                BinaryOp::LOr => "||",
                BinaryOp::Eql => "==",
                BinaryOp::Neq => "!=",
                BinaryOp::Lss => "<",
                BinaryOp::Leq => "<=",
                BinaryOp::Gtr => ">",
                BinaryOp::Geq => ">=",
            }
        }

        /// Go operator precedence, 1 (`||`) through 5 (multiplicative).
        pub fn precedence(self) -> u8 {
            match self {
                BinaryOp::LOr => 1,
                BinaryOp::LAnd => 2,
                BinaryOp::Eql
                | BinaryOp::Neq
                | BinaryOp::Lss
                | BinaryOp::Leq
                | BinaryOp::Gtr
                | BinaryOp::Geq => 3,
                BinaryOp::Add | BinaryOp::Sub | BinaryOp::Or | BinaryOp::Xor => 4,
                BinaryOp::Mul
                | BinaryOp::Quo
                | BinaryOp::Rem
                | BinaryOp::Shl
                | BinaryOp::Shr
                | BinaryOp::And
                | BinaryOp::AndNot => 5,
            }
        }

        pub fn is_comparison(self) -> bool {
            self.precedence() == 3
        }

        pub fn is_logical(self) -> bool {
            matches!(self, BinaryOp::LAnd | BinaryOp::LOr)
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum ChanDir {
        Both,
        Send,
        Recv,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct Expr {
        pub id: NodeId,
        pub span: Span,
        pub kind: ExprKind,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum ExprKind {
        Ident(Ident),
        BasicLit(BasicLit),
        CompositeLit(CompositeLit),
        KeyValue { key: Box<Expr>, value: Box<Expr> },
        FuncLit(FuncLit),
        Paren(Box<Expr>),
        Selector(SelectorExpr),
        Index(IndexExpr),
        IndexList { base: Box<Expr>, indices: Vec<Expr> },
        Slice(SliceExpr),
        /// `x.(T)`; `ty` is None for the `x.(type)` switch guard.
        TypeAssert { base: Box<Expr>, ty: Option<Box<Expr>> },
        Call(CallExpr),
        Star(Box<Expr>),
        Unary { op: UnaryOp, operand: Box<Expr> },
        Binary(BinaryExpr),
        /// `[]T` when `len` is None, `[N]T` or `[...]T` otherwise.
        ArrayType { len: Option<Box<Expr>>, elem: Box<Expr> },
        MapType { key: Box<Expr>, value: Box<Expr> },
        ChanType { dir: ChanDir, elem: Box<Expr> },
        FuncType(FuncSig),
        StructType(Vec<Field>),
        InterfaceType(Vec<Field>),
        /// `...T` in a variadic parameter, or bare `...` as an array length.
        Ellipsis(Option<Box<Expr>>),
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct CompositeLit {
        pub ty: Option<Box<Expr>>,
        pub elts: Vec<Expr>,
        pub lbrace: Pos,
        pub rbrace: Pos,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct FuncLit {
        pub sig: FuncSig,
        pub body: Block,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct SelectorExpr {
        pub base: Box<Expr>,
        pub field: Ident,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct IndexExpr {
        pub base: Box<Expr>,
        pub index: Box<Expr>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct SliceExpr {
        pub base: Box<Expr>,
        pub low: Option<Box<Expr>>,
        pub high: Option<Box<Expr>>,
        pub max: Option<Box<Expr>>,
        pub slice3: bool,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct CallExpr {
        pub func: Box<Expr>,
        pub args: Vec<Expr>,
        /// Position of a trailing `...` on the last argument.
        pub ellipsis: Option<Pos>,
        pub rparen: Pos,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct BinaryExpr {
        pub op: BinaryOp,
        pub lhs: Box<Expr>,
        pub rhs: Box<Expr>,
    }

    impl Expr {
        /// Strip any number of enclosing parentheses.
        pub fn unparen(&self) -> &Expr {
            let mut expr = self;
            while let ExprKind::Paren(inner) = &expr.kind {
                expr = inner;
            }
            expr
        }

        pub fn as_ident(&self) -> Option<&Ident> {
            match &self.kind {
                ExprKind::Ident(ident) => Some(ident),
                _ => None,
            }
        }

        pub fn as_call(&self) -> Option<&CallExpr> {
            match &self.kind {
                ExprKind::Call(call) => Some(call),
                _ => None,
            }
        }

        pub fn as_selector(&self) -> Option<&SelectorExpr> {
            match &self.kind {
                ExprKind::Selector(sel) => Some(sel),
                _ => None,
            }
        }

        pub fn as_index(&self) -> Option<&IndexExpr> {
            match &self.kind {
                ExprKind::Index(index) => Some(index),
                _ => None,
            }
        }

        pub fn as_slice(&self) -> Option<&SliceExpr> {
            match &self.kind {
                ExprKind::Slice(slice) => Some(slice),
                _ => None,
            }
        }

        pub fn as_binary(&self) -> Option<&BinaryExpr> {
            match &self.kind {
                ExprKind::Binary(binary) => Some(binary),
                _ => None,
            }
        }

        pub fn as_func_lit(&self) -> Option<&FuncLit> {
            match &self.kind {
                ExprKind::FuncLit(lit) => Some(lit),
                _ => None,
            }
        }
    }

    /// One entry of a parameter, result, field, or method list.
    #[derive(Debug, Clone, PartialEq)]
    pub struct Field {
        pub names: Vec<Ident>,
        pub ty: Expr,
        pub tag: Option<String>,
        pub span: Span,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct FuncSig {
        pub type_params: Vec<Field>,
        pub params: Vec<Field>,
        pub results: Vec<Field>,
        pub span: Span,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct Block {
        /// From `{` through `}` inclusive.
        pub span: Span,
        pub stmts: Vec<Stmt>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct Stmt {
        pub span: Span,
        pub kind: StmtKind,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum StmtKind {
        Empty,
        Expr(Expr),
        Send { chan: Expr, value: Expr },
        IncDec { target: Expr, inc: bool },
        Assign(AssignStmt),
        Go(Expr),
        Defer(Expr),
        Return(Vec<Expr>),
        Branch { kind: BranchKind, label: Option<Ident> },
        Block(Block),
        If(IfStmt),
        Switch(SwitchStmt),
        For(ForStmt),
        Range(RangeStmt),
        Labeled { label: Ident, stmt: Box<Stmt> },
        Decl(GenDecl),
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum BranchKind {
        Break,
        Continue,
        Goto,
        Fallthrough,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum AssignTok {
        /// `:=`
        Define,
        /// `=`
        Assign,
        /// `+=`, `<<=`, ...
        Op(BinaryOp),
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct AssignStmt {
        pub lhs: Vec<Expr>,
        pub tok: AssignTok,
        pub rhs: Vec<Expr>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct IfStmt {
        pub init: Option<Box<Stmt>>,
        pub cond: Expr,
        pub body: Block,
        /// Either a `Block` or another `If` statement.
        pub else_branch: Option<Box<Stmt>>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct SwitchStmt {
        pub init: Option<Box<Stmt>>,
        /// Expression statement for `switch x`, assignment for `switch v := x.(type)`.
        pub tag: Option<Box<Stmt>>,
        pub clauses: Vec<CaseClause>,
        pub span: Span,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct CaseClause {
        pub span: Span,
        /// Empty for `default`.
        pub list: Vec<Expr>,
        pub is_default: bool,
        pub body: Vec<Stmt>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct ForStmt {
        pub init: Option<Box<Stmt>>,
        pub cond: Option<Expr>,
        pub post: Option<Box<Stmt>>,
        pub body: Block,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct RangeStmt {
        pub key: Option<Expr>,
        pub value: Option<Expr>,
        pub define: bool,
        pub expr: Expr,
        pub body: Block,
    }

    impl Stmt {
        pub fn as_if(&self) -> Option<&IfStmt> {
            match &self.kind {
                StmtKind::If(if_stmt) => Some(if_stmt),
                _ => None,
            }
        }

        pub fn as_assign(&self) -> Option<&AssignStmt> {
            match &self.kind {
                StmtKind::Assign(assign) => Some(assign),
                _ => None,
            }
        }

        pub fn as_expr(&self) -> Option<&Expr> {
            match &self.kind {
                StmtKind::Expr(expr) => Some(expr),
                _ => None,
            }
        }

        pub fn as_return(&self) -> Option<&[Expr]> {
            match &self.kind {
                StmtKind::Return(results) => Some(results),
                _ => None,
            }
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum GenKind {
        Var,
        Const,
        Type,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct GenDecl {
        pub span: Span,
        pub kind: GenKind,
        pub specs: Vec<Spec>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum Spec {
        Value(ValueSpec),
        Type(TypeSpec),
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct ValueSpec {
        pub span: Span,
        pub names: Vec<Ident>,
        pub ty: Option<Expr>,
        pub values: Vec<Expr>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct TypeSpec {
        pub span: Span,
        pub name: Ident,
        pub type_params: Vec<Field>,
        pub alias: bool,
        pub ty: Expr,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct FuncDecl {
        pub span: Span,
        pub recv: Option<Field>,
        pub name: Ident,
        pub sig: FuncSig,
        pub body: Option<Block>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum Decl {
        Func(FuncDecl),
        Gen(GenDecl),
    }

    /// `import "path"` or `import ( ... )`.
    #[derive(Debug, Clone, PartialEq)]
    pub struct ImportDecl {
        pub span: Span,
        /// Positions of `(` and `)` for a grouped declaration.
        pub lparen: Option<Pos>,
        pub rparen: Option<Pos>,
        pub specs: Vec<ImportSpec>,
    }

    impl ImportDecl {
        pub fn is_grouped(&self) -> bool {
            self.lparen.is_some()
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct ImportSpec {
        pub span: Span,
        /// Local name: an alias, `.` or `_`.
        pub name: Option<Ident>,
        /// Unquoted import path.
        pub path: String,
        /// Path literal as written, quotes included.
        pub path_literal: String,
    }

    impl ImportSpec {
        /// The spec as it appears in an import block: `name "path"` or `"path"`.
        pub fn source_text(&self) -> String {
            match &self.name {
                Some(name) => format!("{} {}", name.name, self.path_literal),
                None => self.path_literal.clone(),
            }
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct File {
        pub id: FileId,
        pub name: String,
        pub package: Ident,
        pub imports: Vec<ImportDecl>,
        pub decls: Vec<Decl>,
        pub span: Span,
    }

    impl File {
        pub fn import_specs(&self) -> impl Iterator<Item = &ImportSpec> {
            self.imports.iter().flat_map(|decl| decl.specs.iter())
        }
    }
}
