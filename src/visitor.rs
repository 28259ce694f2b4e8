// Copyright (C) Brian G. Milnes 2025

//! Preorder traversal of a package's syntax trees
//!
//! The `Inspector` walks every file once and keeps the visit order, so each
//! analyzer that asks for a node kind replays the list instead of walking
//! the trees again.

pub mod visitor {
    use crate::syntax::syntax::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum NodeKind {
        File,
        FuncDecl,
        GenDecl,
        /// Any statement list: a `{ ... }` block.
        Block,
        /// A switch case; its body is a statement list too.
        CaseClause,
        Stmt,
        Expr,
    }

    #[derive(Debug, Clone, Copy)]
    pub enum Node<'a> {
        File(&'a File),
        FuncDecl(&'a FuncDecl),
        GenDecl(&'a GenDecl),
        Block(&'a Block),
        CaseClause(&'a CaseClause),
        Stmt(&'a Stmt),
        Expr(&'a Expr),
    }

    impl<'a> Node<'a> {
        pub fn kind(&self) -> NodeKind {
            match self {
                Node::File(_) => NodeKind::File,
                Node::FuncDecl(_) => NodeKind::FuncDecl,
                Node::GenDecl(_) => NodeKind::GenDecl,
                Node::Block(_) => NodeKind::Block,
                Node::CaseClause(_) => NodeKind::CaseClause,
                Node::Stmt(_) => NodeKind::Stmt,
                Node::Expr(_) => NodeKind::Expr,
            }
        }

        /// Statement list of a block or case clause.
        pub fn stmt_list(&self) -> Option<&'a [Stmt]> {
            match self {
                Node::Block(block) => Some(&block.stmts),
                Node::CaseClause(clause) => Some(&clause.body),
                _ => None,
            }
        }
    }

    pub struct Inspector<'a> {
        events: Vec<(FileId, Node<'a>)>,
    }

    impl<'a> Inspector<'a> {
        pub fn new(files: &'a [File]) -> Self {
            let mut walker = Walker { events: Vec::new(), file: FileId(0) };
            for file in files {
                walker.file = file.id;
                walker.file_node(file);
            }
            Inspector { events: walker.events }
        }

        /// Call `f` for every node whose kind is in `filter`, in source order.
        /// An empty filter visits everything.
        pub fn preorder(&self, filter: &[NodeKind], mut f: impl FnMut(FileId, Node<'a>)) {
            for (file, node) in &self.events {
                if filter.is_empty() || filter.contains(&node.kind()) {
                    f(*file, *node);
                }
            }
        }

        pub fn len(&self) -> usize {
            self.events.len()
        }

        pub fn is_empty(&self) -> bool {
            self.events.is_empty()
        }
    }

    struct Walker<'a> {
        events: Vec<(FileId, Node<'a>)>,
        file: FileId,
    }

    impl<'a> Walker<'a> {
        fn push(&mut self, node: Node<'a>) {
            self.events.push((self.file, node));
        }

        fn file_node(&mut self, file: &'a File) {
            self.push(Node::File(file));
            for decl in &file.decls {
                match decl {
                    Decl::Func(func) => {
                        self.push(Node::FuncDecl(func));
                        if let Some(recv) = &func.recv {
                            self.field(recv);
                        }
                        self.sig(&func.sig);
                        if let Some(body) = &func.body {
                            self.block(body);
                        }
                    }
                    Decl::Gen(gen) => self.gen_decl(gen),
                }
            }
        }

        fn gen_decl(&mut self, gen: &'a GenDecl) {
            self.push(Node::GenDecl(gen));
            for spec in &gen.specs {
                match spec {
                    Spec::Value(vs) => {
                        if let Some(ty) = &vs.ty {
                            self.expr(ty);
                        }
                        vs.values.iter().for_each(|v| self.expr(v));
                    }
                    Spec::Type(ts) => {
                        ts.type_params.iter().for_each(|f| self.field(f));
                        self.expr(&ts.ty);
                    }
                }
            }
        }

        fn field(&mut self, field: &'a Field) {
            self.expr(&field.ty);
        }

        fn sig(&mut self, sig: &'a FuncSig) {
            for field in sig.type_params.iter().chain(&sig.params).chain(&sig.results) {
                self.field(field);
            }
        }

        fn block(&mut self, block: &'a Block) {
            self.push(Node::Block(block));
            block.stmts.iter().for_each(|s| self.stmt(s));
        }

        fn stmt(&mut self, stmt: &'a Stmt) {
            self.push(Node::Stmt(stmt));
            match &stmt.kind {
                StmtKind::Empty | StmtKind::Branch { .. } => {}
                StmtKind::Expr(e) | StmtKind::Go(e) | StmtKind::Defer(e) => self.expr(e),
                StmtKind::Send { chan, value } => {
                    self.expr(chan);
                    self.expr(value);
                }
                StmtKind::IncDec { target, .. } => self.expr(target),
                StmtKind::Assign(assign) => {
                    assign.lhs.iter().for_each(|e| self.expr(e));
                    assign.rhs.iter().for_each(|e| self.expr(e));
                }
                StmtKind::Return(results) => results.iter().for_each(|e| self.expr(e)),
                StmtKind::Block(block) => self.block(block),
                StmtKind::If(if_stmt) => {
                    if let Some(init) = &if_stmt.init {
                        self.stmt(init);
                    }
                    self.expr(&if_stmt.cond);
                    self.block(&if_stmt.body);
                    if let Some(else_branch) = &if_stmt.else_branch {
                        self.stmt(else_branch);
                    }
                }
                StmtKind::Switch(switch) => {
                    if let Some(init) = &switch.init {
                        self.stmt(init);
                    }
                    if let Some(tag) = &switch.tag {
                        self.stmt(tag);
                    }
                    for clause in &switch.clauses {
                        self.push(Node::CaseClause(clause));
                        clause.list.iter().for_each(|e| self.expr(e));
                        clause.body.iter().for_each(|s| self.stmt(s));
                    }
                }
                StmtKind::For(for_stmt) => {
                    if let Some(init) = &for_stmt.init {
                        self.stmt(init);
                    }
                    if let Some(cond) = &for_stmt.cond {
                        self.expr(cond);
                    }
                    if let Some(post) = &for_stmt.post {
                        self.stmt(post);
                    }
                    self.block(&for_stmt.body);
                }
                StmtKind::Range(range) => {
                    for target in [&range.key, &range.value].into_iter().flatten() {
                        self.expr(target);
                    }
                    self.expr(&range.expr);
                    self.block(&range.body);
                }
                StmtKind::Labeled { stmt, .. } => self.stmt(stmt),
                StmtKind::Decl(gen) => self.gen_decl(gen),
            }
        }

        fn expr(&mut self, expr: &'a Expr) {
            self.push(Node::Expr(expr));
            match &expr.kind {
                ExprKind::Ident(_) | ExprKind::BasicLit(_) | ExprKind::Ellipsis(None) => {}
                ExprKind::CompositeLit(lit) => {
                    if let Some(ty) = &lit.ty {
                        self.expr(ty);
                    }
                    lit.elts.iter().for_each(|e| self.expr(e));
                }
                ExprKind::KeyValue { key, value } => {
                    self.expr(key);
                    self.expr(value);
                }
                ExprKind::FuncLit(lit) => {
                    self.sig(&lit.sig);
                    self.block(&lit.body);
                }
                ExprKind::Paren(inner) | ExprKind::Star(inner) | ExprKind::Ellipsis(Some(inner)) => {
                    self.expr(inner)
                }
                ExprKind::Unary { operand, .. } => self.expr(operand),
                ExprKind::Selector(sel) => self.expr(&sel.base),
                ExprKind::Index(index) => {
                    self.expr(&index.base);
                    self.expr(&index.index);
                }
                ExprKind::IndexList { base, indices } => {
                    self.expr(base);
                    indices.iter().for_each(|e| self.expr(e));
                }
                ExprKind::Slice(slice) => {
                    self.expr(&slice.base);
                    for bound in [&slice.low, &slice.high, &slice.max].into_iter().flatten() {
                        self.expr(bound);
                    }
                }
                ExprKind::TypeAssert { base, ty } => {
                    self.expr(base);
                    if let Some(ty) = ty {
                        self.expr(ty);
                    }
                }
                ExprKind::Call(call) => {
                    self.expr(&call.func);
                    call.args.iter().for_each(|e| self.expr(e));
                }
                ExprKind::Binary(binary) => {
                    self.expr(&binary.lhs);
                    self.expr(&binary.rhs);
                }
                ExprKind::ArrayType { len, elem } => {
                    if let Some(len) = len {
                        self.expr(len);
                    }
                    self.expr(elem);
                }
                ExprKind::MapType { key, value } => {
                    self.expr(key);
                    self.expr(value);
                }
                ExprKind::ChanType { elem, .. } => self.expr(elem),
                ExprKind::FuncType(sig) => self.sig(sig),
                ExprKind::StructType(fields) | ExprKind::InterfaceType(fields) => {
                    fields.iter().for_each(|f| self.field(f))
                }
            }
        }
    }
}
