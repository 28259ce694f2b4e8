// Copyright (C) Brian G. Milnes 2025

//! Name resolution and type inference for one package
//!
//! Scopes nest block -> file (imports) -> package -> universe. Types are
//! inferred only as far as the package's own source allows; facts about
//! other packages stay unknown, which keeps every dependent rewrite
//! conservative.

pub mod checker {
    use crate::printer::printer::expr_string;
    use crate::syntax::syntax::*;
    use crate::types::types::*;
    use anyhow::{bail, Result};
    use log::{debug, trace};
    use std::collections::HashMap;

    const BUILTIN_FUNCS: &[&str] = &[
        "append", "cap", "clear", "close", "complex", "copy", "delete", "imag", "len", "make", "max", "min",
        "new", "panic", "print", "println", "real", "recover",
    ];

    const BASIC_TYPES: &[&str] = &[
        "bool", "byte", "complex64", "complex128", "float32", "float64", "int", "int8", "int16", "int32",
        "int64", "rune", "string", "uint", "uint8", "uint16", "uint32", "uint64", "uintptr",
    ];

    /// Resolve and type-check the files of one package. All files must share
    /// one NodeIdGen so their ids do not collide.
    pub fn check_package(path: &str, files: &[File]) -> Result<TypeInfo> {
        let Some(first) = files.first() else {
            bail!("package {path} has no files");
        };
        let name = first.package.name.clone();
        for file in files {
            if file.package.name != name {
                bail!(
                    "{}: package {} conflicts with package {} in {}",
                    file.name,
                    file.package.name,
                    name,
                    first.name
                );
            }
        }

        let mut checker = Checker {
            info: TypeInfo::new(PackageRef::new(path, &name)),
            package_scope: HashMap::new(),
            file_scopes: vec![HashMap::new(); files.len()],
            import_paths: HashMap::new(),
            scopes: Vec::new(),
            file: FileId(0),
        };
        checker.collect(files);
        checker.resolve_type_decls(files);
        checker.resolve_signatures(files);
        checker.resolve_package_values(files);
        checker.check_bodies(files);
        debug!(
            "checked package {path}: {} objects, {} resolutions",
            checker.info.objects.len(),
            checker.info.resolutions.len()
        );
        Ok(checker.info)
    }

    /// Result of checking an expression.
    #[derive(Debug, Clone)]
    enum Operand {
        Value(Option<Type>),
        Type(Option<Type>),
        Package,
        Builtin(String),
        Nothing,
    }

    impl Operand {
        fn value_type(self) -> Option<Type> {
            match self {
                Operand::Value(ty) => ty,
                _ => None,
            }
        }
    }

    struct Checker {
        info: TypeInfo,
        package_scope: HashMap<String, DeclId>,
        file_scopes: Vec<HashMap<String, DeclId>>,
        import_paths: HashMap<DeclId, PackageRef>,
        scopes: Vec<HashMap<String, DeclId>>,
        file: FileId,
    }

    enum Lookup {
        Decl(DeclId),
        Universe,
        Missing,
    }

    impl Checker {
        // ---- objects and scopes ----

        fn new_object(&mut self, ident: &Ident, kind: ObjectKind, ty: Option<Type>) -> DeclId {
            let decl = DeclId(self.info.objects.len() as u32);
            self.info.objects.push(Object {
                name: ident.name.clone(),
                kind,
                ty,
                span: ident.span,
                file: self.file,
            });
            self.info.resolutions.insert(ident.id, Resolution::Declared(decl));
            decl
        }

        /// Declare in the innermost block scope.
        fn declare(&mut self, ident: &Ident, kind: ObjectKind, ty: Option<Type>) -> Option<DeclId> {
            if ident.is_blank() {
                return None;
            }
            let decl = self.new_object(ident, kind, ty);
            if let Some(scope) = self.scopes.last_mut() {
                scope.insert(ident.name.clone(), decl);
            }
            Some(decl)
        }

        fn lookup(&self, name: &str) -> Lookup {
            for scope in self.scopes.iter().rev() {
                if let Some(decl) = scope.get(name) {
                    return Lookup::Decl(*decl);
                }
            }
            if let Some(decl) = self.file_scopes[self.file.index()].get(name) {
                return Lookup::Decl(*decl);
            }
            if let Some(decl) = self.package_scope.get(name) {
                return Lookup::Decl(*decl);
            }
            if is_universe(name) {
                Lookup::Universe
            } else {
                Lookup::Missing
            }
        }

        fn set_type(&mut self, decl: DeclId, ty: Option<Type>) {
            if let Some(object) = self.info.objects.get_mut(decl.0 as usize) {
                object.ty = ty;
            }
        }

        fn record(&mut self, expr: &Expr, ty: &Option<Type>) {
            if let Some(ty) = ty {
                self.info.types.insert(expr.id, ty.clone());
            }
        }

        fn named_type(&self, ident: &Ident, decl: DeclId) -> Type {
            Type::Named {
                pkg: Some(self.info.package.clone()),
                name: ident.name.clone(),
                decl: Some(decl),
                args: Vec::new(),
            }
        }

        // ---- package level ----

        fn collect(&mut self, files: &[File]) {
            for file in files {
                self.file = file.id;
                for spec in file.import_specs() {
                    let imported = PackageRef::from_path(&spec.path);
                    let local = match &spec.name {
                        Some(alias) if alias.name == "." || alias.is_blank() => continue,
                        Some(alias) => alias.clone(),
                        None => Ident {
                            id: NodeId(u32::MAX),
                            name: imported.name.clone(),
                            span: spec.span,
                        },
                    };
                    let decl = DeclId(self.info.objects.len() as u32);
                    self.info.objects.push(Object {
                        name: local.name.clone(),
                        kind: ObjectKind::PackageName,
                        ty: None,
                        span: spec.span,
                        file: file.id,
                    });
                    if spec.name.is_some() {
                        self.info.resolutions.insert(
                            local.id,
                            Resolution::PackageName {
                                decl,
                                imported: imported.clone(),
                            },
                        );
                    }
                    self.import_paths.insert(decl, imported);
                    self.file_scopes[file.id.index()].insert(local.name, decl);
                }

                for decl in &file.decls {
                    match decl {
                        Decl::Func(func) => {
                            let decl = self.new_object(&func.name, ObjectKind::Func, None);
                            if func.recv.is_none() && func.name.name != "init" && !func.name.is_blank() {
                                self.package_scope.insert(func.name.name.clone(), decl);
                            }
                        }
                        Decl::Gen(gen) => {
                            for spec in &gen.specs {
                                match spec {
                                    Spec::Type(ts) => {
                                        let decl = self.new_object(&ts.name, ObjectKind::TypeName, None);
                                        self.package_scope.insert(ts.name.name.clone(), decl);
                                    }
                                    Spec::Value(vs) => {
                                        let kind = if gen.kind == GenKind::Const {
                                            ObjectKind::Const
                                        } else {
                                            ObjectKind::Var
                                        };
                                        for name in &vs.names {
                                            if name.is_blank() {
                                                continue;
                                            }
                                            let decl = self.new_object(name, kind, None);
                                            self.package_scope.insert(name.name.clone(), decl);
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }

        fn decl_of(&self, ident: &Ident) -> Option<DeclId> {
            self.info.resolve(ident).decl()
        }

        /// Package scope is order independent: every defined type gets its
        /// object type first, then aliases, then underlying types.
        fn resolve_type_decls(&mut self, files: &[File]) {
            let specs: Vec<(FileId, &TypeSpec)> = files
                .iter()
                .flat_map(|file| {
                    file.decls.iter().flat_map(move |decl| match decl {
                        Decl::Gen(gen) => gen
                            .specs
                            .iter()
                            .filter_map(|spec| match spec {
                                Spec::Type(ts) => Some((file.id, ts)),
                                _ => None,
                            })
                            .collect::<Vec<_>>(),
                        _ => Vec::new(),
                    })
                })
                .collect();

            for (_, ts) in specs.iter().filter(|(_, ts)| !ts.alias) {
                if let Some(decl) = self.decl_of(&ts.name) {
                    let named = self.named_type(&ts.name, decl);
                    self.set_type(decl, Some(named));
                }
            }

            // An alias may name another alias declared after it.
            let mut pending: Vec<(FileId, &TypeSpec)> = specs.iter().copied().filter(|(_, ts)| ts.alias).collect();
            while !pending.is_empty() {
                let before = pending.len();
                pending.retain(|&(file, ts)| {
                    self.file = file;
                    self.type_spec(ts).is_none()
                });
                if pending.len() == before {
                    break;
                }
            }

            for &(file, ts) in specs.iter().filter(|(_, ts)| !ts.alias) {
                self.file = file;
                self.type_spec(ts);
            }
        }

        /// Resolve the right-hand side of a type declaration. An alias takes
        /// it as its object type; a defined type records it as underlying.
        /// The name must already be declared.
        fn type_spec(&mut self, ts: &TypeSpec) -> Option<Type> {
            let decl = self.decl_of(&ts.name)?;
            self.scopes.push(HashMap::new());
            self.declare_type_params(&ts.type_params);
            let rhs = self.type_expr(&ts.ty);
            self.scopes.pop();
            if ts.alias {
                self.set_type(decl, rhs.clone());
            } else {
                self.info.named.entry(decl).or_default().underlying = rhs.clone();
            }
            rhs
        }

        fn declare_type_params(&mut self, params: &[Field]) {
            for field in params {
                for name in &field.names {
                    self.declare(name, ObjectKind::TypeParam, Some(Type::TypeParam(name.name.clone())));
                }
                self.type_expr(&field.ty);
            }
        }

        /// Re-enter type parameters declared while resolving signatures.
        fn reenter_type_params(&mut self, params: &[Field]) {
            for field in params {
                for name in &field.names {
                    if let Some(decl) = self.decl_of(name) {
                        if let Some(scope) = self.scopes.last_mut() {
                            scope.insert(name.name.clone(), decl);
                        }
                    }
                }
            }
        }

        fn resolve_signatures(&mut self, files: &[File]) {
            for file in files {
                self.file = file.id;
                for decl in &file.decls {
                    let Decl::Func(func) = decl else { continue };
                    let Some(decl) = self.decl_of(&func.name) else { continue };
                    self.scopes.push(HashMap::new());
                    self.declare_type_params(&func.sig.type_params);
                    let recv = func.recv.as_ref().and_then(|r| self.receiver_base(r));
                    let sig = self.signature(&func.sig);
                    self.scopes.pop();
                    let ty = Type::Signature(sig);
                    self.set_type(decl, Some(ty.clone()));
                    if let Some(recv_decl) = recv {
                        self.info
                            .named
                            .entry(recv_decl)
                            .or_default()
                            .methods
                            .insert(func.name.name.clone(), ty);
                    }
                }
            }
        }

        /// Declared type a receiver belongs to. Receiver type parameters
        /// (`func (l *List[T])`) are declared in the current scope.
        fn receiver_base(&mut self, recv: &Field) -> Option<DeclId> {
            let mut ty = recv.ty.unparen();
            if let ExprKind::Star(inner) = &ty.kind {
                ty = inner.unparen();
            }
            let (base, params): (&Expr, Vec<&Expr>) = match &ty.kind {
                ExprKind::Index(index) => (&index.base, vec![&*index.index]),
                ExprKind::IndexList { base, indices } => (base, indices.iter().collect()),
                _ => (ty, Vec::new()),
            };
            for param in params {
                if let ExprKind::Ident(ident) = &param.kind {
                    self.declare(ident, ObjectKind::TypeParam, Some(Type::TypeParam(ident.name.clone())));
                }
            }
            let ident = base.as_ident()?;
            let decl = match self.lookup(&ident.name) {
                Lookup::Decl(decl) => decl,
                _ => return None,
            };
            self.info.resolutions.insert(ident.id, Resolution::Declared(decl));
            Some(decl)
        }

        fn receiver_type(&mut self, recv: &Field) -> Option<Type> {
            let mut ty = recv.ty.unparen();
            let pointer = if let ExprKind::Star(inner) = &ty.kind {
                ty = inner.unparen();
                true
            } else {
                false
            };
            let (base, params): (&Expr, Vec<&Expr>) = match &ty.kind {
                ExprKind::Index(index) => (&index.base, vec![&*index.index]),
                ExprKind::IndexList { base, indices } => (base, indices.iter().collect()),
                _ => (ty, Vec::new()),
            };
            let mut args = Vec::new();
            for param in params {
                if let ExprKind::Ident(ident) = &param.kind {
                    self.declare(ident, ObjectKind::TypeParam, Some(Type::TypeParam(ident.name.clone())));
                    args.push(Type::TypeParam(ident.name.clone()));
                }
            }
            let ident = base.as_ident()?;
            let Lookup::Decl(decl) = self.lookup(&ident.name) else {
                return None;
            };
            self.info.resolutions.insert(ident.id, Resolution::Declared(decl));
            let named = Type::Named {
                pkg: Some(self.info.package.clone()),
                name: ident.name.clone(),
                decl: Some(decl),
                args,
            };
            Some(if pointer { Type::Pointer(Box::new(named)) } else { named })
        }

        fn signature(&mut self, sig: &FuncSig) -> Signature {
            let mut params = Vec::new();
            let mut variadic = false;
            for field in &sig.params {
                if let ExprKind::Ellipsis(_) = field.ty.kind {
                    variadic = true;
                }
                let ty = self.type_expr(&field.ty);
                for _ in 0..field.names.len().max(1) {
                    params.push(ty.clone().unwrap_or_else(|| Type::basic("invalid type")));
                }
            }
            let mut results = Vec::new();
            for field in &sig.results {
                let ty = self.type_expr(&field.ty);
                for _ in 0..field.names.len().max(1) {
                    results.push(ty.clone().unwrap_or_else(|| Type::basic("invalid type")));
                }
            }
            Signature {
                params,
                results,
                variadic,
            }
        }

        fn resolve_package_values(&mut self, files: &[File]) {
            for file in files {
                self.file = file.id;
                for decl in &file.decls {
                    let Decl::Gen(gen) = decl else { continue };
                    if gen.kind == GenKind::Type {
                        continue;
                    }
                    let mut previous: Option<&ValueSpec> = None;
                    for spec in &gen.specs {
                        let Spec::Value(vs) = spec else { continue };
                        let types = self.value_spec_types(vs, gen.kind, previous);
                        for (name, ty) in vs.names.iter().zip(types) {
                            if let Some(decl) = self.decl_of(name) {
                                self.set_type(decl, ty);
                            }
                        }
                        if !vs.values.is_empty() {
                            previous = Some(vs);
                        }
                    }
                }
            }
        }

        /// Types for the names of a var or const spec. Constant specs without
        /// values repeat the previous spec's expressions.
        fn value_spec_types(
            &mut self,
            vs: &ValueSpec,
            kind: GenKind,
            previous: Option<&ValueSpec>,
        ) -> Vec<Option<Type>> {
            let declared = vs.ty.as_ref().and_then(|ty| self.type_expr(ty));
            let values: &[Expr] = if vs.values.is_empty() && kind == GenKind::Const {
                previous.map(|p| p.values.as_slice()).unwrap_or(&[])
            } else {
                &vs.values
            };
            let mut value_types: Vec<Option<Type>> = values
                .iter()
                .map(|value| self.check_expr(value).value_type())
                .collect();
            if values.len() == 1 && vs.names.len() > 1 {
                value_types = self.unpack(&values[0], value_types.pop().flatten(), vs.names.len());
            }
            (0..vs.names.len())
                .map(|i| {
                    if declared.is_some() {
                        return declared.clone();
                    }
                    let ty = value_types.get(i).cloned().flatten()?;
                    if kind == GenKind::Const {
                        Some(ty)
                    } else {
                        ty.default_type()
                    }
                })
                .collect()
        }

        /// Spread one multi-valued expression over `n` targets.
        fn unpack(&self, value: &Expr, ty: Option<Type>, n: usize) -> Vec<Option<Type>> {
            if let Some(Type::Tuple(types)) = &ty {
                return types.iter().cloned().map(Some).collect();
            }
            if n == 2 {
                let comma_ok = match &value.unparen().kind {
                    ExprKind::Index(index) => self
                        .info
                        .type_of(&index.base)
                        .and_then(|t| self.info.underlying(t))
                        .is_some_and(|t| matches!(t, Type::Map { .. })),
                    ExprKind::TypeAssert { .. } => true,
                    ExprKind::Unary { op: UnaryOp::Recv, .. } => true,
                    _ => false,
                };
                if comma_ok {
                    return vec![ty, Some(Type::basic("bool"))];
                }
            }
            vec![None; n]
        }

        fn check_bodies(&mut self, files: &[File]) {
            for file in files {
                self.file = file.id;
                for decl in &file.decls {
                    if let Decl::Func(func) = decl {
                        self.func_decl(func);
                    }
                }
            }
        }

        fn func_decl(&mut self, func: &FuncDecl) {
            self.scopes.push(HashMap::new());
            self.reenter_type_params(&func.sig.type_params);
            if let Some(recv) = &func.recv {
                let ty = self.receiver_type(recv);
                for name in &recv.names {
                    self.declare(name, ObjectKind::Var, ty.clone());
                }
            }
            self.declare_params(&func.sig);
            if let Some(body) = &func.body {
                self.stmts(&body.stmts);
            }
            self.scopes.pop();
        }

        fn declare_params(&mut self, sig: &FuncSig) {
            for field in sig.params.iter().chain(&sig.results) {
                let ty = self.type_expr(&field.ty);
                for name in &field.names {
                    self.declare(name, ObjectKind::Var, ty.clone());
                }
            }
        }

        // ---- statements ----

        fn block(&mut self, block: &Block) {
            self.scopes.push(HashMap::new());
            self.stmts(&block.stmts);
            self.scopes.pop();
        }

        fn stmts(&mut self, stmts: &[Stmt]) {
            for stmt in stmts {
                self.stmt(stmt);
            }
        }

        fn stmt(&mut self, stmt: &Stmt) {
            match &stmt.kind {
                StmtKind::Empty | StmtKind::Branch { .. } => {}
                StmtKind::Expr(expr) | StmtKind::Go(expr) | StmtKind::Defer(expr) => {
                    self.check_expr(expr);
                }
                StmtKind::Send { chan, value } => {
                    self.check_expr(chan);
                    self.check_expr(value);
                }
                StmtKind::IncDec { target, .. } => {
                    self.check_expr(target);
                }
                StmtKind::Assign(assign) => self.assign(assign),
                StmtKind::Return(results) => {
                    for result in results {
                        self.check_expr(result);
                    }
                }
                StmtKind::Block(block) => self.block(block),
                StmtKind::If(if_stmt) => {
                    self.scopes.push(HashMap::new());
                    if let Some(init) = &if_stmt.init {
                        self.stmt(init);
                    }
                    self.check_expr(&if_stmt.cond);
                    self.block(&if_stmt.body);
                    if let Some(else_branch) = &if_stmt.else_branch {
                        self.stmt(else_branch);
                    }
                    self.scopes.pop();
                }
                StmtKind::Switch(switch) => self.switch(switch),
                StmtKind::For(for_stmt) => {
                    self.scopes.push(HashMap::new());
                    if let Some(init) = &for_stmt.init {
                        self.stmt(init);
                    }
                    if let Some(cond) = &for_stmt.cond {
                        self.check_expr(cond);
                    }
                    if let Some(post) = &for_stmt.post {
                        self.stmt(post);
                    }
                    self.block(&for_stmt.body);
                    self.scopes.pop();
                }
                StmtKind::Range(range) => self.range(range),
                StmtKind::Labeled { stmt, .. } => self.stmt(stmt),
                StmtKind::Decl(gen) => self.local_decl(gen),
            }
        }

        fn local_decl(&mut self, gen: &GenDecl) {
            let mut previous: Option<&ValueSpec> = None;
            for spec in &gen.specs {
                match spec {
                    Spec::Type(ts) => {
                        let decl = self.declare(&ts.name, ObjectKind::TypeName, None);
                        if let (Some(decl), false) = (decl, ts.alias) {
                            let named = self.named_type(&ts.name, decl);
                            self.set_type(decl, Some(named));
                        }
                        self.type_spec(ts);
                    }
                    Spec::Value(vs) => {
                        let types = self.value_spec_types(vs, gen.kind, previous);
                        let kind = if gen.kind == GenKind::Const {
                            ObjectKind::Const
                        } else {
                            ObjectKind::Var
                        };
                        for (name, ty) in vs.names.iter().zip(types) {
                            self.declare(name, kind, ty);
                        }
                        if !vs.values.is_empty() {
                            previous = Some(vs);
                        }
                    }
                }
            }
        }

        fn assign(&mut self, assign: &AssignStmt) {
            let mut rhs_types: Vec<Option<Type>> =
                assign.rhs.iter().map(|e| self.check_expr(e).value_type()).collect();
            if assign.tok != AssignTok::Define {
                for lhs in &assign.lhs {
                    self.check_expr(lhs);
                }
                return;
            }
            if assign.rhs.len() == 1 && assign.lhs.len() > 1 {
                rhs_types = self.unpack(&assign.rhs[0], rhs_types.pop().flatten(), assign.lhs.len());
            }
            for (i, lhs) in assign.lhs.iter().enumerate() {
                let Some(ident) = lhs.as_ident() else {
                    self.check_expr(lhs);
                    continue;
                };
                if ident.is_blank() {
                    continue;
                }
                let existing = self.scopes.last().and_then(|scope| scope.get(&ident.name)).copied();
                match existing {
                    Some(decl) => {
                        // Redeclaration in the same scope assigns to the existing variable.
                        self.info.resolutions.insert(ident.id, Resolution::Declared(decl));
                        if let Some(ty) = self.info.object(decl).and_then(|o| o.ty.clone()) {
                            self.info.types.insert(lhs.id, ty);
                        }
                    }
                    None => {
                        let ty = rhs_types.get(i).cloned().flatten().and_then(Type::default_type);
                        self.record(lhs, &ty);
                        self.declare(ident, ObjectKind::Var, ty);
                    }
                }
            }
        }

        fn switch(&mut self, switch: &SwitchStmt) {
            self.scopes.push(HashMap::new());
            if let Some(init) = &switch.init {
                self.stmt(init);
            }

            // `switch v := x.(type)` binds v per clause.
            let mut guard: Option<(&Ident, Option<Type>)> = None;
            let mut type_switch = false;
            if let Some(tag) = &switch.tag {
                match &tag.kind {
                    StmtKind::Assign(assign)
                        if assign.tok == AssignTok::Define
                            && assign.lhs.len() == 1
                            && assign.rhs.len() == 1
                            && is_type_guard(&assign.rhs[0]) =>
                    {
                        type_switch = true;
                        let subject = self.guard_subject(&assign.rhs[0]);
                        if let Some(ident) = assign.lhs[0].as_ident() {
                            guard = Some((ident, subject));
                        }
                    }
                    StmtKind::Expr(expr) if is_type_guard(expr) => {
                        type_switch = true;
                        self.guard_subject(expr);
                    }
                    _ => self.stmt(tag),
                }
            }

            for clause in &switch.clauses {
                let mut clause_types = Vec::new();
                for expr in &clause.list {
                    match self.check_expr(expr) {
                        Operand::Type(ty) if type_switch => clause_types.push(ty),
                        _ => clause_types.push(None),
                    }
                }
                self.scopes.push(HashMap::new());
                if let Some((ident, subject)) = &guard {
                    let ty = match clause_types.as_slice() {
                        [single] => single.clone(),
                        _ => subject.clone(),
                    };
                    // One object per clause, all defined by the guard ident.
                    self.declare(ident, ObjectKind::Var, ty);
                }
                self.stmts(&clause.body);
                self.scopes.pop();
            }
            self.scopes.pop();
        }

        fn guard_subject(&mut self, expr: &Expr) -> Option<Type> {
            match &expr.unparen().kind {
                ExprKind::TypeAssert { base, .. } => self.check_expr(base).value_type(),
                _ => None,
            }
        }

        fn range(&mut self, range: &RangeStmt) {
            let ranged = self.check_expr(&range.expr).value_type();
            let (key_ty, value_ty) = match ranged.as_ref().and_then(|t| self.info.underlying(t)) {
                Some(Type::Slice(elem)) | Some(Type::Array { elem, .. }) => (Some(Type::basic("int")), Some(*elem)),
                Some(Type::Pointer(inner)) => match self.info.underlying(&inner) {
                    Some(Type::Array { elem, .. }) => (Some(Type::basic("int")), Some(*elem)),
                    _ => (None, None),
                },
                Some(Type::Basic(name)) if name == "string" || name == "untyped string" => {
                    (Some(Type::basic("int")), Some(Type::basic("rune")))
                }
                Some(Type::Basic(name)) if name.contains("int") => (ranged.clone().and_then(Type::default_type), None),
                Some(Type::Map { key, value }) => (Some(*key), Some(*value)),
                Some(Type::Chan { elem, .. }) => (Some(*elem), None),
                _ => (None, None),
            };

            self.scopes.push(HashMap::new());
            if range.define {
                for (target, ty) in [(&range.key, key_ty), (&range.value, value_ty)] {
                    let Some(target) = target else { continue };
                    if let Some(ident) = target.as_ident() {
                        self.record(target, &ty);
                        self.declare(ident, ObjectKind::Var, ty);
                    }
                }
            } else {
                for target in [&range.key, &range.value].into_iter().flatten() {
                    self.check_expr(target);
                }
            }
            self.block(&range.body);
            self.scopes.pop();
        }

        // ---- expressions ----

        fn check_expr(&mut self, expr: &Expr) -> Operand {
            let operand = self.operand(expr);
            match &operand {
                Operand::Value(ty) | Operand::Type(ty) => self.record(expr, ty),
                _ => {}
            }
            operand
        }

        fn ident_operand(&mut self, ident: &Ident) -> Operand {
            if ident.is_blank() {
                return Operand::Nothing;
            }
            match self.lookup(&ident.name) {
                Lookup::Decl(decl) => {
                    let Some(object) = self.info.object(decl).cloned() else {
                        return Operand::Value(None);
                    };
                    if object.kind == ObjectKind::PackageName {
                        // Path lives in the file's import list.
                        let imported = self.import_of(decl);
                        self.info
                            .resolutions
                            .insert(ident.id, Resolution::PackageName { decl, imported });
                        return Operand::Package;
                    }
                    self.info.resolutions.insert(ident.id, Resolution::Declared(decl));
                    match object.kind {
                        ObjectKind::TypeName | ObjectKind::TypeParam => Operand::Type(object.ty),
                        _ => Operand::Value(object.ty),
                    }
                }
                Lookup::Universe => {
                    self.info.resolutions.insert(ident.id, Resolution::Builtin);
                    universe_operand(&ident.name)
                }
                Lookup::Missing => {
                    trace!("unresolved identifier {}", ident.name);
                    self.info.resolutions.insert(ident.id, Resolution::Unresolved);
                    Operand::Value(None)
                }
            }
        }

        fn import_of(&self, decl: DeclId) -> PackageRef {
            self.import_paths
                .get(&decl)
                .cloned()
                .unwrap_or_else(|| PackageRef::from_path(""))
        }

        fn operand(&mut self, expr: &Expr) -> Operand {
            match &expr.kind {
                ExprKind::Ident(ident) => self.ident_operand(ident),
                ExprKind::BasicLit(lit) => Operand::Value(Some(Type::basic(match lit.kind {
                    LitKind::Int => "untyped int",
                    LitKind::Float => "untyped float",
                    LitKind::Imag => "untyped imag",
                    LitKind::Char => "untyped rune",
                    LitKind::String => "untyped string",
                }))),
                ExprKind::CompositeLit(lit) => Operand::Value(self.composite(lit, None)),
                ExprKind::KeyValue { key, value } => {
                    self.check_expr(key);
                    self.check_expr(value);
                    Operand::Nothing
                }
                ExprKind::FuncLit(lit) => {
                    self.scopes.push(HashMap::new());
                    let sig = self.signature(&lit.sig);
                    self.declare_params(&lit.sig);
                    self.block(&lit.body);
                    self.scopes.pop();
                    Operand::Value(Some(Type::Signature(sig)))
                }
                ExprKind::Paren(inner) => self.check_expr(inner),
                ExprKind::Selector(sel) => self.selector(sel),
                ExprKind::Index(index) => {
                    let base = self.check_expr(&index.base);
                    let key = self.check_expr(&index.index);
                    match base {
                        Operand::Type(Some(ty)) => {
                            let arg = match key {
                                Operand::Type(arg) => arg,
                                _ => None,
                            };
                            Operand::Type(arg.map(|a| instantiate(ty, vec![a])))
                        }
                        Operand::Value(Some(ty)) => Operand::Value(self.index_result(&ty)),
                        _ => Operand::Value(None),
                    }
                }
                ExprKind::IndexList { base, indices } => {
                    let base = self.check_expr(base);
                    let args: Option<Vec<Type>> = indices
                        .iter()
                        .map(|i| match self.check_expr(i) {
                            Operand::Type(ty) => ty,
                            _ => None,
                        })
                        .collect();
                    match (base, args) {
                        (Operand::Type(Some(ty)), Some(args)) => Operand::Type(Some(instantiate(ty, args))),
                        _ => Operand::Value(None),
                    }
                }
                ExprKind::Slice(slice) => {
                    let base = self.check_expr(&slice.base).value_type();
                    for bound in [&slice.low, &slice.high, &slice.max].into_iter().flatten() {
                        self.check_expr(bound);
                    }
                    Operand::Value(base.and_then(|ty| self.slice_result(ty)))
                }
                ExprKind::TypeAssert { base, ty } => {
                    self.check_expr(base);
                    let asserted = ty.as_ref().and_then(|t| self.type_expr(t));
                    Operand::Value(asserted)
                }
                ExprKind::Call(call) => self.call(call),
                ExprKind::Star(inner) => match self.check_expr(inner) {
                    Operand::Type(ty) => Operand::Type(ty.map(|t| Type::Pointer(Box::new(t)))),
                    Operand::Value(Some(ty)) => match self.info.underlying(&ty) {
                        Some(Type::Pointer(elem)) => Operand::Value(Some(*elem)),
                        _ => Operand::Value(None),
                    },
                    _ => Operand::Value(None),
                },
                ExprKind::Unary { op, operand } => {
                    let inner = self.check_expr(operand).value_type();
                    let ty = match op {
                        UnaryOp::Addr => inner.map(|t| Type::Pointer(Box::new(t))),
                        UnaryOp::Not => Some(Type::basic("bool")),
                        UnaryOp::Recv => match inner.as_ref().and_then(|t| self.info.underlying(t)) {
                            Some(Type::Chan { elem, .. }) => Some(*elem),
                            _ => None,
                        },
                        UnaryOp::Plus | UnaryOp::Neg | UnaryOp::BitNot | UnaryOp::Tilde => inner,
                    };
                    Operand::Value(ty)
                }
                ExprKind::Binary(binary) => {
                    let lhs = self.check_expr(&binary.lhs).value_type();
                    let rhs = self.check_expr(&binary.rhs).value_type();
                    let ty = if binary.op.is_comparison() || binary.op.is_logical() {
                        Some(Type::basic("bool"))
                    } else if matches!(binary.op, BinaryOp::Shl | BinaryOp::Shr) {
                        lhs
                    } else {
                        match (lhs, rhs) {
                            (Some(l), Some(r)) if l.is_untyped() => Some(r),
                            (Some(l), _) => Some(l),
                            (None, r) => r,
                        }
                    };
                    Operand::Value(ty)
                }
                ExprKind::ArrayType { .. }
                | ExprKind::MapType { .. }
                | ExprKind::ChanType { .. }
                | ExprKind::FuncType(_)
                | ExprKind::StructType(_)
                | ExprKind::InterfaceType(_) => Operand::Type(self.type_expr(expr)),
                ExprKind::Ellipsis(_) => Operand::Nothing,
            }
        }

        fn selector(&mut self, sel: &SelectorExpr) -> Operand {
            match self.check_expr(&sel.base) {
                Operand::Package => {
                    let Some(ident) = sel.base.as_ident() else {
                        return Operand::Value(None);
                    };
                    let pkg = match self.info.resolve(ident) {
                        Resolution::PackageName { imported, .. } => imported.clone(),
                        _ => return Operand::Value(None),
                    };
                    // Members of other packages are opaque, except that an
                    // exported capitalized name in type position is a type.
                    trace!("qualified reference {}.{}", pkg.name, sel.field.name);
                    Operand::Value(None)
                }
                Operand::Value(Some(ty)) => Operand::Value(self.member(&ty, &sel.field.name)),
                Operand::Type(Some(ty)) => {
                    // Method expression `T.M`: the receiver becomes the first parameter.
                    match self.member(&ty, &sel.field.name) {
                        Some(Type::Signature(mut sig)) => {
                            sig.params.insert(0, ty);
                            Operand::Value(Some(Type::Signature(sig)))
                        }
                        _ => Operand::Value(None),
                    }
                }
                _ => Operand::Value(None),
            }
        }

        /// Field or method `name` of a value of type `ty`.
        fn member(&self, ty: &Type, name: &str) -> Option<Type> {
            self.member_depth(ty, name, 0)
        }

        fn member_depth(&self, ty: &Type, name: &str, depth: usize) -> Option<Type> {
            if depth > 4 {
                return None;
            }
            let ty = match ty {
                Type::Pointer(inner) => inner.as_ref(),
                other => other,
            };
            if let Type::Named { decl: Some(decl), .. } = ty {
                if let Some(method) = self.info.named.get(decl).and_then(|n| n.methods.get(name)) {
                    return Some(method.clone());
                }
            }
            match self.info.underlying(ty)? {
                Type::Struct(fields) => {
                    if let Some(field) = fields.iter().find(|f| f.name == name) {
                        return Some(field.ty.clone());
                    }
                    fields
                        .iter()
                        .filter(|f| f.embedded)
                        .find_map(|f| self.member_depth(&f.ty, name, depth + 1))
                }
                Type::Interface(methods) => methods
                    .iter()
                    .find(|(m, _)| m == name)
                    .map(|(_, sig)| Type::Signature(sig.clone())),
                _ => None,
            }
        }

        fn index_result(&self, ty: &Type) -> Option<Type> {
            match self.info.underlying(ty)? {
                Type::Slice(elem) | Type::Array { elem, .. } => Some(*elem),
                Type::Pointer(inner) => match self.info.underlying(&inner)? {
                    Type::Array { elem, .. } => Some(*elem),
                    _ => None,
                },
                Type::Map { value, .. } => Some(*value),
                Type::Basic(name) if name.ends_with("string") => Some(Type::basic("byte")),
                // Explicit instantiation of a generic function.
                sig @ Type::Signature(_) => Some(sig),
                _ => None,
            }
        }

        fn slice_result(&self, ty: Type) -> Option<Type> {
            match self.info.underlying(&ty)? {
                Type::Slice(_) => Some(ty),
                Type::Array { elem, .. } => Some(Type::Slice(elem)),
                Type::Pointer(inner) => match self.info.underlying(&inner)? {
                    Type::Array { elem, .. } => Some(Type::Slice(elem)),
                    _ => None,
                },
                Type::Basic(name) if name.ends_with("string") => Some(ty),
                _ => None,
            }
        }

        fn call(&mut self, call: &CallExpr) -> Operand {
            let callee = self.check_expr(&call.func);
            match callee {
                Operand::Type(ty) => {
                    for arg in &call.args {
                        self.check_expr(arg);
                    }
                    Operand::Value(ty)
                }
                Operand::Builtin(name) => self.builtin_call(&name, call),
                Operand::Value(Some(Type::Signature(sig))) => {
                    for arg in &call.args {
                        self.check_expr(arg);
                    }
                    match sig.results.len() {
                        0 => Operand::Nothing,
                        1 => Operand::Value(sig.results.into_iter().next()),
                        _ => Operand::Value(Some(Type::Tuple(sig.results))),
                    }
                }
                _ => {
                    for arg in &call.args {
                        self.check_expr(arg);
                    }
                    Operand::Value(None)
                }
            }
        }

        fn builtin_call(&mut self, name: &str, call: &CallExpr) -> Operand {
            let takes_type = matches!(name, "make" | "new");
            let mut arg_types = Vec::new();
            for (i, arg) in call.args.iter().enumerate() {
                let ty = if takes_type && i == 0 {
                    self.type_expr(arg)
                } else {
                    self.check_expr(arg).value_type()
                };
                arg_types.push(ty);
            }
            let first = arg_types.first().cloned().flatten();
            let ty = match name {
                "len" | "cap" | "copy" => Some(Type::basic("int")),
                "make" | "append" => first,
                "new" => first.map(|t| Type::Pointer(Box::new(t))),
                "min" | "max" => arg_types
                    .iter()
                    .flatten()
                    .find(|t| !t.is_untyped())
                    .cloned()
                    .or(first),
                "recover" => Some(Type::Named {
                    pkg: None,
                    name: "any".to_string(),
                    decl: None,
                    args: Vec::new(),
                }),
                "real" | "imag" => Some(Type::basic("float64")),
                "complex" => Some(Type::basic("complex128")),
                _ => return Operand::Nothing,
            };
            Operand::Value(ty)
        }

        /// Composite literal; `expected` is the element type when the
        /// literal's own type is elided.
        fn composite(&mut self, lit: &CompositeLit, expected: Option<Type>) -> Option<Type> {
            let (ty, result) = match &lit.ty {
                Some(ty_expr) => {
                    let ty = match &ty_expr.kind {
                        ExprKind::ArrayType { len: Some(len), elem } if matches!(len.kind, ExprKind::Ellipsis(None)) => {
                            let elem = self.type_expr(elem);
                            elem.map(|e| Type::Array {
                                len: lit.elts.len().to_string(),
                                elem: Box::new(e),
                            })
                        }
                        _ => self.type_expr(ty_expr),
                    };
                    self.record(ty_expr, &ty);
                    (ty.clone(), ty)
                }
                None => match expected {
                    Some(Type::Pointer(inner)) => (Some(*inner.clone()), Some(Type::Pointer(inner))),
                    other => (other.clone(), other),
                },
            };

            let underlying = ty.as_ref().and_then(|t| self.info.underlying(t));
            for (position, elt) in lit.elts.iter().enumerate() {
                match (&elt.kind, &underlying) {
                    (ExprKind::KeyValue { key, value }, Some(Type::Struct(fields))) => {
                        // Struct keys name fields; they are not resolved.
                        let field_ty = key
                            .as_ident()
                            .and_then(|k| fields.iter().find(|f| f.name == k.name))
                            .map(|f| f.ty.clone());
                        self.element(value, field_ty);
                    }
                    (ExprKind::KeyValue { key, value }, Some(Type::Map { key: key_ty, value: value_ty })) => {
                        self.element(key, Some(*key_ty.clone()));
                        self.element(value, Some(*value_ty.clone()));
                    }
                    (ExprKind::KeyValue { key, value }, _) => {
                        self.check_expr(key);
                        let elem = underlying.as_ref().and_then(elem_of);
                        self.element(value, elem);
                    }
                    (_, Some(Type::Struct(fields))) => {
                        let field_ty = fields.get(position).map(|f| f.ty.clone());
                        self.element(elt, field_ty);
                    }
                    _ => {
                        let elem = underlying.as_ref().and_then(elem_of);
                        self.element(elt, elem);
                    }
                }
            }
            result
        }

        fn element(&mut self, expr: &Expr, expected: Option<Type>) {
            match &expr.kind {
                ExprKind::CompositeLit(lit) if lit.ty.is_none() => {
                    let ty = self.composite(lit, expected);
                    self.record(expr, &ty);
                }
                _ => {
                    self.check_expr(expr);
                }
            }
        }

        // ---- type expressions ----

        fn type_expr(&mut self, expr: &Expr) -> Option<Type> {
            let ty = self.type_expr_inner(expr);
            self.record(expr, &ty);
            ty
        }

        fn type_expr_inner(&mut self, expr: &Expr) -> Option<Type> {
            match &expr.kind {
                ExprKind::Ident(_) | ExprKind::Index(_) | ExprKind::IndexList { .. } => {
                    match self.check_expr(expr) {
                        Operand::Type(ty) => ty,
                        _ => None,
                    }
                }
                ExprKind::Selector(sel) => {
                    let ident = sel.base.as_ident()?;
                    if !matches!(self.ident_operand(ident), Operand::Package) {
                        return None;
                    }
                    match self.info.resolve(ident) {
                        Resolution::PackageName { imported, .. } => Some(Type::Named {
                            pkg: Some(imported.clone()),
                            name: sel.field.name.clone(),
                            decl: None,
                            args: Vec::new(),
                        }),
                        _ => None,
                    }
                }
                ExprKind::Paren(inner) => self.type_expr(inner),
                ExprKind::Star(inner) => self.type_expr(inner).map(|t| Type::Pointer(Box::new(t))),
                ExprKind::Ellipsis(Some(elem)) => self.type_expr(elem).map(|t| Type::Slice(Box::new(t))),
                ExprKind::ArrayType { len, elem } => {
                    let elem = self.type_expr(elem);
                    match len {
                        None => elem.map(|e| Type::Slice(Box::new(e))),
                        Some(len) => {
                            if !matches!(len.kind, ExprKind::Ellipsis(None)) {
                                self.check_expr(len);
                            }
                            elem.map(|e| Type::Array {
                                len: expr_string(len),
                                elem: Box::new(e),
                            })
                        }
                    }
                }
                ExprKind::MapType { key, value } => {
                    let key = self.type_expr(key);
                    let value = self.type_expr(value);
                    Some(Type::Map {
                        key: Box::new(key?),
                        value: Box::new(value?),
                    })
                }
                ExprKind::ChanType { dir, elem } => self.type_expr(elem).map(|e| Type::Chan {
                    dir: *dir,
                    elem: Box::new(e),
                }),
                ExprKind::FuncType(sig) => {
                    self.scopes.push(HashMap::new());
                    let sig = self.signature(sig);
                    self.scopes.pop();
                    Some(Type::Signature(sig))
                }
                ExprKind::StructType(fields) => {
                    let mut out = Vec::new();
                    for field in fields {
                        let ty = self.type_expr(&field.ty)?;
                        if field.names.is_empty() {
                            out.push(StructField {
                                name: embedded_name(&field.ty),
                                ty,
                                embedded: true,
                            });
                        } else {
                            for name in &field.names {
                                out.push(StructField {
                                    name: name.name.clone(),
                                    ty: ty.clone(),
                                    embedded: false,
                                });
                            }
                        }
                    }
                    Some(Type::Struct(out))
                }
                ExprKind::InterfaceType(elems) => {
                    let mut methods = Vec::new();
                    for elem in elems {
                        match (elem.names.first(), &elem.ty.kind) {
                            (Some(name), ExprKind::FuncType(sig)) => {
                                self.scopes.push(HashMap::new());
                                let sig = self.signature(sig);
                                self.scopes.pop();
                                methods.push((name.name.clone(), sig));
                            }
                            _ => {
                                // Embedded interfaces and type sets are resolved but not modelled.
                                self.constraint_expr(&elem.ty);
                            }
                        }
                    }
                    Some(Type::Interface(methods))
                }
                _ => {
                    self.check_expr(expr);
                    None
                }
            }
        }

        /// Resolve the names in a constraint such as `~int | ~string`.
        fn constraint_expr(&mut self, expr: &Expr) {
            match &expr.kind {
                ExprKind::Binary(binary) => {
                    self.constraint_expr(&binary.lhs);
                    self.constraint_expr(&binary.rhs);
                }
                ExprKind::Unary { operand, .. } => self.constraint_expr(operand),
                _ => {
                    self.type_expr(expr);
                }
            }
        }
    }

    fn is_type_guard(expr: &Expr) -> bool {
        matches!(expr.unparen().kind, ExprKind::TypeAssert { ty: None, .. })
    }

    fn is_universe(name: &str) -> bool {
        BUILTIN_FUNCS.contains(&name)
            || BASIC_TYPES.contains(&name)
            || matches!(name, "any" | "comparable" | "error" | "true" | "false" | "nil" | "iota")
    }

    fn universe_operand(name: &str) -> Operand {
        if BUILTIN_FUNCS.contains(&name) {
            return Operand::Builtin(name.to_string());
        }
        if BASIC_TYPES.contains(&name) {
            return Operand::Type(Some(Type::basic(name)));
        }
        match name {
            "any" | "comparable" | "error" => Operand::Type(Some(Type::Named {
                pkg: None,
                name: name.to_string(),
                decl: None,
                args: Vec::new(),
            })),
            "true" | "false" => Operand::Value(Some(Type::basic("untyped bool"))),
            "nil" => Operand::Value(Some(Type::basic("untyped nil"))),
            _ => Operand::Value(Some(Type::basic("untyped int"))),
        }
    }

    fn instantiate(ty: Type, args: Vec<Type>) -> Type {
        match ty {
            Type::Named { pkg, name, decl, .. } => Type::Named { pkg, name, decl, args },
            other => other,
        }
    }

    fn elem_of(ty: &Type) -> Option<Type> {
        match ty {
            Type::Slice(elem) | Type::Array { elem, .. } => Some(*elem.clone()),
            _ => None,
        }
    }

    /// Field name of an embedded field: the type name without pointer or package.
    fn embedded_name(ty: &Expr) -> String {
        match &ty.unparen().kind {
            ExprKind::Star(inner) => embedded_name(inner),
            ExprKind::Selector(sel) => sel.field.name.clone(),
            ExprKind::Index(index) => embedded_name(&index.base),
            ExprKind::IndexList { base, .. } => embedded_name(base),
            ExprKind::Ident(ident) => ident.name.clone(),
            _ => String::new(),
        }
    }
}
