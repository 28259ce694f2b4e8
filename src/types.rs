// Copyright (C) Brian G. Milnes 2025

//! Declaration identity, name resolution results and static types
//!
//! `TypeInfo` is the oracle the analyzers query. It is filled in by
//! `checker::check_package` and never mutated afterwards.

pub mod types {
    use crate::syntax::syntax::{ChanDir, Expr, FileId, Ident, NodeId, Span};
    use serde::{Deserialize, Serialize};
    use std::collections::{BTreeMap, HashMap};

    /// Identity of one declared object. Two identifiers denote the same
    /// variable iff they resolve to the same DeclId.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
    pub struct DeclId(pub u32);

    /// An imported package: its canonical path and declared name.
    #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
    pub struct PackageRef {
        pub path: String,
        pub name: String,
    }

    impl PackageRef {
        /// Package whose name is derived from its import path.
        pub fn from_path(path: &str) -> Self {
            PackageRef {
                path: path.to_string(),
                name: default_package_name(path),
            }
        }

        pub fn new(path: &str, name: &str) -> Self {
            PackageRef {
                path: path.to_string(),
                name: name.to_string(),
            }
        }
    }

    /// Last path element, skipping a trailing major-version element (`/v2`).
    pub fn default_package_name(path: &str) -> String {
        let mut parts = path.rsplit('/');
        let last = parts.next().unwrap_or(path);
        let is_version = last.len() > 1
            && last.starts_with('v')
            && last[1..].chars().all(|c| c.is_ascii_digit());
        match (is_version, parts.next()) {
            (true, Some(previous)) => previous.to_string(),
            _ => last.to_string(),
        }
    }

    /// What an identifier refers to.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Resolution {
        /// A user declaration: variable, constant, type, function, label.
        Declared(DeclId),
        /// An import binding; `imported` is immune to aliasing.
        PackageName { decl: DeclId, imported: PackageRef },
        /// A predeclared identifier with no declaration (`make`, `len`, `int`, ...).
        Builtin,
        /// Nothing found in any scope.
        Unresolved,
    }

    impl Resolution {
        pub fn decl(&self) -> Option<DeclId> {
            match self {
                Resolution::Declared(decl) | Resolution::PackageName { decl, .. } => Some(*decl),
                Resolution::Builtin | Resolution::Unresolved => None,
            }
        }

        pub fn is_builtin(&self) -> bool {
            matches!(self, Resolution::Builtin)
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub enum ObjectKind {
        Var,
        Const,
        TypeName,
        TypeParam,
        Func,
        PackageName,
    }

    /// A declared entity.
    #[derive(Debug, Clone, PartialEq)]
    pub struct Object {
        pub name: String,
        pub kind: ObjectKind,
        /// None when the checker could not establish it.
        pub ty: Option<Type>,
        pub span: Span,
        pub file: FileId,
    }

    #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    pub struct StructField {
        pub name: String,
        pub ty: Type,
        pub embedded: bool,
    }

    #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    pub struct Signature {
        pub params: Vec<Type>,
        pub results: Vec<Type>,
        /// The last parameter is `...T`, stored as `[]T`.
        pub variadic: bool,
    }

    #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    pub enum Type {
        /// Predeclared basic type, or `untyped <kind>` for constants.
        Basic(String),
        /// A defined type. `decl` is None for types of other packages and for
        /// the predeclared `error`, `any` and `comparable`.
        Named {
            pkg: Option<PackageRef>,
            name: String,
            decl: Option<DeclId>,
            args: Vec<Type>,
        },
        Pointer(Box<Type>),
        Slice(Box<Type>),
        Array { len: String, elem: Box<Type> },
        Map { key: Box<Type>, value: Box<Type> },
        Chan { dir: ChanDir, elem: Box<Type> },
        Signature(Signature),
        Struct(Vec<StructField>),
        Interface(Vec<(String, Signature)>),
        TypeParam(String),
        /// Result list of a multi-value call.
        Tuple(Vec<Type>),
    }

    impl Type {
        pub fn basic(name: &str) -> Type {
            Type::Basic(name.to_string())
        }

        pub fn is_untyped(&self) -> bool {
            matches!(self, Type::Basic(name) if name.starts_with("untyped "))
        }

        /// Type a constant of this type takes when assigned to a variable.
        pub fn default_type(self) -> Option<Type> {
            let Type::Basic(name) = &self else {
                return Some(self);
            };
            let defaulted = match name.as_str() {
                "untyped int" => "int",
                "untyped float" => "float64",
                "untyped imag" => "complex128",
                "untyped rune" => "rune",
                "untyped string" => "string",
                "untyped bool" => "bool",
                "untyped nil" => return None,
                _ => return Some(self),
            };
            Some(Type::basic(defaulted))
        }

        /// Canonical text. `qualifier` names the package prefix to use for a
        /// named type of that package, or None to leave it unqualified.
        pub fn render(&self, qualifier: &dyn Fn(&PackageRef) -> Option<String>) -> String {
            let mut out = String::new();
            self.write(&mut out, qualifier);
            out
        }

        fn write(&self, out: &mut String, q: &dyn Fn(&PackageRef) -> Option<String>) {
            match self {
                Type::Basic(name) => out.push_str(name),
                Type::Named { pkg, name, args, .. } => {
                    if let Some(prefix) = pkg.as_ref().and_then(q) {
                        out.push_str(&prefix);
                        out.push('.');
                    }
                    out.push_str(name);
                    if !args.is_empty() {
                        out.push('[');
                        write_list(out, args, q);
                        out.push(']');
                    }
                }
                Type::Pointer(elem) => {
                    out.push('*');
                    elem.write(out, q);
                }
                Type::Slice(elem) => {
                    out.push_str("[]");
                    elem.write(out, q);
                }
                Type::Array { len, elem } => {
                    out.push('[');
                    out.push_str(len);
                    out.push(']');
                    elem.write(out, q);
                }
                Type::Map { key, value } => {
                    out.push_str("map[");
                    key.write(out, q);
                    out.push(']');
                    value.write(out, q);
                }
                Type::Chan { dir, elem } => {
                    out.push_str(match dir {
                        ChanDir::Both => "chan ",
                        ChanDir::Send => "chan<- ",
                        ChanDir::Recv => "<-chan ",
                    });
                    elem.write(out, q);
                }
                Type::Signature(sig) => {
                    out.push_str("func");
                    sig.write(out, q);
                }
                Type::Struct(fields) => {
                    out.push_str("struct{");
                    for (i, field) in fields.iter().enumerate() {
                        if i > 0 {
                            out.push_str("; ");
                        }
                        if !field.embedded {
                            out.push_str(&field.name);
                            out.push(' ');
                        }
                        field.ty.write(out, q);
                    }
                    out.push('}');
                }
                Type::Interface(methods) => {
                    out.push_str("interface{");
                    for (i, (name, sig)) in methods.iter().enumerate() {
                        if i > 0 {
                            out.push_str("; ");
                        }
                        out.push_str(name);
                        sig.write(out, q);
                    }
                    out.push('}');
                }
                Type::TypeParam(name) => out.push_str(name),
                Type::Tuple(types) => {
                    out.push('(');
                    write_list(out, types, q);
                    out.push(')');
                }
            }
        }

        /// Every package a named type inside this type belongs to.
        pub fn packages(&self) -> Vec<PackageRef> {
            let mut found = Vec::new();
            self.collect_packages(&mut found);
            found.sort();
            found.dedup();
            found
        }

        fn collect_packages(&self, found: &mut Vec<PackageRef>) {
            match self {
                Type::Named { pkg, args, .. } => {
                    if let Some(pkg) = pkg {
                        found.push(pkg.clone());
                    }
                    args.iter().for_each(|a| a.collect_packages(found));
                }
                Type::Pointer(elem) | Type::Slice(elem) => elem.collect_packages(found),
                Type::Array { elem, .. } | Type::Chan { elem, .. } => elem.collect_packages(found),
                Type::Map { key, value } => {
                    key.collect_packages(found);
                    value.collect_packages(found);
                }
                Type::Signature(sig) => sig.collect_packages(found),
                Type::Struct(fields) => fields.iter().for_each(|f| f.ty.collect_packages(found)),
                Type::Interface(methods) => methods.iter().for_each(|(_, s)| s.collect_packages(found)),
                Type::Tuple(types) => types.iter().for_each(|t| t.collect_packages(found)),
                Type::Basic(_) | Type::TypeParam(_) => {}
            }
        }
    }

    impl Signature {
        fn write(&self, out: &mut String, q: &dyn Fn(&PackageRef) -> Option<String>) {
            out.push('(');
            for (i, param) in self.params.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                match param {
                    Type::Slice(elem) if self.variadic && i + 1 == self.params.len() => {
                        out.push_str("...");
                        elem.write(out, q);
                    }
                    _ => param.write(out, q),
                }
            }
            out.push(')');
            match self.results.as_slice() {
                [] => {}
                [single] => {
                    out.push(' ');
                    single.write(out, q);
                }
                results => {
                    out.push_str(" (");
                    write_list(out, results, q);
                    out.push(')');
                }
            }
        }

        fn collect_packages(&self, found: &mut Vec<PackageRef>) {
            self.params.iter().chain(&self.results).for_each(|t| t.collect_packages(found));
        }
    }

    fn write_list(out: &mut String, types: &[Type], q: &dyn Fn(&PackageRef) -> Option<String>) {
        for (i, ty) in types.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            ty.write(out, q);
        }
    }

    /// Qualifier that leaves types of package `path` unqualified and names
    /// every other package by its declared name.
    pub fn relative_to(path: &str) -> impl Fn(&PackageRef) -> Option<String> + '_ {
        move |pkg: &PackageRef| {
            if pkg.path == path {
                None
            } else {
                Some(pkg.name.clone())
            }
        }
    }

    /// Per defined type: its underlying type and declared methods.
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct NamedInfo {
        pub underlying: Option<Type>,
        pub methods: BTreeMap<String, Type>,
    }

    /// Everything the checker learned about one package.
    #[derive(Debug, Clone)]
    pub struct TypeInfo {
        pub package: PackageRef,
        pub resolutions: HashMap<NodeId, Resolution>,
        pub types: HashMap<NodeId, Type>,
        pub objects: Vec<Object>,
        pub named: HashMap<DeclId, NamedInfo>,
    }

    static UNRESOLVED: Resolution = Resolution::Unresolved;

    impl TypeInfo {
        pub fn new(package: PackageRef) -> Self {
            TypeInfo {
                package,
                resolutions: HashMap::new(),
                types: HashMap::new(),
                objects: Vec::new(),
                named: HashMap::new(),
            }
        }

        /// Resolution of a defining or using identifier.
        pub fn resolve(&self, ident: &Ident) -> &Resolution {
            self.resolutions.get(&ident.id).unwrap_or(&UNRESOLVED)
        }

        pub fn object(&self, decl: DeclId) -> Option<&Object> {
            self.objects.get(decl.0 as usize)
        }

        pub fn type_of(&self, expr: &Expr) -> Option<&Type> {
            self.types.get(&expr.id)
        }

        /// Underlying type; None when it lies in another package.
        pub fn underlying(&self, ty: &Type) -> Option<Type> {
            let mut current = ty.clone();
            // Bounded so a cyclic definition cannot loop forever.
            for _ in 0..16 {
                match current {
                    Type::Named { decl: Some(decl), .. } => {
                        current = self.named.get(&decl)?.underlying.clone()?;
                    }
                    Type::Named { pkg: None, ref name, .. } => return universe_underlying(name),
                    Type::Named { .. } => return None,
                    other => return Some(other),
                }
            }
            None
        }

        /// Element type of a slice-typed value.
        pub fn slice_elem(&self, ty: &Type) -> Option<Type> {
            match self.underlying(ty)? {
                Type::Slice(elem) => Some(*elem),
                _ => None,
            }
        }

        /// Render relative to the package under analysis.
        pub fn type_string(&self, ty: &Type) -> String {
            ty.render(&relative_to(&self.package.path))
        }
    }

    fn universe_underlying(name: &str) -> Option<Type> {
        match name {
            "any" | "comparable" => Some(Type::Interface(Vec::new())),
            "error" => Some(Type::Interface(vec![(
                "Error".to_string(),
                Signature {
                    params: Vec::new(),
                    results: vec![Type::basic("string")],
                    variadic: false,
                },
            )])),
            _ => None,
        }
    }
}
